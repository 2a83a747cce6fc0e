//! Shared entity definitions: the dynamic fact value, raw facts, flat-facts,
//! and the security-master bundle (header + column index + rows).

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;

use crate::error::Error;

/// The three fixed leading columns of every security-master header.
pub const SUBJECT_ID: &str = "subject_id";
pub const EFFECTIVE_START_DATE: &str = "effective_start_date";
pub const EFFECTIVE_END_DATE: &str = "effective_end_date";

/// A dynamically typed fact value. Column type is inferred once per column
/// (see `crate::columnar`), never carried per-cell beyond this tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Date(NaiveDate),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Discriminant name, used for heterogeneous-column detection.
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Value::Int(_) => Some("int"),
            Value::Float(_) => Some("float"),
            Value::Str(_) => Some("string"),
            Value::Date(_) => Some("date"),
            Value::Null => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{}", v.format("%m/%d/%y")),
            Value::Null => write!(f, ""),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

/// A single raw fact: one attribute change for one subject on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub subject_id: i64,
    pub attribute: String,
    pub value: Value,
    pub effective_date: NaiveDate,
}

impl Fact {
    pub fn new(
        subject_id: i64,
        attribute: impl Into<String>,
        value: impl Into<Value>,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            subject_id,
            attribute: attribute.into(),
            value: value.into(),
            effective_date,
        }
    }
}

/// The set of `(attribute, value)` changes for one subject on one date,
/// produced by grouping the raw fact stream (see `crate::bucket`).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatFact {
    pub subject_id: i64,
    pub effective_date: NaiveDate,
    pub pairs: Vec<(String, Value)>,
}

/// Attribute priority map: lower number sorts earlier. Attributes absent
/// from the map sort after all present ones, then lexicographically.
pub type PriorityMap = HashMap<String, i32>;

/// Ordered column names. The first three are always `subject_id`,
/// `effective_start_date`, `effective_end_date`.
pub type Header = Vec<String>;

/// Inverse of `Header`: column name to position.
pub type ColumnIndex = HashMap<String, usize>;

/// One row of the security-master table: length `header.len()`.
pub type Row = Vec<Value>;

/// The bitemporal security-master bundle: header, column index, and rows
/// kept mutually consistent.
#[derive(Debug, Clone, Default)]
pub struct SecurityMaster {
    pub header: Header,
    pub col_index: ColumnIndex,
    pub rows: Vec<Row>,
}

impl SecurityMaster {
    pub fn new(header: Header) -> Self {
        let col_index = build_col_index(&header);
        Self {
            header,
            col_index,
            rows: Vec::new(),
        }
    }

    pub fn col(&self, name: &str) -> Result<usize, Error> {
        self.col_index
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    pub fn non_key_columns(&self) -> impl Iterator<Item = &str> {
        self.header.iter().skip(3).map(|s| s.as_str())
    }
}

pub fn build_col_index(header: &Header) -> ColumnIndex {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

/// A point-in-time position: `(subject_id, quantity, as_of_date)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub subject_id: i64,
    pub quantity: i64,
    pub as_of_date: NaiveDate,
}

/// Output of the positions join: header + rows, where the header is
/// `["subject_id", "quantity", "as_of_date", *non-key attributes]`.
#[derive(Debug, Clone, Default)]
pub struct JoinedPositions {
    pub header: Header,
    pub rows: Vec<Row>,
}

//! Columnar bridge: converts a security-master bundle to/from an Arrow
//! `RecordBatch`, inferring one scalar type per non-null column.

use std::sync::Arc;

use arrow::array::{Array, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::Error;
use crate::types::{build_col_index, Header, Row, SecurityMaster, Value};

fn days_since_epoch(d: NaiveDate) -> i32 {
    (d - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32
}

fn date_from_days(days: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(days as i64)
}

/// Scan a column's non-null entries and determine its single scalar type.
fn infer_column_type(column_name: &str, values: &[&Value]) -> Result<DataType, Error> {
    let mut kind = None;
    for v in values {
        if let Some(t) = v.type_name() {
            match kind {
                None => kind = Some(t),
                Some(existing) if existing == t => {}
                Some(_) => return Err(Error::HeterogeneousColumnType(column_name.to_string())),
            }
        }
    }
    match kind {
        None => Err(Error::EmptyColumnType(column_name.to_string())),
        Some("int") => Ok(DataType::Int64),
        Some("float") => Ok(DataType::Float64),
        Some("string") => Ok(DataType::Utf8),
        Some("date") => Ok(DataType::Date32),
        Some(other) => Err(Error::UnknownColumnType(format!("{column_name} ({other})"))),
    }
}

/// Convert the bundle into `(RecordBatch, Schema)`. The key columns
/// (`subject_id`: Int64, `effective_start_date`/`effective_end_date`:
/// Date32) have a type fixed by the data model; non-key columns infer
/// their type from their non-null entries.
pub fn to_record_batch(master: &SecurityMaster) -> Result<(RecordBatch, Schema), Error> {
    let mut fields = Vec::with_capacity(master.header.len());
    let mut arrays: Vec<Arc<dyn Array>> = Vec::with_capacity(master.header.len());

    for (i, name) in master.header.iter().enumerate() {
        let column: Vec<&Value> = master.rows.iter().map(|r| &r[i]).collect();
        let data_type = if name == "subject_id" {
            DataType::Int64
        } else if name == "effective_start_date" || name == "effective_end_date" {
            DataType::Date32
        } else if master.rows.is_empty() {
            DataType::Utf8
        } else {
            infer_column_type(name, &column)?
        };

        let array: Arc<dyn Array> = match data_type {
            DataType::Int64 => Arc::new(Int64Array::from(
                column
                    .iter()
                    .map(|v| match v {
                        Value::Int(n) => Some(*n),
                        Value::Null => None,
                        other => panic!("column {name:?}: expected int, found {other:?}"),
                    })
                    .collect::<Vec<_>>(),
            )),
            DataType::Float64 => Arc::new(Float64Array::from(
                column
                    .iter()
                    .map(|v| match v {
                        Value::Float(n) => Some(*n),
                        Value::Null => None,
                        other => panic!("column {name:?}: expected float, found {other:?}"),
                    })
                    .collect::<Vec<_>>(),
            )),
            DataType::Utf8 => Arc::new(StringArray::from(
                column
                    .iter()
                    .map(|v| match v {
                        Value::Str(s) => Some(s.clone()),
                        Value::Null => None,
                        other => panic!("column {name:?}: expected string, found {other:?}"),
                    })
                    .collect::<Vec<_>>(),
            )),
            DataType::Date32 => Arc::new(Date32Array::from(
                column
                    .iter()
                    .map(|v| match v {
                        Value::Date(d) => Some(days_since_epoch(*d)),
                        Value::Null => None,
                        other => panic!("column {name:?}: expected date, found {other:?}"),
                    })
                    .collect::<Vec<_>>(),
            )),
            other => unreachable!("unsupported inferred column type {other:?}"),
        };

        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let schema = Schema::new(fields);
    let batch = RecordBatch::try_new(Arc::new(schema.clone()), arrays)?;
    Ok((batch, schema))
}

/// Reconstruct a bundle from a `RecordBatch`, carrying the Arrow column
/// order through as the header.
pub fn from_record_batch(batch: &RecordBatch) -> Result<SecurityMaster, Error> {
    let schema = batch.schema();
    let header: Header = schema.fields().iter().map(|f| f.name().clone()).collect();
    let col_index = build_col_index(&header);

    let mut rows: Vec<Row> = (0..batch.num_rows()).map(|_| vec![Value::Null; header.len()]).collect();

    for (col_idx, field) in schema.fields().iter().enumerate() {
        let column = batch.column(col_idx);
        match field.data_type() {
            DataType::Int64 => {
                let arr = column.as_any().downcast_ref::<Int64Array>().unwrap();
                for (r, row) in rows.iter_mut().enumerate() {
                    row[col_idx] = if arr.is_null(r) {
                        Value::Null
                    } else {
                        Value::Int(arr.value(r))
                    };
                }
            }
            DataType::Float64 => {
                let arr = column.as_any().downcast_ref::<Float64Array>().unwrap();
                for (r, row) in rows.iter_mut().enumerate() {
                    row[col_idx] = if arr.is_null(r) {
                        Value::Null
                    } else {
                        Value::Float(arr.value(r))
                    };
                }
            }
            DataType::Utf8 => {
                let arr = column.as_any().downcast_ref::<StringArray>().unwrap();
                for (r, row) in rows.iter_mut().enumerate() {
                    row[col_idx] = if arr.is_null(r) {
                        Value::Null
                    } else {
                        Value::Str(arr.value(r).to_string())
                    };
                }
            }
            DataType::Date32 => {
                let arr = column.as_any().downcast_ref::<Date32Array>().unwrap();
                for (r, row) in rows.iter_mut().enumerate() {
                    row[col_idx] = if arr.is_null(r) {
                        Value::Null
                    } else {
                        Value::Date(date_from_days(arr.value(r)))
                    };
                }
            }
            other => return Err(Error::UnknownColumnType(format!("{} ({other:?})", field.name()))),
        }
    }

    Ok(SecurityMaster { header, col_index, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SecurityMaster;
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%m/%d/%y").unwrap()
    }

    #[test]
    fn round_trips_a_small_bundle() {
        let header: Header = vec![
            "subject_id".to_string(),
            "effective_start_date".to_string(),
            "effective_end_date".to_string(),
            "ticker".to_string(),
            "market_cap".to_string(),
        ];
        let mut master = SecurityMaster::new(header);
        master.rows.push(vec![
            Value::Int(1),
            Value::Date(d("01/01/24")),
            Value::Null,
            Value::Str("GRPH".to_string()),
            Value::Null,
        ]);
        master.rows.push(vec![
            Value::Int(2),
            Value::Date(d("01/01/23")),
            Value::Date(d("03/17/23")),
            Value::Str("V".to_string()),
            Value::Int(549000),
        ]);

        let (batch, _schema) = to_record_batch(&master).unwrap();
        let round_tripped = from_record_batch(&batch).unwrap();

        assert_eq!(round_tripped.header, master.header);
        assert_eq!(round_tripped.rows, master.rows);
    }

    #[test]
    fn heterogeneous_column_is_an_error() {
        let header: Header = vec![
            "subject_id".to_string(),
            "effective_start_date".to_string(),
            "effective_end_date".to_string(),
            "mixed".to_string(),
        ];
        let mut master = SecurityMaster::new(header);
        master.rows.push(vec![Value::Int(1), Value::Date(d("01/01/24")), Value::Null, Value::Int(1)]);
        master.rows.push(vec![Value::Int(1), Value::Date(d("01/01/24")), Value::Null, Value::Str("x".to_string())]);

        let err = to_record_batch(&master);
        assert!(matches!(err, Err(Error::HeterogeneousColumnType(_))));
    }
}

//! Fact log I/O: the quoted, comma-separated `"subject_id","attribute",
//! "value","effective_date"` format, plus synthetic generation
//! for demos.

use chrono::NaiveDate;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use tracing::info;

use crate::error::Error;
use crate::types::{Fact, Value};

const DATE_FMT: &str = "%m/%d/%y";

/// Mock attribute vocabulary for synthetic fact generation.
const MOCK_ATTRIBUTES: &[&str] = &[
    "ticker",
    "name",
    "asset_class",
    "gics_sector",
    "gics_industry",
];

fn random_value_for(attribute: &str, rng: &mut impl Rng) -> Value {
    match attribute {
        "ticker" => Value::Str(random_ticker(rng)),
        "name" => Value::Str(format!("Issuer {}", rng.gen_range(1..1000))),
        "asset_class" => Value::Str(choice(rng, &["equity", "fixed_income", "cash"])),
        "gics_sector" => Value::Str(choice(rng, &["healthcare", "technology", "financials"])),
        "gics_industry" => Value::Str(choice(rng, &["biotechnology", "software", "banking"])),
        _ => Value::Null,
    }
}

fn choice(rng: &mut impl Rng, options: &[&str]) -> String {
    options[rng.gen_range(0..options.len())].to_string()
}

fn random_ticker(rng: &mut impl Rng) -> String {
    let letters = Uniform::from(b'A'..=b'Z');
    (0..4).map(|_| letters.sample(rng) as char).collect()
}

fn random_day(rng: &mut impl Rng, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = (end - start).num_days().max(0);
    start + chrono::Duration::days(rng.gen_range(0..=span))
}

/// Generate `count` synthetic raw facts for subjects `0..=15`, dated
/// within `[start, end]`, and write them to `path` in fact-log format.
pub fn generate_fact_log(
    path: &std::path::Path,
    count: usize,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), Error> {
    let mut rng = rand::thread_rng();
    let facts: Vec<Fact> = (0..count)
        .map(|_| {
            let subject_id = rng.gen_range(0..=15);
            let attribute = MOCK_ATTRIBUTES[rng.gen_range(0..MOCK_ATTRIBUTES.len())];
            let value = random_value_for(attribute, &mut rng);
            let effective_date = random_day(&mut rng, start, end);
            Fact::new(subject_id, attribute, value, effective_date)
        })
        .collect();

    info!(count, path = %path.display(), "generating synthetic fact log");
    write_fact_log(path, &facts)
}

/// Write raw facts to `path`, one fully quoted record per line.
pub fn write_fact_log(path: &std::path::Path, facts: &[Fact]) -> Result<(), Error> {
    let mut writer = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    for fact in facts {
        writer.write_record([
            fact.subject_id.to_string(),
            fact.attribute.clone(),
            fact.value.to_string(),
            fact.effective_date.format(DATE_FMT).to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read raw facts from `path`. Every field is quoted; `value` is read back
/// as a string (the consumer infers scalar type once the column is known,
/// see `crate::io::columnar`).
pub fn read_fact_log(path: &std::path::Path) -> Result<Vec<Fact>, Error> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    let mut facts = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != 4 {
            return Err(Error::FactLogParse {
                line,
                reason: format!("expected 4 fields, found {}", record.len()),
            });
        }
        let subject_id: i64 = record[0].parse().map_err(|e| Error::FactLogParse {
            line,
            reason: format!("invalid subject_id: {e}"),
        })?;
        let effective_date = NaiveDate::parse_from_str(&record[3], DATE_FMT).map_err(|e| {
            Error::FactLogParse {
                line,
                reason: format!("invalid effective_date: {e}"),
            }
        })?;
        facts.push(Fact::new(
            subject_id,
            record[1].to_string(),
            Value::Str(record[2].to_string()),
            effective_date,
        ));
    }
    Ok(facts)
}

//! Binary entry point: wires the CLI flags to the library in the
//! documented composition order.

use std::path::Path;

use chrono::NaiveDate;
use clap::Parser;
use rusqlite::Connection;
use tracing::info;
use tracing_subscriber::EnvFilter;

use secmaster::cli::Cli;
use secmaster::io::{generate_fact_log, read_fact_log};
use secmaster::types::{Position, PriorityMap, Value};
use secmaster::{build, bucket_facts, filter_by_attribute, join_positions, merge_batch, remove_empty_columns, resolve_header};

fn default_priority() -> PriorityMap {
    let mut p = PriorityMap::new();
    p.insert("subject_id".to_string(), 0);
    p.insert("effective_start_date".to_string(), 1);
    p.insert("effective_end_date".to_string(), 2);
    p.insert("asset_class".to_string(), 3);
    p.insert("ticker".to_string(), 4);
    p.insert("name".to_string(), 5);
    p
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let priority = default_priority();

    let fact_log_path = if let Some(generate_path) = &cli.generate {
        info!(path = %generate_path.display(), "generating synthetic fact log");
        generate_fact_log(
            generate_path,
            100,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )?;
        generate_path.clone()
    } else {
        cli.fact_log
            .clone()
            .ok_or("a fact log path is required unless --generate is given")?
    };

    let facts = read_fact_log(&fact_log_path)?;
    let (header, _) = resolve_header(&facts, &priority);
    let flat = bucket_facts(&facts);
    let mut master = build(header, &flat);

    if let Some(merge_path) = &cli.merge {
        let update_facts = read_fact_log(merge_path)?;
        merge_batch(&mut master, &update_facts, &priority);
    }

    if let Some(class) = &cli.filter {
        let value = if class.eq_ignore_ascii_case("none") {
            Value::Null
        } else {
            Value::Str(class.clone())
        };
        let filtered = filter_by_attribute(&master, "asset_class", &value)?;
        master = remove_empty_columns(&filtered);
    }

    if let Some(positions_path) = &cli.positions {
        let positions = read_positions(positions_path)?;
        let joined = join_positions(&master, &positions);
        println!("{}", secmaster::io::format_table("Consolidated Position Information", &joined.header, &joined.rows));
    } else {
        println!("{}", secmaster::io::format_table("Security Master", &master.header, &master.rows));
    }

    if let Some(sql_path) = &cli.sql {
        let conn = Connection::open(sql_path)?;
        secmaster::io::write_sqlite(&conn, "security_master", &master)?;
        info!(path = %sql_path.display(), "persisted master to sqlite");
    }

    Ok(())
}

/// Read `subject_id,quantity,as_of_date` (unquoted, `MM/DD/YY` dates) from
/// a simple positions file.
fn read_positions(path: &Path) -> Result<Vec<Position>, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut positions = Vec::new();
    for record in reader.records() {
        let record = record?;
        positions.push(Position {
            subject_id: record[0].parse()?,
            quantity: record[1].parse()?,
            as_of_date: NaiveDate::parse_from_str(&record[2], "%m/%d/%y")?,
        });
    }
    Ok(positions)
}

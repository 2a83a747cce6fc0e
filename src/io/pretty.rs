//! Pretty printer: tab-aligned table rendering for CLI output.

use crate::types::{Header, Row};

/// Render `header` and `rows` as a tab-aligned table, each column padded
/// to the widest cell it contains.
pub fn format_table(title: &str, header: &Header, rows: &[Row]) -> String {
    if rows.is_empty() {
        return format!("{title}\nNo rows available\n");
    }

    let mut stringified: Vec<Vec<String>> = vec![header.clone()];
    stringified.extend(rows.iter().map(|row| row.iter().map(|v| v.to_string()).collect()));

    let widths: Vec<usize> = (0..header.len())
        .map(|col| stringified.iter().map(|row| row[col].len()).max().unwrap_or(0))
        .collect();

    let lines: Vec<String> = stringified
        .iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect();

    format!("{title}\n{}\n", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn empty_table_reports_no_rows() {
        let header: Header = vec!["subject_id".to_string()];
        assert_eq!(format_table("Security Master", &header, &[]), "Security Master\nNo rows available\n");
    }

    #[test]
    fn aligns_columns_to_widest_cell() {
        let header: Header = vec!["subject_id".to_string(), "ticker".to_string()];
        let rows = vec![
            vec![Value::Int(1), Value::Str("GRPH".to_string())],
            vec![Value::Int(22), Value::Str("V".to_string())],
        ];
        let rendered = format_table("Security Master", &header, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1].split('\t').next().unwrap().len(), "subject_id".len());
        assert_eq!(lines[2].split('\t').nth(1).unwrap().len(), "ticker".len());
    }
}

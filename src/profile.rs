use crate::table::SpreadsheetTable;

/// Number of leading rows sampled per column
const SAMPLE_ROWS: usize = 10;

/// Maximum sample values shown in a summary
const SAMPLE_SHOWN: usize = 3;

/// Produce a short sample summary for one column
///
/// Inspects the first 10 rows of the column, drops empty values,
/// deduplicates while preserving first-seen order, and reports up to three
/// samples with a `+N more` suffix when further unique values exist.
///
/// The output is deterministic for an unchanged table and is shared verbatim
/// between the sidebar stats display and the AI prompt document.
///
/// # Arguments
/// * `table` - The parsed tabular model
/// * `column` - Header name to summarize
///
/// # Returns
/// * `String` - e.g. `"North, South, East +2 more"`; empty string when the
///   sampled rows hold no non-empty values (or the column does not exist)
pub fn column_summary(table: &SpreadsheetTable, column: &str) -> String {
    let mut unique: Vec<String> = Vec::new();

    for row in table.rows.iter().take(SAMPLE_ROWS) {
        let Some(value) = row.get(column) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let shown = value.display();
        if !unique.contains(&shown) {
            unique.push(shown);
        }
    }

    let mut summary = unique
        .iter()
        .take(SAMPLE_SHOWN)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    if unique.len() > SAMPLE_SHOWN {
        summary.push_str(&format!(" +{} more", unique.len() - SAMPLE_SHOWN));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use std::collections::HashMap;

    fn table_with_column(values: Vec<CellValue>) -> SpreadsheetTable {
        let rows = values
            .into_iter()
            .map(|v| {
                let mut row = HashMap::new();
                row.insert("Region".to_string(), v);
                row
            })
            .collect();
        SpreadsheetTable {
            headers: vec!["Region".to_string()],
            rows,
        }
    }

    #[test]
    fn dedupes_and_reports_extra_count() {
        let table = table_with_column(vec![
            CellValue::Text("North".into()),
            CellValue::Text("South".into()),
            CellValue::Text("North".into()),
            CellValue::Text("East".into()),
            CellValue::Text("West".into()),
            CellValue::Text("Center".into()),
        ]);
        assert_eq!(
            column_summary(&table, "Region"),
            "North, South, East +2 more"
        );
    }

    #[test]
    fn no_suffix_when_three_or_fewer_unique_values() {
        let table = table_with_column(vec![
            CellValue::Text("A".into()),
            CellValue::Text("B".into()),
        ]);
        assert_eq!(column_summary(&table, "Region"), "A, B");
    }

    #[test]
    fn empty_values_are_excluded() {
        let table = table_with_column(vec![
            CellValue::Text(String::new()),
            CellValue::Text("Solo".into()),
            CellValue::Text(String::new()),
        ]);
        assert_eq!(column_summary(&table, "Region"), "Solo");
    }

    #[test]
    fn samples_only_the_first_ten_rows() {
        let mut values: Vec<CellValue> = (0..10)
            .map(|_| CellValue::Text("same".into()))
            .collect();
        values.push(CellValue::Text("eleventh".into()));
        let table = table_with_column(values);
        assert_eq!(column_summary(&table, "Region"), "same");
    }

    #[test]
    fn numbers_render_like_the_sheet_shows_them() {
        let table = table_with_column(vec![
            CellValue::Number(10.0),
            CellValue::Number(2.5),
        ]);
        assert_eq!(column_summary(&table, "Region"), "10, 2.5");
    }

    #[test]
    fn idempotent_on_an_unchanged_table() {
        let table = table_with_column(vec![
            CellValue::Text("x".into()),
            CellValue::Text("y".into()),
        ]);
        let first = column_summary(&table, "Region");
        let second = column_summary(&table, "Region");
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_column_yields_empty_summary() {
        let table = table_with_column(vec![CellValue::Text("x".into())]);
        assert_eq!(column_summary(&table, "Missing"), "");
    }
}

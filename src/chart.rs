use crate::error::AppError;
use crate::table::{CellValue, SpreadsheetTable};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Chart kinds the renderers understand
///
/// `Bar`, `Line` and `Pie` take the 2D canvas path; `Bar3d` takes the
/// extruded 3D scene path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    #[serde(rename = "3d")]
    Bar3d,
}

/// Named color schemes offered by the axis picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    Blue,
    Purple,
    Green,
    Orange,
}

/// Resolved color tokens for one scheme
///
/// `gradient` is the per-slice/per-bar cycle; pie charts and 3D bars index
/// it modulo its length, so any row count is covered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub name: PaletteName,
    pub primary: String,
    pub secondary: String,
    pub gradient: Vec<String>,
}

impl Palette {
    /// Look up the fixed token set for a scheme
    pub fn resolve(name: PaletteName) -> Self {
        let (primary, secondary, gradient): (&str, &str, &[&str]) = match name {
            PaletteName::Blue => (
                "#3B82F6",
                "#1E40AF",
                &[
                    "#3B82F6", "#1E40AF", "#1D4ED8", "#2563EB", "#1E3A8A", "#1E40AB", "#2B3A8F",
                    "#2C4ED8", "#1E2A8A", "#1E3D8B",
                ],
            ),
            PaletteName::Purple => (
                "#8B5CF6",
                "#7C3AED",
                &[
                    "#8B5CF6", "#7C3AED", "#6D28D9", "#5B21B6", "#4C1D95", "#3B0764", "#2C0A4B",
                    "#1E0D32", "#1E0F19",
                ],
            ),
            PaletteName::Green => (
                "#10B981",
                "#059669",
                &[
                    "#10B981", "#059669", "#047857", "#065F46", "#064E3B", "#065F46", "#047857",
                    "#059669", "#10B981",
                ],
            ),
            PaletteName::Orange => (
                "#F59E0B",
                "#D97706",
                &[
                    "#F59E0B", "#D97706", "#B45309", "#92400E", "#78350F", "#6A2C0D", "#5B210A",
                    "#4C1D08", "#3B1606",
                ],
            ),
        };
        Palette {
            name,
            primary: primary.to_string(),
            secondary: secondary.to_string(),
            gradient: gradient.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Gradient color for entry `index`, cycling when rows outnumber tokens
    pub fn color_for(&self, index: usize) -> &str {
        &self.gradient[index % self.gradient.len()]
    }
}

/// Renderer-agnostic chart specification
///
/// Derived deterministically from a table plus the user's axis/kind/palette
/// selections; rebuilding from identical inputs yields a structurally equal
/// value, which the reactive layer relies on for change detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// One label per row, taken verbatim from the X column in row order
    pub labels: Vec<String>,

    /// One number per row, coerced from the Y column in row order
    pub series: Vec<f64>,

    pub kind: ChartKind,
    pub palette: Palette,

    /// Caption shown above the chart
    pub title: String,

    /// Legend entry for the single data series (the Y column name)
    pub series_label: String,
}

impl ChartSpec {
    /// Build a chart specification from a table and the user's selections
    ///
    /// `labels[i]` is row i's X-column value; `series[i]` is row i's
    /// Y-column value coerced to a number: a string that parses fully as a
    /// float becomes that float, a numeric cell is used as-is, anything else
    /// becomes 0. No row is ever dropped, so `labels` and `series` always
    /// have equal length.
    ///
    /// Selecting the same column for both axes is allowed. A column name
    /// absent from the headers is rejected with a `Validation` error rather
    /// than producing empty-equivalent entries.
    pub fn build(
        table: &SpreadsheetTable,
        x_column: &str,
        y_column: &str,
        kind: ChartKind,
        palette: PaletteName,
    ) -> Result<Self, AppError> {
        if !table.has_column(x_column) {
            return Err(AppError::Validation(format!(
                "Unknown X-axis column: {}",
                x_column
            )));
        }
        if !table.has_column(y_column) {
            return Err(AppError::Validation(format!(
                "Unknown Y-axis column: {}",
                y_column
            )));
        }

        let labels = table
            .rows
            .iter()
            .map(|row| row.get(x_column).map(CellValue::display).unwrap_or_default())
            .collect();

        let series = table
            .rows
            .iter()
            .map(|row| row.get(y_column).map(coerce_numeric).unwrap_or(0.0))
            .collect();

        Ok(ChartSpec {
            labels,
            series,
            kind,
            palette: Palette::resolve(palette),
            title: format!("{} vs {}", y_column, x_column),
            series_label: y_column.to_string(),
        })
    }

    /// Largest series value, or 0 for an empty/all-zero series
    pub fn max_value(&self) -> f64 {
        self.series.iter().cloned().fold(0.0, f64::max)
    }
}

/// Numeric coercion rule shared by every chart path
///
/// Numbers pass through unchanged; a string that parses fully as a float is
/// parsed; everything else (blank cells included) defaults to 0.
pub fn coerce_numeric(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => s.parse::<f64>().unwrap_or(0.0),
    }
}

/// Monotonic sequencing for overlapping chart recomputations
///
/// Rapid axis/kind changes can leave several spec builds in flight at once.
/// Each computation takes a ticket from `begin`; when it completes, `commit`
/// accepts it only if no newer ticket has been committed, so the newest
/// result always wins and stale completions are discarded.
#[derive(Debug, Default)]
pub struct RenderSequencer {
    issued: AtomicU64,
    committed: AtomicU64,
}

impl RenderSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next sequence number
    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Try to publish the result for `ticket`; false means it went stale
    pub fn commit(&self, ticket: u64) -> bool {
        let mut current = self.committed.load(Ordering::SeqCst);
        loop {
            if ticket <= current {
                return false;
            }
            match self.committed.compare_exchange(
                current,
                ticket,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_table() -> SpreadsheetTable {
        let mut rows = Vec::new();
        for (region, sales) in [
            ("North", CellValue::Text("42.5".into())),
            ("South", CellValue::Text("abc".into())),
            ("East", CellValue::Number(7.0)),
            ("West", CellValue::Text(String::new())),
        ] {
            let mut row = HashMap::new();
            row.insert("Region".to_string(), CellValue::Text(region.into()));
            row.insert("Sales".to_string(), sales);
            rows.push(row);
        }
        SpreadsheetTable {
            headers: vec!["Region".to_string(), "Sales".to_string()],
            rows,
        }
    }

    #[test]
    fn coercion_law() {
        let spec = ChartSpec::build(
            &sample_table(),
            "Region",
            "Sales",
            ChartKind::Bar,
            PaletteName::Blue,
        )
        .unwrap();
        assert_eq!(spec.series, vec![42.5, 0.0, 7.0, 0.0]);
        assert_eq!(spec.labels, vec!["North", "South", "East", "West"]);
        assert_eq!(spec.labels.len(), spec.series.len());
    }

    #[test]
    fn rebuild_yields_structural_equality() {
        let table = sample_table();
        let a = ChartSpec::build(&table, "Region", "Sales", ChartKind::Line, PaletteName::Green)
            .unwrap();
        let b = ChartSpec::build(&table, "Region", "Sales", ChartKind::Line, PaletteName::Green)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_column_is_a_validation_error() {
        let err = ChartSpec::build(
            &sample_table(),
            "Nope",
            "Sales",
            ChartKind::Bar,
            PaletteName::Blue,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn same_column_for_both_axes_is_allowed() {
        let spec = ChartSpec::build(
            &sample_table(),
            "Sales",
            "Sales",
            ChartKind::Bar,
            PaletteName::Blue,
        )
        .unwrap();
        assert_eq!(spec.series, vec![42.5, 0.0, 7.0, 0.0]);
        assert_eq!(spec.labels, vec!["42.5", "abc", "7", ""]);
    }

    #[test]
    fn palette_cycles_modulo_gradient_length() {
        let palette = Palette::resolve(PaletteName::Blue);
        let len = palette.gradient.len();
        assert_eq!(palette.color_for(0), palette.color_for(len));
        assert_eq!(palette.color_for(3), palette.color_for(len + 3));
    }

    #[test]
    fn kind_serde_matches_the_client_tokens() {
        assert_eq!(serde_json::to_string(&ChartKind::Bar3d).unwrap(), "\"3d\"");
        assert_eq!(
            serde_json::from_str::<ChartKind>("\"pie\"").unwrap(),
            ChartKind::Pie
        );
    }

    #[test]
    fn sequencer_discards_stale_completions() {
        let seq = RenderSequencer::new();
        let older = seq.begin();
        let newer = seq.begin();
        assert!(seq.commit(newer));
        assert!(!seq.commit(older), "stale completion must be discarded");
        let next = seq.begin();
        assert!(seq.commit(next));
    }
}

use crate::chart::{ChartKind, ChartSpec};
use crate::error::AppError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use plotters::prelude::*;

/// Default raster dimensions for generated charts
pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 600;

// Dark theme tokens shared by every 2D chart
const BG: RGBColor = RGBColor(17, 24, 39);
const GRID: RGBColor = RGBColor(55, 65, 81);
const TICK: RGBColor = RGBColor(156, 163, 175);
const TITLE: RGBColor = RGBColor(249, 250, 251);

/// Render a 2D chart (bar, line or pie) to PNG bytes
///
/// The renderer consumes a [`ChartSpec`] and maps its `kind` to the matching
/// chart primitive. Axis ticks, grid and legend are styled for the dark
/// theme. `Bar3d` specs belong to the scene renderer and are rejected here
/// with a `Validation` error rather than silently drawing nothing.
pub fn render_png(spec: &ChartSpec) -> Result<Vec<u8>, AppError> {
    match spec.kind {
        ChartKind::Bar => draw_to_png(spec, draw_bar),
        ChartKind::Line => draw_to_png(spec, draw_line),
        ChartKind::Pie => draw_to_png(spec, draw_pie),
        ChartKind::Bar3d => Err(AppError::Validation(
            "3D charts are rendered by the scene renderer".to_string(),
        )),
    }
}

/// Export the current 2D render as a base64 PNG data URL
///
/// No export path exists for the 3D mode; asking for one reports the
/// capability gap instead of silently doing nothing.
pub fn export_base64(spec: &ChartSpec) -> Result<String, AppError> {
    if spec.kind == ChartKind::Bar3d {
        return Err(AppError::Validation(
            "3D chart export is not supported".to_string(),
        ));
    }
    let png = render_png(spec)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
}

/// Parse a `#RRGGBB` palette token; anything unparseable falls back to the tick gray
pub fn hex_color(token: &str) -> RGBColor {
    let hex = token.trim_start_matches('#');
    if hex.len() == 6 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return RGBColor(r, g, b);
        }
    }
    TICK
}

type DrawFn = fn(&ChartSpec, &DrawingArea<BitMapBackend, plotters::coord::Shift>) -> Result<(), AppError>;

/// Draw through a temporary PNG file and read the bytes back
///
/// Plotters' bitmap backend encodes PNG on `present`, so the render goes to
/// a private temp file which is read and removed before returning.
fn draw_to_png(spec: &ChartSpec, draw: DrawFn) -> Result<Vec<u8>, AppError> {
    let file = tempfile::Builder::new()
        .prefix("insightxl-chart-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| AppError::internal("chart temp file", e))?;
    let path = file.path().to_path_buf();

    {
        let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&BG)
            .map_err(|e| AppError::internal("chart background", e))?;
        draw(spec, &root)?;
        root.present()
            .map_err(|e| AppError::internal("chart present", e))?;
    }

    std::fs::read(&path).map_err(|e| AppError::internal("chart read-back", e))
}

fn value_bounds(spec: &ChartSpec) -> (f64, f64) {
    let min = spec.series.iter().cloned().fold(0.0, f64::min);
    let max = spec.series.iter().cloned().fold(0.0, f64::max);
    if min == 0.0 && max == 0.0 {
        (0.0, 1.0)
    } else {
        (min * 1.05, max * 1.05)
    }
}

fn draw_bar(
    spec: &ChartSpec,
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
) -> Result<(), AppError> {
    let n = spec.labels.len().max(1);
    let (y_min, y_max) = value_bounds(spec);
    let primary = hex_color(&spec.palette.primary);
    let secondary = hex_color(&spec.palette.secondary);
    let labels = spec.labels.clone();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 24).into_font().color(&TITLE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n as f64, y_min..y_max)
        .map_err(|e| AppError::internal("bar chart layout", e))?;

    chart
        .configure_mesh()
        .light_line_style(GRID.mix(0.4))
        .bold_line_style(GRID)
        .axis_style(TICK)
        .x_labels(n.min(12))
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .label_style(("sans-serif", 12).into_font().color(&TICK))
        .draw()
        .map_err(|e| AppError::internal("bar chart mesh", e))?;

    chart
        .draw_series(spec.series.iter().enumerate().map(|(i, &v)| {
            Rectangle::new(
                [(i as f64 + 0.15, 0.0), (i as f64 + 0.85, v)],
                primary.filled(),
            )
        }))
        .map_err(|e| AppError::internal("bar chart series", e))?
        .label(spec.series_label.clone())
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], primary.filled()));

    chart
        .configure_series_labels()
        .border_style(secondary)
        .background_style(BG.mix(0.8))
        .label_font(("sans-serif", 12).into_font().color(&TITLE))
        .draw()
        .map_err(|e| AppError::internal("bar chart legend", e))?;

    Ok(())
}

fn draw_line(
    spec: &ChartSpec,
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
) -> Result<(), AppError> {
    let n = spec.labels.len().max(1);
    let (y_min, y_max) = value_bounds(spec);
    let primary = hex_color(&spec.palette.primary);
    let secondary = hex_color(&spec.palette.secondary);
    let labels = spec.labels.clone();

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 24).into_font().color(&TITLE))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n as f64, y_min..y_max)
        .map_err(|e| AppError::internal("line chart layout", e))?;

    chart
        .configure_mesh()
        .light_line_style(GRID.mix(0.4))
        .bold_line_style(GRID)
        .axis_style(TICK)
        .x_labels(n.min(12))
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .label_style(("sans-serif", 12).into_font().color(&TICK))
        .draw()
        .map_err(|e| AppError::internal("line chart mesh", e))?;

    chart
        .draw_series(LineSeries::new(
            spec.series
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64 + 0.5, v)),
            primary.stroke_width(2),
        ))
        .map_err(|e| AppError::internal("line chart series", e))?
        .label(spec.series_label.clone())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 15, y)], primary.stroke_width(2))
        });

    chart
        .draw_series(
            spec.series
                .iter()
                .enumerate()
                .map(|(i, &v)| Circle::new((i as f64 + 0.5, v), 3, secondary.filled())),
        )
        .map_err(|e| AppError::internal("line chart points", e))?;

    chart
        .configure_series_labels()
        .border_style(secondary)
        .background_style(BG.mix(0.8))
        .label_font(("sans-serif", 12).into_font().color(&TITLE))
        .draw()
        .map_err(|e| AppError::internal("line chart legend", e))?;

    Ok(())
}

fn draw_pie(
    spec: &ChartSpec,
    root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
) -> Result<(), AppError> {
    let root = root
        .titled(&spec.title, ("sans-serif", 24).into_font().color(&TITLE))
        .map_err(|e| AppError::internal("pie chart title", e))?;

    // Negative slices are meaningless in a pie; clamp them to zero.
    let sizes: Vec<f64> = spec.series.iter().map(|v| v.max(0.0)).collect();
    if sizes.iter().sum::<f64>() <= 0.0 {
        // Nothing to slice; fail soft with an empty chart body.
        return Ok(());
    }

    let colors: Vec<RGBColor> = (0..sizes.len())
        .map(|i| hex_color(spec.palette.color_for(i)))
        .collect();
    let labels = spec.labels.clone();

    let (w, h) = root.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64 / 2.0) * 0.7;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style(("sans-serif", 14).into_font().color(&TITLE));
    pie.percentages(("sans-serif", 12).into_font().color(&BG));

    root.draw(&pie)
        .map_err(|e| AppError::internal("pie chart draw", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, ChartSpec, PaletteName};
    use crate::table::{CellValue, SpreadsheetTable};
    use std::collections::HashMap;

    fn spec(kind: ChartKind) -> ChartSpec {
        let mut rows = Vec::new();
        for (label, value) in [("Q1", 10.0), ("Q2", 25.0), ("Q3", 15.0)] {
            let mut row = HashMap::new();
            row.insert("Quarter".to_string(), CellValue::Text(label.into()));
            row.insert("Revenue".to_string(), CellValue::Number(value));
            rows.push(row);
        }
        let table = SpreadsheetTable {
            headers: vec!["Quarter".to_string(), "Revenue".to_string()],
            rows,
        };
        ChartSpec::build(&table, "Quarter", "Revenue", kind, PaletteName::Blue).unwrap()
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(hex_color("#3B82F6"), RGBColor(0x3B, 0x82, 0xF6));
        assert_eq!(hex_color("garbage"), TICK);
    }

    #[test]
    fn bar3d_spec_is_rejected_by_the_2d_path() {
        let err = render_png(&spec(ChartKind::Bar3d)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn export_reports_the_3d_capability_gap() {
        let err = export_base64(&spec(ChartKind::Bar3d)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    #[ignore = "draws text; requires system fonts"]
    fn bar_line_pie_render_to_png() {
        for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Pie] {
            let png = render_png(&spec(kind)).unwrap();
            assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        }
    }

    #[test]
    #[ignore = "draws text; requires system fonts"]
    fn export_produces_a_data_url() {
        let url = export_base64(&spec(ChartKind::Bar)).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }
}

use crate::chart::ChartSpec;
use crate::error::AppError;
use crate::render2d::{hex_color, CHART_HEIGHT, CHART_WIDTH};
use crate::table::format_number;
use plotters::prelude::*;

/// Scene height the tallest bar is scaled to
pub const MAX_SCENE_HEIGHT: f64 = 5.0;

/// Auto-rotation rate around the vertical axis, radians per frame
pub const SPIN_RATE: f64 = 0.002;

/// Center-to-center spacing between bars along the horizontal axis
pub const BAR_PITCH: f64 = 0.8;

/// Footprint side length of each bar
pub const BAR_SIDE: f64 = 0.5;

const BG: RGBColor = RGBColor(17, 24, 39);
const GRID: RGBColor = RGBColor(55, 65, 81);
const LABEL: RGBColor = RGBColor(249, 250, 251);

/// Camera state for the 3D scene
///
/// The scene auto-rotates by advancing `yaw` at [`SPIN_RATE`]; manual
/// orbit/zoom simply writes these fields directly, and the next frame
/// continues rotating from wherever the user left the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitState {
    pub yaw: f64,
    pub pitch: f64,
    pub zoom: f64,
}

impl Default for OrbitState {
    fn default() -> Self {
        OrbitState {
            yaw: 0.5,
            pitch: 0.25,
            zoom: 0.9,
        }
    }
}

/// One extruded bar in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBar {
    /// Category label drawn below the bar
    pub label: String,

    /// Original series value, drawn above the bar
    pub value: f64,

    /// Extruded height after scaling
    pub height: f64,

    /// Center position along the horizontal axis
    pub x: f64,

    /// Palette token for the bar faces
    pub color: String,
}

/// 3D bar scene derived from a [`ChartSpec`]
///
/// Bars are laid out evenly spaced along one horizontal axis, centered on
/// the origin, with heights scaled so the tallest bar reaches
/// [`MAX_SCENE_HEIGHT`]. When every series value is zero the scale factor is
/// forced to zero instead of dividing by zero, so all bars render flat.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar3dScene {
    pub bars: Vec<SceneBar>,
    pub orbit: OrbitState,
    pub title: String,
}

impl Bar3dScene {
    pub fn from_spec(spec: &ChartSpec) -> Self {
        let max = spec.max_value();
        let scale = if max > 0.0 { MAX_SCENE_HEIGHT / max } else { 0.0 };
        let n = spec.series.len();

        let bars = spec
            .series
            .iter()
            .enumerate()
            .map(|(i, &value)| SceneBar {
                label: spec.labels.get(i).cloned().unwrap_or_default(),
                value,
                height: value.max(0.0) * scale,
                x: i as f64 * BAR_PITCH - (n as f64 * BAR_PITCH) / 2.0 + BAR_PITCH / 2.0,
                color: spec.palette.color_for(i).to_string(),
            })
            .collect();

        Bar3dScene {
            bars,
            orbit: OrbitState::default(),
            title: spec.title.clone(),
        }
    }

    /// Advance the auto-rotation by `frames` frames
    pub fn advance(&mut self, frames: u32) {
        self.orbit.yaw += SPIN_RATE * f64::from(frames);
    }

    /// Half-width of the scene along the bar axis, with a margin
    fn half_span(&self) -> f64 {
        (self.bars.len() as f64 * BAR_PITCH) / 2.0 + 1.0
    }

    /// Render the scene to PNG bytes through a perspective projection
    pub fn render_png(&self) -> Result<Vec<u8>, AppError> {
        let file = tempfile::Builder::new()
            .prefix("insightxl-scene-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| AppError::internal("scene temp file", e))?;
        let path = file.path().to_path_buf();

        {
            let root = BitMapBackend::new(&path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
            root.fill(&BG)
                .map_err(|e| AppError::internal("scene background", e))?;

            let span = self.half_span();
            let mut chart = ChartBuilder::on(&root)
                .caption(&self.title, ("sans-serif", 24).into_font().color(&LABEL))
                .margin(10)
                .build_cartesian_3d(-span..span, -1.0..MAX_SCENE_HEIGHT + 1.0, -2.0..2.0)
                .map_err(|e| AppError::internal("scene layout", e))?;

            let orbit = self.orbit;
            chart.with_projection(|mut pb| {
                pb.yaw = orbit.yaw;
                pb.pitch = orbit.pitch;
                pb.scale = orbit.zoom;
                pb.into_matrix()
            });

            chart
                .configure_axes()
                .light_grid_style(GRID.mix(0.4))
                .label_style(("sans-serif", 11).into_font().color(&GRID))
                .draw()
                .map_err(|e| AppError::internal("scene axes", e))?;

            let half = BAR_SIDE / 2.0;
            for bar in &self.bars {
                let color = hex_color(&bar.color);
                chart
                    .draw_series(std::iter::once(Cubiod::new(
                        [
                            (bar.x - half, 0.0, -half),
                            (bar.x + half, bar.height, half),
                        ],
                        color.mix(0.9),
                        color,
                    )))
                    .map_err(|e| AppError::internal("scene bar", e))?;

                // Category label below, value above, as in the 2D legend styling.
                chart
                    .draw_series(std::iter::once(Text::new(
                        bar.label.clone(),
                        (bar.x, -0.5, half),
                        ("sans-serif", 13).into_font().color(&LABEL),
                    )))
                    .map_err(|e| AppError::internal("scene label", e))?;
                chart
                    .draw_series(std::iter::once(Text::new(
                        format_number(bar.value),
                        (bar.x, bar.height + 0.3, 0.0),
                        ("sans-serif", 12).into_font().color(&LABEL),
                    )))
                    .map_err(|e| AppError::internal("scene value", e))?;
            }

            root.present()
                .map_err(|e| AppError::internal("scene present", e))?;
        }

        std::fs::read(&path).map_err(|e| AppError::internal("scene read-back", e))
    }
}

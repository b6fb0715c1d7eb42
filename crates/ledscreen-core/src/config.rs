use crate::analyser::AnalyserSettings;
use crate::color::ColorMode;
use crate::constants::ROI;
use crate::grid::{Grid, PositionLayout};

/// Session configuration shared by the web and native frontends.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewConfig {
    pub grid: Grid,
    pub layout: PositionLayout,
    /// Radius of influence in unit-square space.
    pub roi: f32,
    pub mode: ColorMode,
    pub analyser: AnalyserSettings,
    /// Minimum time between waterfall row shifts; `None` shifts every frame.
    pub row_interval_ms: Option<f64>,
    /// Initial value of the run/stop flag.
    pub run: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            layout: PositionLayout::default(),
            roi: ROI,
            mode: ColorMode::default(),
            analyser: AnalyserSettings::default(),
            row_interval_ms: None,
            run: true,
        }
    }
}

pub mod analyser;
pub mod color;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod grid;
pub mod light_field;
pub mod shader;
pub mod spectrum;
pub mod state;

pub use analyser::{AnalyserSettings, SpectrumAnalyser, SpectrumSource};
pub use color::{ColorMapper, ColorMode};
pub use config::PreviewConfig;
pub use constants::*;
pub use driver::{DriverState, FrameDriver, FrameStep, Viewport};
pub use error::{PreviewError, Result};
pub use grid::{Grid, LedColors, LedPositions, PositionLayout};
pub use state::LedScene;

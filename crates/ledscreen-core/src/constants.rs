// Shared tuning constants used by both web and native frontends.

// Grid layout (matches the physical device)
pub const DEFAULT_GRID_WIDTH: u32 = 21;
pub const DEFAULT_GRID_HEIGHT: u32 = 13;

// Light field
pub const ROI: f32 = 0.08; // radius of influence, in unit-square space
pub const ROI_CUTOFF_FACTOR: f32 = 2.0; // contributions beyond this many ROIs are dropped

// Analyser (mirrors the WebAudio AnalyserNode settings)
pub const ANALYSER_FFT_SIZE: usize = 32;
pub const ANALYSER_MIN_DB: f32 = -90.0;
pub const ANALYSER_MAX_DB: f32 = -10.0;
pub const ANALYSER_SMOOTHING: f32 = 0.85;

// Color mapping
pub const SINUSOID_PERIOD_MS: f64 = 3000.0;
pub const EXPOSURE_BASE: f32 = 0.6;
pub const EXPOSURE_SPAN: f32 = 0.4;

// Clear color behind the field before the first frame
pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

//! Spectrum → LED color mapping.

use crate::constants::{EXPOSURE_BASE, EXPOSURE_SPAN, SINUSOID_PERIOD_MS};
use crate::error::PreviewError;
use crate::grid::{Grid, LedColors};
use crate::spectrum::{normalize_byte, resample_into};
use glam::{Vec3, Vec4};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Audio-independent traveling wave, handy as a test pattern.
    Sinusoid,
    /// Newest spectrum in row 0, older rows scroll towards the last row.
    #[default]
    Waterfall,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Sinusoid => "sinusoid",
            ColorMode::Waterfall => "waterfall",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ColorMode::Sinusoid => ColorMode::Waterfall,
            ColorMode::Waterfall => ColorMode::Sinusoid,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sinusoid" | "sinusoids" => Ok(ColorMode::Sinusoid),
            "waterfall" => Ok(ColorMode::Waterfall),
            other => Err(PreviewError::InvalidMode(other.to_string())),
        }
    }
}

/// HSV (hue in degrees, s/v in `[0, 1]`) to linear RGB in `[0, 1]`.
pub fn hsv_to_rgb(hue_deg: f32, s: f32, v: f32) -> Vec3 {
    let h = hue_deg.rem_euclid(360.0) / 60.0;
    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Vec3::new(r + m, g + m, b + m)
}

/// Brightness ramp across a row: dimmest at column 0, approaching
/// `EXPOSURE_BASE` at the far end.
#[inline]
pub fn exposure(column: u32, width: u32) -> f32 {
    EXPOSURE_BASE + (column as f32 / width as f32 - 1.0) * EXPOSURE_SPAN
}

/// Test-pattern color of one LED at `timestamp_ms`.
pub fn sinusoid_color(timestamp_ms: f64, row: u32, column: u32, grid: &Grid) -> Vec4 {
    let phase = TAU * timestamp_ms / SINUSOID_PERIOD_MS;
    let r = 0.5 * ((phase + TAU * (row as f64 / grid.height() as f64)).sin() + 1.0);
    let b = 0.5 * ((phase + TAU * (column as f64 / grid.width() as f64)).cos() + 1.0);
    Vec4::new(r as f32, 0.0, b as f32, 1.0)
}

/// Writes the LED color buffer from the latest spectrum, once per frame.
pub struct ColorMapper {
    grid: Grid,
    mode: ColorMode,
    row_interval_ms: Option<f64>,
    resampled: Vec<f32>,
    last_shift_ms: Option<f64>,
}

impl ColorMapper {
    pub fn new(grid: Grid, mode: ColorMode, row_interval_ms: Option<f64>) -> Self {
        Self {
            grid,
            mode,
            row_interval_ms,
            resampled: vec![0.0; grid.width() as usize],
            last_shift_ms: None,
        }
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ColorMode) {
        if mode != self.mode {
            log::info!("[color] mode {} -> {}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Spectrum resampled onto the LED columns by the last waterfall update.
    pub fn resampled(&self) -> &[f32] {
        &self.resampled
    }

    pub fn update(&mut self, timestamp_ms: f64, spectrum: &[u8], colors: &mut LedColors) {
        debug_assert_eq!(colors.len(), self.grid.num_leds());
        match self.mode {
            ColorMode::Sinusoid => self.paint_sinusoid(timestamp_ms, colors),
            ColorMode::Waterfall => self.paint_waterfall(timestamp_ms, spectrum, colors),
        }
    }

    fn paint_sinusoid(&self, timestamp_ms: f64, colors: &mut LedColors) {
        let grid = self.grid;
        for (led, c) in colors.as_mut_slice().iter_mut().enumerate() {
            let (row, column) = grid.row_col(led);
            *c = sinusoid_color(timestamp_ms, row, column, &grid);
        }
    }

    fn paint_waterfall(&mut self, timestamp_ms: f64, spectrum: &[u8], colors: &mut LedColors) {
        resample_into(spectrum, &mut self.resampled);

        if self.shift_due(timestamp_ms) {
            self.last_shift_ms = Some(timestamp_ms);
            shift_rows(&self.grid, colors);
        }

        let width = self.grid.width();
        let row0 = &mut colors.as_mut_slice()[..width as usize];
        for (column, (c, level)) in row0.iter_mut().zip(&self.resampled).enumerate() {
            let column = column as u32;
            let hue = 360.0 * column as f32 / width as f32;
            let strength = exposure(column, width) * normalize_byte(*level);
            *c = (hsv_to_rgb(hue, 1.0, 1.0) * strength).extend(1.0);
        }
    }

    fn shift_due(&self, timestamp_ms: f64) -> bool {
        match (self.row_interval_ms, self.last_shift_ms) {
            (None, _) | (Some(_), None) => true,
            (Some(interval), Some(last)) => timestamp_ms - last >= interval,
        }
    }
}

/// Moves every row one step up the index range; the last row falls off.
pub fn shift_rows(grid: &Grid, colors: &mut LedColors) {
    let w = grid.width() as usize;
    let kept = w * (grid.height() as usize - 1);
    colors.as_mut_slice().copy_within(0..kept, w);
}

//! Per-session LED state shared by the web and native frontends.
//!
//! These types avoid platform-specific APIs. A frontend owns one
//! [`LedScene`], feeds it a [`SpectrumSource`] once per frame and hands the
//! resulting buffers to the renderer by reference.

use crate::analyser::SpectrumSource;
use crate::color::{ColorMapper, ColorMode};
use crate::config::PreviewConfig;
use crate::grid::{Grid, LedColors, LedPositions};

pub struct LedScene {
    grid: Grid,
    positions: LedPositions,
    colors: LedColors,
    mapper: ColorMapper,
    histogram: Vec<u8>,
}

impl LedScene {
    pub fn new(config: &PreviewConfig) -> Self {
        let grid = config.grid;
        Self {
            grid,
            positions: LedPositions::new(&grid, config.layout),
            colors: LedColors::gradient(&grid),
            mapper: ColorMapper::new(grid, config.mode, config.row_interval_ms),
            histogram: vec![0; config.analyser.bin_count()],
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn positions(&self) -> &LedPositions {
        &self.positions
    }

    pub fn colors(&self) -> &LedColors {
        &self.colors
    }

    /// Latest byte histogram pulled from the analyser.
    pub fn histogram(&self) -> &[u8] {
        &self.histogram
    }

    pub fn mode(&self) -> ColorMode {
        self.mapper.mode()
    }

    pub fn set_mode(&mut self, mode: ColorMode) {
        self.mapper.set_mode(mode);
    }

    /// Pulls the spectrum and rewrites the color buffer. Must finish before the
    /// draw that reads [`LedScene::colors`].
    pub fn step(&mut self, timestamp_ms: f64, source: &mut dyn SpectrumSource) {
        let bins = source.bin_count();
        if self.histogram.len() != bins {
            self.histogram.resize(bins, 0);
        }
        source.read_bytes(&mut self.histogram);
        self.apply(timestamp_ms);
    }

    /// Rewrites colors from an already captured histogram.
    pub fn step_with(&mut self, timestamp_ms: f64, histogram: &[u8]) {
        self.histogram.clear();
        self.histogram.extend_from_slice(histogram);
        self.apply(timestamp_ms);
    }

    fn apply(&mut self, timestamp_ms: f64) {
        self.mapper
            .update(timestamp_ms, &self.histogram, &mut self.colors);
    }
}

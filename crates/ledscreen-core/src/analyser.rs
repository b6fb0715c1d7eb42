//! Frequency analysis of the microphone signal.
//!
//! [`SpectrumSource`] is the seam between the color mapper and whatever
//! produces the byte histogram: the browser's `AnalyserNode` on the web, or
//! [`SpectrumAnalyser`] fed from a cpal input stream on native.

use crate::constants::{ANALYSER_FFT_SIZE, ANALYSER_MAX_DB, ANALYSER_MIN_DB, ANALYSER_SMOOTHING};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::Arc;

/// Anything that can hand out a byte magnitude spectrum once per frame.
pub trait SpectrumSource {
    /// Number of frequency bins (`fft_size / 2`).
    fn bin_count(&self) -> usize;
    /// Writes the latest magnitudes (0..=255) into `out`. Extra slots are
    /// zeroed; surplus bins are dropped.
    fn read_bytes(&mut self, out: &mut [u8]);
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyserSettings {
    pub fft_size: usize,
    pub min_db: f32,
    pub max_db: f32,
    pub smoothing: f32,
}

impl Default for AnalyserSettings {
    fn default() -> Self {
        Self {
            fft_size: ANALYSER_FFT_SIZE,
            min_db: ANALYSER_MIN_DB,
            max_db: ANALYSER_MAX_DB,
            smoothing: ANALYSER_SMOOTHING,
        }
    }
}

impl AnalyserSettings {
    #[inline]
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Host-side equivalent of the WebAudio `AnalyserNode` byte spectrum:
/// Blackman window, FFT, magnitude over N, exponential smoothing over time,
/// then decibels mapped linearly from `[min_db, max_db]` onto `0..=255`.
pub struct SpectrumAnalyser {
    settings: AnalyserSettings,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: VecDeque<f32>,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl SpectrumAnalyser {
    pub fn new(mut settings: AnalyserSettings) -> Self {
        let size = settings.fft_size.next_power_of_two().clamp(32, 32768);
        if size != settings.fft_size {
            log::warn!(
                "[analyser] fft_size {} is not a power of two in 32..=32768, using {}",
                settings.fft_size,
                size
            );
            settings.fft_size = size;
        }
        settings.smoothing = settings.smoothing.clamp(0.0, 1.0);

        let fft = FftPlanner::new().plan_fft_forward(size);
        let window = blackman_window(size);
        Self {
            fft,
            window,
            samples: VecDeque::from(vec![0.0; size]),
            smoothed: vec![0.0; size / 2],
            scratch: vec![Complex::new(0.0, 0.0); size],
            settings,
        }
    }

    pub fn settings(&self) -> &AnalyserSettings {
        &self.settings
    }

    /// Appends mono samples, keeping only the newest `fft_size`.
    pub fn push_samples(&mut self, samples: &[f32]) {
        for &s in samples {
            self.push_one(s);
        }
    }

    /// Appends interleaved frames, averaging the channels down to mono.
    pub fn push_interleaved(&mut self, data: &[f32], channels: usize) {
        let channels = channels.max(1);
        for frame in data.chunks(channels) {
            let sum: f32 = frame.iter().sum();
            self.push_one(sum / frame.len() as f32);
        }
    }

    #[inline]
    fn push_one(&mut self, s: f32) {
        if self.samples.len() == self.settings.fft_size {
            self.samples.pop_front();
        }
        self.samples.push_back(s);
    }

    /// Runs one analysis step and updates the smoothed magnitudes.
    fn analyse(&mut self) {
        let n = self.settings.fft_size;
        for (i, (slot, s)) in self.scratch.iter_mut().zip(self.samples.iter()).enumerate() {
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let tau = self.settings.smoothing;
        let scale = 1.0 / n as f32;
        for (k, prev) in self.smoothed.iter_mut().enumerate() {
            let mag = self.scratch[k].norm() * scale;
            let next = tau * *prev + (1.0 - tau) * mag;
            *prev = if next.is_finite() { next } else { 0.0 };
        }
    }

    #[inline]
    fn to_byte(&self, magnitude: f32) -> u8 {
        let db = 20.0 * magnitude.log10();
        let range = self.settings.max_db - self.settings.min_db;
        let scaled = (255.0 / range * (db - self.settings.min_db)).floor();
        scaled.clamp(0.0, 255.0) as u8
    }
}

impl SpectrumSource for SpectrumAnalyser {
    fn bin_count(&self) -> usize {
        self.settings.bin_count()
    }

    fn read_bytes(&mut self, out: &mut [u8]) {
        self.analyse();
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = match self.smoothed.get(i) {
                Some(&m) => self.to_byte(m),
                None => 0,
            };
        }
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}

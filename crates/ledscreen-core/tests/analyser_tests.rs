// Host-side tests for the FFT analyser that stands in for the WebAudio node.

use ledscreen_core::{AnalyserSettings, SpectrumAnalyser, SpectrumSource};
use std::f32::consts::PI;

fn sine(cycles: f32, n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (2.0 * PI * cycles * i as f32 / n as f32).sin())
        .collect()
}

fn argmax(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .enumerate()
        .max_by_key(|(_, v)| **v)
        .map(|(i, _)| i)
        .unwrap()
}

#[test]
fn default_settings_match_the_browser_node() {
    let settings = AnalyserSettings::default();
    assert_eq!(settings.fft_size, 32);
    assert_eq!(settings.bin_count(), 16);
    assert_eq!(settings.min_db, -90.0);
    assert_eq!(settings.max_db, -10.0);
    assert!((settings.smoothing - 0.85).abs() < 1e-6);
    let analyser = SpectrumAnalyser::new(settings);
    assert_eq!(analyser.bin_count(), 16);
}

#[test]
fn fft_size_is_forced_to_a_power_of_two() {
    let analyser = SpectrumAnalyser::new(AnalyserSettings {
        fft_size: 48,
        ..AnalyserSettings::default()
    });
    assert_eq!(analyser.settings().fft_size, 64);
    let tiny = SpectrumAnalyser::new(AnalyserSettings {
        fft_size: 8,
        ..AnalyserSettings::default()
    });
    assert_eq!(tiny.settings().fft_size, 32);
}

#[test]
fn silence_reads_as_zero() {
    let mut analyser = SpectrumAnalyser::new(AnalyserSettings::default());
    analyser.push_samples(&[0.0; 32]);
    let mut out = [1u8; 16];
    analyser.read_bytes(&mut out);
    assert!(out.iter().all(|&b| b == 0));
}

#[test]
fn full_scale_sine_peaks_in_its_bin() {
    let mut analyser = SpectrumAnalyser::new(AnalyserSettings {
        smoothing: 0.0,
        ..AnalyserSettings::default()
    });
    analyser.push_samples(&sine(4.0, 32));
    let mut out = [0u8; 16];
    analyser.read_bytes(&mut out);
    assert_eq!(argmax(&out), 4);
    assert!(out[4] > 200, "peak byte {}", out[4]);
    // far from the main lobe nothing reaches the floor
    assert_eq!(out[12], 0);
}

#[test]
fn smoothing_rises_towards_the_steady_level() {
    let mut analyser = SpectrumAnalyser::new(AnalyserSettings::default());
    let tone = sine(4.0, 32);
    let mut history = Vec::new();
    let mut out = [0u8; 16];
    for _ in 0..30 {
        analyser.push_samples(&tone);
        analyser.read_bytes(&mut out);
        history.push(out[4]);
    }
    assert!(history.windows(2).all(|w| w[1] >= w[0]), "{history:?}");
    assert!(history.last().unwrap() > history.first().unwrap());
}

#[test]
fn interleaved_channels_are_averaged() {
    let tone = sine(4.0, 32);
    let mut cancelled = Vec::with_capacity(64);
    for s in &tone {
        cancelled.push(*s);
        cancelled.push(-*s);
    }
    let mut analyser = SpectrumAnalyser::new(AnalyserSettings::default());
    analyser.push_interleaved(&cancelled, 2);
    let mut out = [0u8; 16];
    analyser.read_bytes(&mut out);
    assert!(out.iter().all(|&b| b == 0));

    let mut doubled = Vec::with_capacity(64);
    for s in &tone {
        doubled.push(*s);
        doubled.push(*s);
    }
    analyser.push_interleaved(&doubled, 2);
    analyser.read_bytes(&mut out);
    assert_eq!(argmax(&out), 4);
}

#[test]
fn surplus_output_slots_are_zeroed() {
    let mut analyser = SpectrumAnalyser::new(AnalyserSettings {
        smoothing: 0.0,
        ..AnalyserSettings::default()
    });
    analyser.push_samples(&sine(4.0, 32));
    let mut out = [9u8; 20];
    analyser.read_bytes(&mut out);
    assert!(out[16..].iter().all(|&b| b == 0));
}

//! CPU reference of the light-field fragment program.
//!
//! Mirrors `shaders/light_field.wgsl` term for term so the falloff can be
//! tested on the host. The GPU path is the one used for display.

use crate::constants::ROI_CUTOFF_FACTOR;
use glam::{Vec2, Vec3, Vec4};
use std::f32::consts::PI;

/// Sinc-squared glow level of an LED seen from distance `r`.
///
/// Returns `None` past the cutoff (`r > 2 * roi`); the boundary itself is
/// still evaluated.
#[inline]
pub fn level(r: f32, roi: f32) -> Option<f32> {
    if r > ROI_CUTOFF_FACTOR * roi {
        return None;
    }
    if r == 0.0 {
        return Some(1.0);
    }
    let f = PI * r / roi;
    let s = f.sin() / f;
    Some(s * s)
}

/// RGB contributed by one LED at distance `r`.
#[inline]
pub fn contribution(color: Vec4, r: f32, roi: f32) -> Vec3 {
    match level(r, roi) {
        // squared, so only float underflow could make this negative
        Some(l) if l >= 0.0 => color.truncate() * l,
        _ => Vec3::ZERO,
    }
}

/// Final RGBA of the pixel at normalized position `p` (y up, origin bottom-left).
pub fn shade(p: Vec2, positions: &[Vec3], colors: &[Vec4], roi: f32) -> Vec4 {
    let pos = p.extend(0.0);
    let light = positions
        .iter()
        .zip(colors)
        .fold(Vec3::ZERO, |acc, (led, col)| {
            acc + contribution(*col, (*led - pos).length(), roi)
        });
    light.clamp(Vec3::ZERO, Vec3::ONE).extend(1.0)
}

/// Normalized position of the pixel at framebuffer coordinate `(x, y)`, where
/// `y` counts down from the top row as wgpu reports it.
#[inline]
pub fn pixel_to_unit(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new((x as f32 + 0.5) / w, 1.0 - (y as f32 + 0.5) / h)
}

//! WGSL generation for the light-field pass.
//!
//! The fragment loop walks every LED with a constant bound, so the LED count is
//! substituted into the template text before the module is compiled.

use crate::constants::ROI_CUTOFF_FACTOR;

pub static LIGHT_FIELD_WGSL_TEMPLATE: &str = include_str!("../shaders/light_field.wgsl");

pub const VERTEX_ENTRY: &str = "vs_fullscreen";
pub const FRAGMENT_ENTRY: &str = "fs_light_field";

const NUM_LEDS_SLOT: &str = "{{NUM_LEDS}}";
const ROI_SLOT: &str = "{{ROI}}";
const CUTOFF_SLOT: &str = "{{CUTOFF}}";

/// Shader source with the grid size and radius of influence baked in.
pub fn light_field_wgsl(num_leds: usize, roi: f32) -> String {
    LIGHT_FIELD_WGSL_TEMPLATE
        .replace(NUM_LEDS_SLOT, &num_leds.to_string())
        .replace(ROI_SLOT, &wgsl_float(roi))
        .replace(CUTOFF_SLOT, &wgsl_float(ROI_CUTOFF_FACTOR))
}

// `{:?}` always keeps a decimal point, which WGSL needs for a float literal.
fn wgsl_float(v: f32) -> String {
    format!("{:?}", v)
}

/// Fixed head of the `Field` uniform; the LED arrays follow it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FieldHeader {
    pub resolution: [f32; 2],
    pub _pad: [f32; 2],
}

const VEC4_BYTES: u64 = 16;

/// Byte offset of `led_pos` inside the uniform.
pub const fn positions_offset() -> u64 {
    std::mem::size_of::<FieldHeader>() as u64
}

/// Byte offset of `led_col` inside the uniform.
pub const fn colors_offset(num_leds: usize) -> u64 {
    positions_offset() + VEC4_BYTES * num_leds as u64
}

/// Total size of the `Field` uniform.
pub const fn field_uniform_size(num_leds: usize) -> u64 {
    colors_offset(num_leds) + VEC4_BYTES * num_leds as u64
}

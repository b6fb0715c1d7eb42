//! LED lattice geometry and the two per-LED buffers the renderer consumes.
//!
//! LED `i` lives at `row = i / width`, `column = i % width`. Positions are
//! normalized to the unit square so the shader can compare them directly with
//! `pixel / resolution`.
//!
//! Both buffers are single-owner: the color mapper writes [`LedColors`] and the
//! renderer reads it by reference within the same frame step. Nothing here is
//! `Sync`-guarded; a frontend that moves color mapping onto another thread must
//! hand the buffer over through a channel rather than share it.

use crate::constants::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use crate::error::{PreviewError, Result};
use glam::{Vec3, Vec4};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PreviewError::InvalidGrid { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_leds(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// `(row, column)` of LED `led`.
    #[inline]
    pub fn row_col(&self, led: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((led / w) as u32, (led % w) as u32)
    }

    #[inline]
    pub fn index(&self, row: u32, column: u32) -> usize {
        row as usize * self.width as usize + column as usize
    }

    /// Normalized position of LED `led` under `layout`.
    pub fn position(&self, led: usize, layout: PositionLayout) -> Vec3 {
        let (row, column) = self.row_col(led);
        Vec3::new(
            layout.coordinate(column, self.width),
            layout.coordinate(row, self.height),
            0.0,
        )
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        }
    }
}

/// Parses `"WxH"`, e.g. `"21x13"`.
impl FromStr for Grid {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self> {
        let syntax = || PreviewError::GridSyntax(s.to_string());
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(syntax)?;
        let width = w.trim().parse::<u32>().map_err(|_| syntax())?;
        let height = h.trim().parse::<u32>().map_err(|_| syntax())?;
        Grid::new(width, height)
    }
}

/// Where LEDs sit inside the unit square.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PositionLayout {
    /// Inset from the edges: `(i + 1) / (n + 1)`. No LED touches the border.
    #[default]
    Inset,
    /// First and last LED flush with the border: `i / (n - 1)`.
    EdgeToEdge,
}

impl PositionLayout {
    #[inline]
    fn coordinate(self, i: u32, n: u32) -> f32 {
        match self {
            PositionLayout::Inset => (i + 1) as f32 / (n + 1) as f32,
            PositionLayout::EdgeToEdge if n <= 1 => 0.5,
            PositionLayout::EdgeToEdge => i as f32 / (n - 1) as f32,
        }
    }
}

/// Immutable per-LED positions, built once at setup.
#[derive(Clone, Debug)]
pub struct LedPositions(Vec<Vec3>);

impl LedPositions {
    pub fn new(grid: &Grid, layout: PositionLayout) -> Self {
        Self(
            (0..grid.num_leds())
                .map(|led| grid.position(led, layout))
                .collect(),
        )
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vec3] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Positions padded to `vec4` for uniform-buffer alignment.
    pub fn packed(&self) -> Vec<[f32; 4]> {
        self.0.iter().map(|p| [p.x, p.y, p.z, 0.0]).collect()
    }
}

/// Per-LED RGBA, each channel in `[0, 1]`. Rewritten every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct LedColors(Vec<Vec4>);

impl LedColors {
    pub fn filled(grid: &Grid, color: Vec4) -> Self {
        Self(vec![color; grid.num_leds()])
    }

    /// Calibration gradient shown before any audio arrives: red grows with the
    /// column, blue with the row.
    pub fn gradient(grid: &Grid) -> Self {
        let w = grid.width() as f32;
        let h = grid.height() as f32;
        Self(
            (0..grid.num_leds())
                .map(|led| {
                    let (row, column) = grid.row_col(led);
                    Vec4::new(
                        (column + 1) as f32 / (w + 1.0),
                        0.0,
                        (row + 1) as f32 / (h + 1.0),
                        1.0,
                    )
                })
                .collect(),
        )
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vec4] {
        &self.0
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Vec4] {
        &mut self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn row(&self, grid: &Grid, row: u32) -> &[Vec4] {
        let start = grid.index(row, 0);
        &self.0[start..start + grid.width() as usize]
    }

    /// Raw `f32` view for GPU upload (4 floats per LED).
    #[inline]
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.0)
    }
}

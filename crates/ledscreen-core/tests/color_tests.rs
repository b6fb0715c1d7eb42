// Host-side tests for spectrum → color mapping.

use glam::{Vec3, Vec4};
use ledscreen_core::color::{exposure, hsv_to_rgb, shift_rows, sinusoid_color};
use ledscreen_core::{
    ColorMapper, ColorMode, Grid, LedColors, LedScene, PreviewConfig, PreviewError,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_colors(grid: &Grid, seed: u64) -> LedColors {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut colors = LedColors::filled(grid, Vec4::ZERO);
    for c in colors.as_mut_slice() {
        *c = Vec4::new(rng.gen(), rng.gen(), rng.gen(), 1.0);
    }
    colors
}

fn close(a: Vec4, b: Vec4) -> bool {
    (a - b).abs().max_element() < 1e-5
}

#[test]
fn waterfall_scrolls_rows_by_one() {
    let grid = Grid::default();
    let mut mapper = ColorMapper::new(grid, ColorMode::Waterfall, None);
    let spectrum: Vec<u8> = (0..16).map(|i| (i * 15) as u8).collect();
    for seed in 0..5 {
        let mut colors = random_colors(&grid, seed);
        let before = colors.clone();
        mapper.update(seed as f64 * 16.0, &spectrum, &mut colors);
        for k in 0..grid.height() - 1 {
            assert_eq!(colors.row(&grid, k + 1), before.row(&grid, k), "row {}", k + 1);
        }
    }
}

#[test]
fn waterfall_row_zero_comes_from_the_spectrum() {
    let grid = Grid::default();
    let mut mapper = ColorMapper::new(grid, ColorMode::Waterfall, None);
    let mut colors = random_colors(&grid, 7);
    mapper.update(0.0, &[255u8; 16], &mut colors);

    let row0 = colors.row(&grid, 0);
    // hue 0 is pure red, dimmed by the column-0 exposure
    assert!(close(row0[0], Vec4::new(0.2, 0.0, 0.0, 1.0)));
    for (column, c) in row0.iter().enumerate() {
        let column = column as u32;
        let hue = 360.0 * column as f32 / grid.width() as f32;
        let expected = (hsv_to_rgb(hue, 1.0, 1.0) * exposure(column, grid.width())).extend(1.0);
        assert!(close(*c, expected), "column {column}");
    }

    mapper.update(16.0, &[0u8; 16], &mut colors);
    assert!(colors
        .row(&grid, 0)
        .iter()
        .all(|c| close(*c, Vec4::new(0.0, 0.0, 0.0, 1.0))));
}

#[test]
fn resampled_spectrum_spans_the_columns() {
    let grid = Grid::default();
    let mut mapper = ColorMapper::new(grid, ColorMode::Waterfall, None);
    let mut colors = LedColors::gradient(&grid);
    let spectrum: Vec<u8> = (0..16).map(|i| (i * 10) as u8).collect();
    mapper.update(0.0, &spectrum, &mut colors);
    let resampled = mapper.resampled();
    assert_eq!(resampled.len(), 21);
    assert_eq!(resampled[0], 0.0);
    assert_eq!(resampled[20], 150.0);
}

#[test]
fn row_interval_throttles_the_scroll() {
    let grid = Grid::new(4, 3).unwrap();
    let mut mapper = ColorMapper::new(grid, ColorMode::Waterfall, Some(100.0));
    let mut colors = random_colors(&grid, 3);
    mapper.update(0.0, &[128u8; 16], &mut colors);
    let after_first = colors.clone();

    mapper.update(50.0, &[128u8; 16], &mut colors);
    assert_eq!(colors.row(&grid, 1), after_first.row(&grid, 1));
    assert_eq!(colors.row(&grid, 2), after_first.row(&grid, 2));

    mapper.update(100.0, &[128u8; 16], &mut colors);
    assert_eq!(colors.row(&grid, 2), after_first.row(&grid, 1));
}

#[test]
fn shift_rows_on_a_single_row_grid_is_a_no_op() {
    let grid = Grid::new(5, 1).unwrap();
    let mut colors = random_colors(&grid, 11);
    let before = colors.clone();
    shift_rows(&grid, &mut colors);
    assert_eq!(colors, before);
}

#[test]
fn hsv_primaries() {
    assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(hsv_to_rgb(60.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Vec3::new(0.0, 0.0, 1.0));
    assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(hsv_to_rgb(200.0, 0.0, 0.5), Vec3::splat(0.5));
}

#[test]
fn exposure_ramps_up_across_a_row() {
    let w = 21;
    assert!((exposure(0, w) - 0.2).abs() < 1e-6);
    let ramp: Vec<f32> = (0..w).map(|c| exposure(c, w)).collect();
    assert!(ramp.windows(2).all(|p| p[1] > p[0]));
    assert!(ramp.iter().all(|&e| e > 0.0 && e < 0.6));
}

#[test]
fn sinusoid_depends_only_on_time_and_cell() {
    let grid = Grid::default();
    let a = sinusoid_color(1234.5, 3, 7, &grid);
    let b = sinusoid_color(1234.5, 3, 7, &grid);
    assert_eq!(a, b);
    assert_eq!(a.y, 0.0);
    assert_eq!(a.w, 1.0);

    let origin = sinusoid_color(0.0, 0, 0, &grid);
    assert!(close(origin, Vec4::new(0.5, 0.0, 1.0, 1.0)));
    // one full period later the pattern repeats
    let later = sinusoid_color(3000.0, 0, 0, &grid);
    assert!(close(origin, later));
}

#[test]
fn sinusoid_mode_ignores_the_spectrum() {
    let grid = Grid::new(6, 4).unwrap();
    let mut mapper = ColorMapper::new(grid, ColorMode::Sinusoid, None);
    let mut loud = LedColors::gradient(&grid);
    let mut quiet = random_colors(&grid, 5);
    mapper.update(500.0, &[255u8; 16], &mut loud);
    mapper.update(500.0, &[0u8; 16], &mut quiet);
    assert_eq!(loud, quiet);
    for (led, c) in loud.as_slice().iter().enumerate() {
        let (row, column) = grid.row_col(led);
        assert_eq!(*c, sinusoid_color(500.0, row, column, &grid));
    }
}

#[test]
fn mode_names_parse() {
    assert_eq!("waterfall".parse::<ColorMode>(), Ok(ColorMode::Waterfall));
    assert_eq!(" Sinusoids ".parse::<ColorMode>(), Ok(ColorMode::Sinusoid));
    assert_eq!(
        "plasma".parse::<ColorMode>(),
        Err(PreviewError::InvalidMode("plasma".into()))
    );
    assert_eq!(ColorMode::default(), ColorMode::Waterfall);
    assert_eq!(ColorMode::Waterfall.toggled(), ColorMode::Sinusoid);
    assert_eq!(ColorMode::Sinusoid.to_string(), "sinusoid");
}

#[test]
fn scene_starts_on_the_gradient_and_steps_from_histograms() {
    let config = PreviewConfig::default();
    let mut scene = LedScene::new(&config);
    assert_eq!(scene.colors(), &LedColors::gradient(scene.grid()));
    assert_eq!(scene.positions().len(), 273);
    assert_eq!(scene.histogram().len(), 16);

    let gradient_row0 = scene.colors().row(scene.grid(), 0).to_vec();
    scene.step_with(0.0, &[255u8; 16]);
    let grid = *scene.grid();
    assert_eq!(scene.colors().row(&grid, 1), gradient_row0.as_slice());

    scene.set_mode(ColorMode::Sinusoid);
    assert_eq!(scene.mode(), ColorMode::Sinusoid);
}

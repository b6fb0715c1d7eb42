// Host-side tests for the LED lattice and its buffers.

use glam::{Vec3, Vec4};
use ledscreen_core::{Grid, LedColors, LedPositions, PositionLayout, PreviewError};
use std::collections::HashSet;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn every_index_maps_to_a_unique_cell() {
    for (w, h) in [(1, 1), (1, 7), (5, 1), (4, 3), (21, 13)] {
        let grid = Grid::new(w, h).unwrap();
        assert_eq!(grid.num_leds(), (w * h) as usize);
        let mut seen = HashSet::new();
        for led in 0..grid.num_leds() {
            let (row, column) = grid.row_col(led);
            assert!(row < h && column < w);
            assert_eq!(grid.index(row, column), led);
            assert!(seen.insert((row, column)), "duplicate cell for led {led}");
        }
        assert_eq!(seen.len(), grid.num_leds());
    }
}

#[test]
fn zero_sized_grid_is_rejected() {
    assert_eq!(
        Grid::new(0, 13),
        Err(PreviewError::InvalidGrid {
            width: 0,
            height: 13
        })
    );
    assert!(Grid::new(21, 0).is_err());
}

#[test]
fn default_grid_matches_device() {
    let grid = Grid::default();
    assert_eq!((grid.width(), grid.height()), (21, 13));
    assert_eq!(grid.num_leds(), 273);
}

#[test]
fn first_led_sits_inset_from_the_corner() {
    let grid = Grid::default();
    let p = grid.position(0, PositionLayout::Inset);
    assert!(approx(p.x, 1.0 / 22.0));
    assert!(approx(p.y, 1.0 / 14.0));
    assert_eq!(p.z, 0.0);

    let last = grid.position(grid.num_leds() - 1, PositionLayout::Inset);
    assert!(approx(last.x, 21.0 / 22.0));
    assert!(approx(last.y, 13.0 / 14.0));
}

#[test]
fn edge_to_edge_layout_touches_the_border() {
    let grid = Grid::new(5, 3).unwrap();
    let first = grid.position(0, PositionLayout::EdgeToEdge);
    let last = grid.position(grid.num_leds() - 1, PositionLayout::EdgeToEdge);
    assert_eq!(first, Vec3::ZERO);
    assert!(approx(last.x, 1.0) && approx(last.y, 1.0));

    let single = Grid::new(1, 1).unwrap();
    let p = single.position(0, PositionLayout::EdgeToEdge);
    assert!(approx(p.x, 0.5) && approx(p.y, 0.5));
}

#[test]
fn positions_stay_inside_unit_square() {
    let grid = Grid::default();
    let positions = LedPositions::new(&grid, PositionLayout::Inset);
    assert_eq!(positions.len(), grid.num_leds());
    for p in positions.as_slice() {
        assert!(p.x > 0.0 && p.x < 1.0);
        assert!(p.y > 0.0 && p.y < 1.0);
    }
    let packed = positions.packed();
    assert_eq!(packed.len(), grid.num_leds());
    assert_eq!(packed[0][3], 0.0);
}

#[test]
fn gradient_grows_with_column_and_row() {
    let grid = Grid::new(4, 3).unwrap();
    let colors = LedColors::gradient(&grid);
    assert_eq!(colors.len(), 12);
    let first = colors.as_slice()[0];
    assert!(approx(first.x, 1.0 / 5.0));
    assert!(approx(first.z, 1.0 / 4.0));
    assert_eq!(first.y, 0.0);
    assert_eq!(first.w, 1.0);
    let row = colors.row(&grid, 2);
    assert!(row.windows(2).all(|p| p[1].x > p[0].x));
    assert!(row.iter().all(|c| approx(c.z, 3.0 / 4.0)));
}

#[test]
fn color_floats_are_four_per_led() {
    let grid = Grid::new(3, 2).unwrap();
    let colors = LedColors::filled(&grid, Vec4::new(0.1, 0.2, 0.3, 1.0));
    let floats = colors.as_floats();
    assert_eq!(floats.len(), 24);
    assert_eq!(&floats[4..8], &[0.1, 0.2, 0.3, 1.0]);
}

#[test]
fn grid_parses_from_text() {
    let grid: Grid = "21x13".parse().unwrap();
    assert_eq!(grid, Grid::default());
    let grid: Grid = " 8X4 ".parse().unwrap();
    assert_eq!((grid.width(), grid.height()), (8, 4));
    assert_eq!(
        "21".parse::<Grid>(),
        Err(PreviewError::GridSyntax("21".into()))
    );
    assert_eq!(
        "0x4".parse::<Grid>(),
        Err(PreviewError::InvalidGrid {
            width: 0,
            height: 4
        })
    );
}

#[test]
fn malformed_grid_text_is_named_in_the_error() {
    let err = "ax4".parse::<Grid>().unwrap_err();
    assert_eq!(err, PreviewError::GridSyntax("ax4".into()));
    assert_eq!(
        err.to_string(),
        "cannot parse grid \"ax4\", expected WxH such as \"21x13\""
    );
    assert!("8x-1".parse::<Grid>().is_err());
}

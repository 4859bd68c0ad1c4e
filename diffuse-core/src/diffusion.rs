//! One-generation stencil update for the diffusion grid.
//!
//! Each [`step`] call:
//! 1. Computes every cell of the next generation from the current one,
//!    per channel plane. Reads touch only `current`, writes only `next`,
//!    so the per-cell updates are independent.
//! 2. Swaps the two generations, making the freshly computed one
//!    renderable. Callers never observe the state between the two phases.
//!
//! A non-emitter cell keeps `1 - d` of its own intensity and receives
//! `d / 8` of each in-bounds Moore neighbor's intensity, where `d` is the
//! grid's diffusion coefficient. Neighbors outside the grid contribute
//! nothing and their share is *not* redistributed: corner cells collect
//! from 3 neighbors and edge cells from 5, so boundary cells bleed
//! intensity over successive steps. That boundary decay is a documented
//! quirk of the simulation, kept as-is.
//!
//! Emitter cells are carried over verbatim and act as fixed-value sources.

use crate::grid::DiffusionGrid;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Advances the simulation by exactly one generation.
///
/// With the `parallel` feature (default) the row loop of each channel
/// plane runs on the rayon thread pool; rows write disjoint slices of
/// `next`, and the generation swap happens only after every row has been
/// computed. The scalar path produces bit-identical results.
pub fn step(grid: &mut DiffusionGrid) {
    let (width, height) = grid.dimensions();
    let d = grid.diffuse_percent();

    diffuse_plane(&grid.current.red, &mut grid.next.red, &grid.emitter, width, height, d);
    diffuse_plane(&grid.current.green, &mut grid.next.green, &grid.emitter, width, height, d);
    diffuse_plane(&grid.current.blue, &mut grid.next.blue, &grid.emitter, width, height, d);

    grid.swap_planes();
}

/// Computes one channel's next generation from its current one.
fn diffuse_plane(curr: &[f64], next: &mut [f64], emitter: &[bool], width: usize, height: usize, d: f64) {
    #[cfg(feature = "parallel")]
    {
        next.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| diffuse_row(curr, row, emitter, width, height, y, d));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (y, row) in next.chunks_mut(width).enumerate() {
            diffuse_row(curr, row, emitter, width, height, y, d);
        }
    }
}

fn diffuse_row(curr: &[f64], row: &mut [f64], emitter: &[bool], width: usize, height: usize, y: usize, d: f64) {
    for (x, out) in row.iter_mut().enumerate() {
        *out = diffuse_cell(curr, emitter, width, height, x, y, d);
    }
}

/// Next-generation value of a single cell in one channel plane.
fn diffuse_cell(
    curr: &[f64],
    emitter: &[bool],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    d: f64,
) -> f64 {
    let idx = y * width + x;

    // Emitter values are constant across generations.
    if emitter[idx] {
        return curr[idx];
    }

    let mut value = curr[idx] * (1.0 - d);

    for dy in -1i32..=1 {
        for dx in -1i32..=1 {
            // Skip the center cell.
            if dx == 0 && dy == 0 {
                continue;
            }

            let nx = x as i32 + dx;
            let ny = y as i32 + dy;
            if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                continue;
            }

            value += curr[ny as usize * width + nx as usize] * d / 8.0;
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Channel, Rgb};

    /// `d = 0.5` keeps every expected value exactly representable, so the
    /// assertions below compare floats for equality on purpose.
    const D: f64 = 0.5;

    fn white_grid(width: usize, height: usize) -> DiffusionGrid {
        let mut grid = DiffusionGrid::new(width, height, D).unwrap();
        let brush = 2 * (width.max(height) as i32);
        grid.paint(width as i32 / 2, height as i32 / 2, brush, Rgb::WHITE, false);
        grid
    }

    #[test]
    fn corner_and_edge_cells_lose_the_missing_neighbor_weight() {
        let mut grid = white_grid(4, 4);

        step(&mut grid);

        for channel in Channel::ALL {
            let plane = grid.channel(channel);

            // Corner: 3 neighbors. 0.5 * 1 + 3 * (0.5 / 8) = 0.6875.
            assert_eq!(plane[0], 0.6875);

            // Edge: 5 neighbors. 0.5 * 1 + 5 * (0.5 / 8) = 0.8125.
            assert_eq!(plane[1], 0.8125);

            // Interior: all 8 neighbors, the weights sum to exactly 1.
            assert_eq!(plane[1 * 4 + 1], 1.0);
        }
    }

    #[test]
    fn all_four_corners_and_edges_decay_symmetrically() {
        let mut grid = white_grid(4, 4);

        step(&mut grid);

        let red = grid.channel(Channel::Red);
        for (x, y) in [(0, 0), (3, 0), (0, 3), (3, 3)] {
            assert_eq!(red[y * 4 + x], 0.6875, "corner ({x}, {y})");
        }
        for (x, y) in [(1, 0), (2, 0), (0, 1), (3, 1), (0, 2), (3, 2), (1, 3), (2, 3)] {
            assert_eq!(red[y * 4 + x], 0.8125, "edge ({x}, {y})");
        }
    }

    #[test]
    fn impulse_spreads_d_over_8_to_each_neighbor() {
        let mut grid = DiffusionGrid::new(5, 5, D).unwrap();
        grid.current.red[2 * 5 + 2] = 1.0;

        step(&mut grid);

        let red = grid.channel(Channel::Red);
        for y in 0..5usize {
            for x in 0..5usize {
                let dx = x.abs_diff(2);
                let dy = y.abs_diff(2);
                let expected = match dx.max(dy) {
                    0 => 0.5,    // 1 - d
                    1 => 0.0625, // d / 8
                    _ => 0.0,
                };
                assert_eq!(red[y * 5 + x], expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn emitters_are_constant_across_steps() {
        let mut grid = DiffusionGrid::new(6, 6, D).unwrap();
        grid.paint(3, 3, 2, Rgb::new(0.3, 0.6, 0.9), true);

        for _ in 0..5 {
            step(&mut grid);
        }

        assert!(grid.is_emitter(2, 2));
        assert_eq!(grid.channel(Channel::Red)[2 * 6 + 2], 0.3);
        assert_eq!(grid.channel(Channel::Green)[2 * 6 + 2], 0.6);
        assert_eq!(grid.channel(Channel::Blue)[2 * 6 + 2], 0.9);

        // The emitter still feeds its neighbors every step.
        assert!(grid.channel(Channel::Red)[2 * 6 + 3] > 0.0);
    }

    #[test]
    fn step_swaps_in_the_new_generation_without_regressing() {
        let mut grid = DiffusionGrid::new(5, 5, D).unwrap();
        grid.current.red[2 * 5 + 2] = 1.0;

        step(&mut grid);
        let gen1_center = grid.channel(Channel::Red)[2 * 5 + 2];
        let gen1_far = grid.channel(Channel::Red)[2 * 5];
        assert_eq!(gen1_center, 0.5);
        // Two cells away from the impulse: untouched after one step.
        assert_eq!(gen1_far, 0.0);

        step(&mut grid);
        let gen2_center = grid.channel(Channel::Red)[2 * 5 + 2];
        let gen2_far = grid.channel(Channel::Red)[2 * 5];

        // The second generation derives from the first, not from the
        // original impulse: the center keeps shrinking and the front
        // advances one more ring.
        assert!(gen2_center < gen1_center);
        assert!(gen2_far > 0.0);
    }

    #[test]
    fn uniform_interior_is_preserved_exactly() {
        // On a field large enough to have a deep interior, the convex
        // weights sum to 1 and a uniform region stays uniform.
        let mut grid = white_grid(10, 10);

        step(&mut grid);

        let red = grid.channel(Channel::Red);
        for y in 1..9 {
            for x in 1..9 {
                assert_eq!(red[y * 10 + x], 1.0, "interior cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn out_of_range_coefficient_produces_out_of_range_values() {
        // d = 2 is accepted and yields blends outside [0, 1].
        let mut grid = DiffusionGrid::new(5, 5, 2.0).unwrap();
        grid.current.red[2 * 5 + 2] = 1.0;

        step(&mut grid);

        let red = grid.channel(Channel::Red);
        assert_eq!(red[2 * 5 + 2], -1.0); // 1 * (1 - 2)
        assert_eq!(red[2 * 5 + 3], 0.25); // 1 * 2 / 8
    }

    #[test]
    fn clear_then_step_keeps_the_grid_black() {
        let mut grid = white_grid(6, 6);
        step(&mut grid);

        grid.clear();
        step(&mut grid);

        for channel in Channel::ALL {
            assert!(grid.channel(channel).iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn single_row_grid_only_sees_lateral_neighbors() {
        // A 1-high grid has no vertical neighbors anywhere: every cell
        // collects at most 2 of the 8 shares.
        let mut grid = DiffusionGrid::new(4, 1, D).unwrap();
        grid.current.red.fill(1.0);

        step(&mut grid);

        let red = grid.channel(Channel::Red);
        // Ends: 1 neighbor. 0.5 + 0.0625 = 0.5625.
        assert_eq!(red[0], 0.5625);
        assert_eq!(red[3], 0.5625);
        // Middle: 2 neighbors. 0.5 + 2 * 0.0625 = 0.625.
        assert_eq!(red[1], 0.625);
        assert_eq!(red[2], 0.625);
    }
}

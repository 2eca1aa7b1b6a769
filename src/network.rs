//! Mass-point grid and spring topology construction.
//!
//! Points are laid out row-major: column `i` in `0..=cols`, row `j` in
//! `0..=rows`, index `j * (cols + 1) + i`. Springs are emitted in a fixed
//! order (structural rows, structural columns, shear, bend rows, bend
//! columns). The Provot pass walks them in that order and is not iterated to
//! convergence, so the order is part of the observable behaviour.

use glam::Vec3;

use crate::cloth::{ClothState, PointParams};
use crate::config::{ClothConfig, PinPolicy};
use crate::error::ConfigError;
use crate::pins::PinSet;
use crate::spring::{Spring, SpringConstants, SpringKind};

/// Build the full cloth described by `config`.
pub fn build(config: &ClothConfig) -> Result<ClothState, ConfigError> {
    config.validate()?;

    let (cols, rows) = (config.cols, config.rows);
    let positions = grid_positions(cols, rows, config.size, config.height);

    let mut springs = Vec::with_capacity(spring_capacity(cols, rows));
    structural_springs(&positions, cols, rows, config.structural, &mut springs);
    shear_springs(&positions, cols, rows, config.shear, &mut springs);
    bend_springs(&positions, cols, rows, config.bend, &mut springs);

    let pins = match &config.pins {
        PinPolicy::Corners => PinSet::corners(cols, rows),
        PinPolicy::Indices(indices) => PinSet::from_indices(positions.len(), indices.iter().copied()),
        PinPolicy::None => PinSet::empty(positions.len()),
    };

    let triangles = triangle_indices(cols, rows);

    log::info!(
        "Built {}x{} cloth: {} points, {} springs, {} triangles, {} pinned",
        cols,
        rows,
        positions.len(),
        springs.len(),
        triangles.len(),
        pins.len()
    );

    Ok(ClothState::from_parts(
        positions,
        springs,
        pins,
        triangles,
        PointParams {
            gravity: config.gravity,
            damping: config.damping,
            mass: config.mass,
        },
    ))
}

/// Initial point placement: a flat sheet at `height`, centered on x, spanning
/// `0..size` along z.
pub fn grid_positions(cols: usize, rows: usize, size: f32, height: f32) -> Vec<Vec3> {
    let u = cols + 1;
    let v = rows + 1;
    let half = size / 2.0;
    let mut positions = Vec::with_capacity(u * v);
    for j in 0..v {
        for i in 0..u {
            positions.push(Vec3::new(
                ((i as f32 / (u - 1) as f32) * 2.0 - 1.0) * half,
                height,
                (j as f32 / (v - 1) as f32) * size,
            ));
        }
    }
    positions
}

/// Horizontal neighbors row by row, then vertical neighbors column by column.
pub fn structural_springs(
    positions: &[Vec3],
    cols: usize,
    rows: usize,
    constants: SpringConstants,
    out: &mut Vec<Spring>,
) {
    let (u, v) = (cols + 1, rows + 1);
    let kind = SpringKind::Structural;

    for row in 0..v {
        for c in 0..u - 1 {
            out.push(Spring::between(positions, row * u + c, row * u + c + 1, constants, kind));
        }
    }

    for col in 0..u {
        for r in 0..v - 1 {
            out.push(Spring::between(positions, r * u + col, (r + 1) * u + col, constants, kind));
        }
    }
}

/// Both diagonals of every cell.
pub fn shear_springs(
    positions: &[Vec3],
    cols: usize,
    rows: usize,
    constants: SpringConstants,
    out: &mut Vec<Spring>,
) {
    let (u, v) = (cols + 1, rows + 1);
    let kind = SpringKind::Shear;

    for r in 0..v - 1 {
        for c in 0..u - 1 {
            out.push(Spring::between(positions, r * u + c, (r + 1) * u + c + 1, constants, kind));
            out.push(Spring::between(positions, (r + 1) * u + c, r * u + c + 1, constants, kind));
        }
    }
}

/// Skip-one springs along every row and column.
///
/// Each row and column also gets an explicit spring between its third-last
/// and last points. That pair is already covered by the skip-one loop, so
/// the closing spring doubles its stiffness; this is kept for parity with the
/// reference scene.
pub fn bend_springs(
    positions: &[Vec3],
    cols: usize,
    rows: usize,
    constants: SpringConstants,
    out: &mut Vec<Spring>,
) {
    let (u, v) = (cols + 1, rows + 1);
    let kind = SpringKind::Bend;

    for row in 0..v {
        for c in 0..u.saturating_sub(2) {
            out.push(Spring::between(positions, row * u + c, row * u + c + 2, constants, kind));
        }
        if u >= 3 {
            out.push(Spring::between(positions, row * u + u - 3, row * u + u - 1, constants, kind));
        }
    }

    for col in 0..u {
        for r in 0..v.saturating_sub(2) {
            out.push(Spring::between(positions, r * u + col, (r + 2) * u + col, constants, kind));
        }
        if v >= 3 {
            out.push(Spring::between(
                positions,
                (v - 3) * u + col,
                (v - 1) * u + col,
                constants,
                kind,
            ));
        }
    }
}

/// Two triangles per cell, alternating the split diagonal with `(row + col) % 2`.
pub fn triangle_indices(cols: usize, rows: usize) -> Vec<[u32; 3]> {
    let u = (cols + 1) as u32;
    let mut triangles = Vec::with_capacity(cols * rows * 2);
    for i in 0..rows as u32 {
        for j in 0..cols as u32 {
            let i0 = i * u + j;
            let i1 = i0 + 1;
            let i2 = i0 + u;
            let i3 = i2 + 1;
            if (i + j) % 2 == 1 {
                triangles.push([i0, i2, i1]);
                triangles.push([i1, i2, i3]);
            } else {
                triangles.push([i0, i2, i3]);
                triangles.push([i0, i3, i1]);
            }
        }
    }
    triangles
}

fn spring_capacity(cols: usize, rows: usize) -> usize {
    let (u, v) = (cols + 1, rows + 1);
    let structural = v * (u - 1) + u * (v - 1);
    let shear = 2 * cols * rows;
    let bend = v * (u - 1) + u * (v - 1);
    structural + shear + bend
}

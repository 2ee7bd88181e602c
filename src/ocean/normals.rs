//! Surface normals from a height field.

use rayon::prelude::*;

use crate::grid::{DisplacementField, Grid, NormalField};

/// Derive unit normals by central differences with toroidal wrap.
///
/// With `t = texel_size`, the tangents are `dx = (2t, h(x+1)-h(x-1), 0)` and
/// `dz = (0, h(y+1)-h(y-1), 2t)`; the normal is `normalize(dz × dx)`, which
/// points up (+y) on a flat surface.
pub fn derive_normals(field: &DisplacementField, texel_size: f32) -> NormalField {
    heights_to_normals(&field.height, texel_size)
}

/// Same as [`derive_normals`] for a bare height grid.
pub fn heights_to_normals(height: &Grid<f32>, texel_size: f32) -> NormalField {
    let n = height.resolution();
    let mut normals = Grid::new(n, [0.0f32, 1.0, 0.0]);
    let span = 2.0 * texel_size;

    normals
        .as_mut_slice()
        .par_chunks_mut(n.max(1))
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as isize;
            for (x, normal) in row.iter_mut().enumerate() {
                let x = x as isize;
                let slope_x = height.get_wrapped(x + 1, y) - height.get_wrapped(x - 1, y);
                let slope_z = height.get_wrapped(x, y + 1) - height.get_wrapped(x, y - 1);
                // dz × dx = (-slope_x·span, span², -slope_z·span) / span
                *normal = normalize([-slope_x, span, -slope_z]);
            }
        });

    normals
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len > 0.0 {
        [v[0] / len, v[1] / len, v[2] / len]
    } else {
        [0.0, 1.0, 0.0]
    }
}

//! Energy-sampling stabilization
//!
//! Transverse shear is split between the fully integrated term and a term
//! built from the area-averaged shear operator, weighted by
//! `α = Φ / (1 + Φ)` with `Φ = (t / he / √2)²`. The drilling rotation of each
//! node is tied to the in-plane rotation of the element by a spring on
//! `θ3_k - ω3`, which leaves rigid rotations free.

use std::f64::consts::SQRT_2;

use super::{bending_rotation_diagonal_sum, integrate_local, ElementContext, ElementWorkspace};
use crate::error::ShellResult;
use crate::math::component::THETA3;
use crate::math::{dof, Mat, DOFS_PER_NODE};

/// Weight of the fully integrated shear term for thickness `t` and element size `he`
pub fn shear_blend_factor(thickness: f64, size: f64) -> f64 {
    let phi = (thickness / size / SQRT_2).powi(2);
    phi / (1.0 + phi)
}

/// Add the relative drilling springs to a local element matrix
///
/// `w` is the center rotation operator; its third row gives the in-plane
/// rotation `ω3`. Each node gets `k_d (θ3_k - ω3)²`, where `k_d` is `scale`
/// times the mean of the bending-rotation diagonal terms.
pub(crate) fn add_drilling_springs(k: &mut Mat, w: &Mat, nodes: usize, scale: f64) {
    let kd = scale * bending_rotation_diagonal_sum(k, nodes) / (2 * nodes) as f64;
    let nd = DOFS_PER_NODE * nodes;
    let mut a = [0.0; 4 * DOFS_PER_NODE];
    for n in 0..nodes {
        for (c, ac) in a[..nd].iter_mut().enumerate() {
            *ac = -w[(2, c)];
        }
        a[dof(n, THETA3)] += 1.0;
        for j in 0..nd {
            if a[j] == 0.0 {
                continue;
            }
            for i in 0..nd {
                k[(i, j)] += kd * a[i] * a[j];
            }
        }
    }
}

/// Element stiffness in global coordinates, left in the workspace
pub fn element_stiffness(
    ctx: &ElementContext<'_>,
    ws: &mut ElementWorkspace,
    element: usize,
    drilling_scale: f64,
) -> ShellResult<()> {
    let frame = ctx.prepare(ws, element)?;
    let nodes = ctx.set.nodes_per_element();
    let alpha = shear_blend_factor(ctx.set.thickness(), frame.size);

    integrate_local(ctx, ws, element, &frame, alpha)?;
    ws.center_rotation(element)?;
    add_drilling_springs(&mut ws.k, &ws.w, nodes, drilling_scale);

    ws.linked_transform(&frame);
    ws.to_global();
    Ok(())
}

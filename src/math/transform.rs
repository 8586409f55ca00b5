//! Local to global transformation of element matrices
//!
//! An element transformation `T` maps the global dofs of an element to its
//! local dofs, so `K_global = Tᵀ K_local T`. Its basic form carries the frame
//! transpose `Fᵀ` on every dof triple. Nodes of a warped quadrilateral sit at
//! an offset `z` from the facet plane; their local translations are linked to
//! the rotations by `z (-θ2, θ1, 0)` so that rigid motions of the warped
//! element stay strain free.
//!
//! All functions write into caller-owned buffers sized `6n x 6n`.

use super::component::{THETA1, U1, U2};
use super::frame::ElementFrame;
use super::{dof, Mat, Mat3, Vec3};

/// Fill `t` with the block-diagonal frame transformation
pub fn frame_transform(rotation: &Mat3, t: &mut Mat) {
    let ft = rotation.transpose();
    t.fill(0.0);
    for triple in 0..t.nrows() / 3 {
        t.fixed_view_mut::<3, 3>(3 * triple, 3 * triple).copy_from(&ft);
    }
}

/// Link the local translations of off-plane nodes to their rotations
///
/// `x` are the global nodal coordinates. Nodes in the facet plane are left
/// unchanged, so this is a no-op for triangles.
pub fn add_offset_links(frame: &ElementFrame, x: &[Vec3], t: &mut Mat) {
    let e1 = frame.rotation.column(0);
    let e2 = frame.rotation.column(1);
    let e3 = frame.rotation.column(2);
    for (k, p) in x.iter().enumerate() {
        let z = (p - frame.centroid).dot(&e3);
        if z == 0.0 {
            continue;
        }
        for j in 0..3 {
            t[(dof(k, U1), dof(k, THETA1) + j)] -= z * e2[j];
            t[(dof(k, U2), dof(k, THETA1) + j)] += z * e1[j];
        }
    }
}

/// `Tᵀ K T` into `out`, with `scratch` holding `K T`
///
/// The result is symmetrized to remove round-off asymmetry.
pub fn congruence(k_local: &Mat, t: &Mat, scratch: &mut Mat, out: &mut Mat) {
    scratch.gemm(1.0, k_local, t, 0.0);
    out.gemm_tr(1.0, t, scratch, 0.0);
    let n = out.nrows();
    for j in 0..n {
        for i in (j + 1)..n {
            let avg = 0.5 * (out[(i, j)] + out[(j, i)]);
            out[(i, j)] = avg;
            out[(j, i)] = avg;
        }
    }
}

//! Strain-displacement operators of the flat shell
//!
//! All operators act on the element dof vector in the local frame, laid out
//! node-major as `[u1, u2, u3, θ1, θ2, θ3]`. With the through-thickness
//! displacement `u = z (θ2 e1 - θ1 e2)`:
//!
//! - membrane strains   `[u1,x, u2,y, u1,y + u2,x]`
//! - curvatures         `[θ2,x, -θ1,y, θ2,y - θ1,x]`
//! - transverse shears  `[u3,x + θ2, u3,y - θ1]`
//!
//! The drilling rotation θ3 does not enter any strain operator; it is only
//! compared with the in-plane rotation of [`center_rotation_operator`].

use super::component::{THETA1, THETA2, U1, U2, U3};
use super::quadrature::q4_shape;
use super::{dof, Mat, Mat2};
use crate::error::{ShellError, ShellResult};

/// Inverse Jacobian and its determinant
///
/// `xl` are the local nodal coordinates; the Jacobian is `J[i][j] = ∂x_j/∂ξ_i`.
fn inverse_jacobian(element: usize, xl: &[[f64; 2]], dn_dparam: &[[f64; 2]]) -> ShellResult<(Mat2, f64)> {
    let mut jac = Mat2::zeros();
    for (x, g) in xl.iter().zip(dn_dparam) {
        for i in 0..2 {
            for j in 0..2 {
                jac[(i, j)] += g[i] * x[j];
            }
        }
    }
    let det = jac.determinant();
    if !(det > 0.0) {
        return Err(ShellError::degenerate(
            element,
            format!("inverted or collapsed element (Jacobian determinant {det:e})"),
        ));
    }
    Ok((Mat2::new(jac[(1, 1)], -jac[(0, 1)], -jac[(1, 0)], jac[(0, 0)]) / det, det))
}

/// Map parametric gradients to local in-plane gradients
///
/// Returns the Jacobian determinant, which must be positive.
pub fn local_gradients(
    element: usize,
    xl: &[[f64; 2]],
    dn_dparam: &[[f64; 2]],
    out: &mut Vec<[f64; 2]>,
) -> ShellResult<f64> {
    let (inv, det) = inverse_jacobian(element, xl, dn_dparam)?;
    out.clear();
    out.extend(dn_dparam.iter().map(|g| {
        [
            inv[(0, 0)] * g[0] + inv[(0, 1)] * g[1],
            inv[(1, 0)] * g[0] + inv[(1, 1)] * g[1],
        ]
    }));
    Ok(det)
}

/// Membrane operator (3 x 6n)
pub fn membrane_operator(gradn: &[[f64; 2]], b: &mut Mat) {
    b.fill(0.0);
    for (k, g) in gradn.iter().enumerate() {
        b[(0, dof(k, U1))] = g[0];
        b[(1, dof(k, U2))] = g[1];
        b[(2, dof(k, U1))] = g[1];
        b[(2, dof(k, U2))] = g[0];
    }
}

/// Bending (curvature) operator (3 x 6n)
pub fn bending_operator(gradn: &[[f64; 2]], b: &mut Mat) {
    b.fill(0.0);
    for (k, g) in gradn.iter().enumerate() {
        b[(0, dof(k, THETA2))] = g[0];
        b[(1, dof(k, THETA1))] = -g[1];
        b[(2, dof(k, THETA1))] = -g[0];
        b[(2, dof(k, THETA2))] = g[1];
    }
}

/// Discrete-shear-gap transverse shear operator of the linear triangle (2 x 18)
///
/// The shear gap at node i relative to node 1 is
/// `Δw_i = u3_i - u3_1 + (x_i - x_1)·(β_1 + β_i)/2` with `β = (θ2, -θ1)`,
/// and the shear strain is `γ = Σ_i ∇N_i Δw_i`. Constant over the element.
pub fn dsg_shear_operator(xl: &[[f64; 2]], gradn: &[[f64; 2]], b: &mut Mat) {
    b.fill(0.0);
    for i in 1..3 {
        let dx = xl[i][0] - xl[0][0];
        let dy = xl[i][1] - xl[0][1];
        for r in 0..2 {
            let g = gradn[i][r];
            b[(r, dof(i, U3))] += g;
            b[(r, dof(0, U3))] -= g;
            for node in [0, i] {
                b[(r, dof(node, THETA2))] += g * dx / 2.0;
                b[(r, dof(node, THETA1))] -= g * dy / 2.0;
            }
        }
    }
}

/// Tying points of the assumed shear: γ_ξ on the edges η = ∓1, γ_η on ξ = ∓1
const MITC4_TYING: [([f64; 2], usize); 4] = [
    ([0.0, -1.0], 0),
    ([0.0, 1.0], 0),
    ([-1.0, 0.0], 1),
    ([1.0, 0.0], 1),
];

/// Covariant shear `w,d + β·x,d` at a parametric point, as a row over the 24 quad dofs
fn covariant_shear_row(xl: &[[f64; 2]], point: [f64; 2], direction: usize) -> [f64; 24] {
    let (n, dn) = q4_shape(point);
    let mut tangent = [0.0; 2];
    for (x, g) in xl.iter().zip(&dn) {
        tangent[0] += g[direction] * x[0];
        tangent[1] += g[direction] * x[1];
    }
    let mut row = [0.0; 24];
    for k in 0..4 {
        row[dof(k, U3)] = dn[k][direction];
        row[dof(k, THETA2)] = n[k] * tangent[0];
        row[dof(k, THETA1)] = -n[k] * tangent[1];
    }
    row
}

/// Assumed transverse shear of the bilinear quadrilateral at `param` (2 x 24)
///
/// Covariant shears are tied at the edge midpoints (MITC4) and interpolated
/// linearly across the element, then mapped to the local axes with the
/// Jacobian at `param`. Pure bending carries no shear.
pub fn mitc4_shear_operator(element: usize, xl: &[[f64; 2]], param: [f64; 2], b: &mut Mat) -> ShellResult<()> {
    let [xi, eta] = param;
    let (_, dn) = q4_shape(param);
    let (inv, _) = inverse_jacobian(element, xl, &dn)?;
    let [bottom, top, left, right] = MITC4_TYING.map(|(point, direction)| covariant_shear_row(xl, point, direction));
    for j in 0..24 {
        let g_xi = 0.5 * (1.0 - eta) * bottom[j] + 0.5 * (1.0 + eta) * top[j];
        let g_eta = 0.5 * (1.0 - xi) * left[j] + 0.5 * (1.0 + xi) * right[j];
        b[(0, j)] = inv[(0, 0)] * g_xi + inv[(0, 1)] * g_eta;
        b[(1, j)] = inv[(1, 0)] * g_xi + inv[(1, 1)] * g_eta;
    }
    Ok(())
}

/// Rotation of the element implied by its translations (3 x 6n)
///
/// Evaluated from the shape gradients at one point, normally the parametric
/// center: `ω1 = u3,y`, `ω2 = -u3,x`, `ω3 = (u2,x - u1,y) / 2`. A rigid
/// motion is reproduced exactly.
pub fn center_rotation_operator(
    element: usize,
    xl: &[[f64; 2]],
    dn_dparam: &[[f64; 2]],
    gradn: &mut Vec<[f64; 2]>,
    w: &mut Mat,
) -> ShellResult<()> {
    local_gradients(element, xl, dn_dparam, gradn)?;
    w.fill(0.0);
    for (k, g) in gradn.iter().enumerate() {
        w[(0, dof(k, U3))] = g[1];
        w[(1, dof(k, U3))] = -g[0];
        w[(2, dof(k, U1))] = -0.5 * g[1];
        w[(2, dof(k, U2))] = 0.5 * g[0];
    }
    Ok(())
}

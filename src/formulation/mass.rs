//! Lumped shell mass
//!
//! Nodal masses come from shape-function weighted quadrature, not an equal
//! split: `m_t = ∫ ρ t N_k dA` for the translations and `m_r = ∫ ρ t³/12 N_k dA`
//! for the two bending rotations. The drilling rotation gets a small fraction
//! of `m_r`. The local matrix is diagonal and is rotated with the element frame.

use super::{ElementContext, ElementWorkspace, DRILLING_MASS_SCALE};
use crate::error::{ShellError, ShellResult};
use crate::math::component::{THETA1, THETA2, THETA3, U1, U2, U3};
use crate::math::dof;
use crate::math::operators::local_gradients;
use crate::math::transform::frame_transform;

/// Element mass in global coordinates, left in the workspace
pub fn element_mass(ctx: &ElementContext<'_>, ws: &mut ElementWorkspace, element: usize) -> ShellResult<()> {
    let rho = ctx.material.mass_density();
    if !(rho.is_finite() && rho >= 0.0) {
        return Err(ShellError::Material(format!(
            "mass density must be non-negative, got {rho}"
        )));
    }
    let frame = ctx.prepare(ws, element)?;
    let t = ctx.set.thickness();

    ws.k.fill(0.0);
    for qp in ctx.rule.points() {
        let det = local_gradients(element, &ws.xl, &qp.dn_dparam, &mut ws.gradn)?;
        let da = det * qp.weight;
        for (k, &n) in qp.n.iter().enumerate() {
            let mt = rho * t * n * da;
            let mr = mt * t * t / 12.0;
            for c in [U1, U2, U3] {
                ws.k[(dof(k, c), dof(k, c))] += mt;
            }
            for c in [THETA1, THETA2] {
                ws.k[(dof(k, c), dof(k, c))] += mr;
            }
            ws.k[(dof(k, THETA3), dof(k, THETA3))] += DRILLING_MASS_SCALE * mr;
        }
    }

    frame_transform(&frame.rotation, &mut ws.t);
    ws.to_global();
    Ok(())
}

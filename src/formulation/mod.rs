//! Shell element formulations
//!
//! Both stabilization variants share the local quadrature loop in this module:
//! membrane and bending are always fully integrated, transverse shear is
//! integrated with a weight and optionally complemented by an averaged term.
//! Quadrilaterals use the MITC4 assumed shear and triangles the discrete
//! shear gap, so the fully integrated term is already free of shear locking.
//! The variants differ in how they weight shear and regularize drilling.

pub mod energy_sampling;
pub mod mass;
pub mod projected_normal;

use serde::{Deserialize, Serialize};

use crate::elements::{ElementSet, MaterialModel, ShellFamily};
use crate::error::{ShellError, ShellResult};
use crate::field::NodalField;
use crate::math::component::{THETA1, THETA2};
use crate::math::constitutive::ReducedModuli;
use crate::math::frame::ElementFrame;
use crate::math::operators::{
    bending_operator, center_rotation_operator, dsg_shear_operator, local_gradients, membrane_operator,
    mitc4_shear_operator,
};
use crate::math::quadrature::{parametric_center, IntegrationRule, QuadraturePoint};
use crate::math::transform::{add_offset_links, congruence, frame_transform};
use crate::math::{add_btdb_lower, complete_lt, dof, Mat, Mat2, Vec3, DOFS_PER_NODE};

/// Drilling stiffness relative to the mean bending-rotation diagonal (energy sampling)
pub const ENERGY_SAMPLING_DRILLING_SCALE: f64 = 0.1;
/// Drilling stiffness relative to the summed bending-rotation diagonal (projected normal)
pub const PROJECTED_NORMAL_DRILLING_SCALE: f64 = 1e-4;
/// Energy-sampling drilling scales outside this range measurably change curved-shell results
pub const ENERGY_SAMPLING_DRILLING_RANGE: (f64, f64) = (1e-2, 1e2);
/// Drilling rotational mass relative to the bending rotational mass
pub const DRILLING_MASS_SCALE: f64 = 1e-6;

/// Transverse shear and drilling stabilization strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stabilization {
    /// Blend of fully integrated and element-averaged shear, drilling tied to the in-plane rotation
    EnergySampling {
        #[serde(default = "default_energy_sampling_scale")]
        drilling_stiffness_scale: f64,
    },
    /// Full integration with drilling removed along averaged nodal normals
    ProjectedNormal {
        #[serde(default = "default_projected_normal_scale")]
        drilling_stiffness_scale: f64,
    },
}

fn default_energy_sampling_scale() -> f64 {
    ENERGY_SAMPLING_DRILLING_SCALE
}

fn default_projected_normal_scale() -> f64 {
    PROJECTED_NORMAL_DRILLING_SCALE
}

impl Stabilization {
    pub fn energy_sampling() -> Self {
        Stabilization::EnergySampling {
            drilling_stiffness_scale: ENERGY_SAMPLING_DRILLING_SCALE,
        }
    }

    pub fn projected_normal() -> Self {
        Stabilization::ProjectedNormal {
            drilling_stiffness_scale: PROJECTED_NORMAL_DRILLING_SCALE,
        }
    }

    pub fn drilling_stiffness_scale(&self) -> f64 {
        match *self {
            Stabilization::EnergySampling { drilling_stiffness_scale }
            | Stabilization::ProjectedNormal { drilling_stiffness_scale } => drilling_stiffness_scale,
        }
    }

    /// Same variant with a different drilling scale
    pub fn with_drilling_stiffness_scale(self, scale: f64) -> Self {
        match self {
            Stabilization::EnergySampling { .. } => Stabilization::EnergySampling {
                drilling_stiffness_scale: scale,
            },
            Stabilization::ProjectedNormal { .. } => Stabilization::ProjectedNormal {
                drilling_stiffness_scale: scale,
            },
        }
    }

    /// Whether nodal normals must be associated before stiffness evaluation
    pub fn requires_geometry(&self) -> bool {
        matches!(self, Stabilization::ProjectedNormal { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stabilization::EnergySampling { .. } => "energy sampling",
            Stabilization::ProjectedNormal { .. } => "projected normal",
        }
    }

    pub fn validate(&self) -> ShellResult<()> {
        let scale = self.drilling_stiffness_scale();
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ShellError::InvalidInput(format!(
                "drilling stiffness scale must be positive and finite, got {scale}"
            )));
        }
        let (low, high) = ENERGY_SAMPLING_DRILLING_RANGE;
        if matches!(self, Stabilization::EnergySampling { .. }) && !(low..=high).contains(&scale) {
            log::warn!("Energy sampling drilling scale {scale:e} lies outside [{low:e}, {high:e}]");
        }
        Ok(())
    }
}

impl Default for Stabilization {
    fn default() -> Self {
        Self::energy_sampling()
    }
}

/// Per-worker scratch buffers for one element family
///
/// Everything here is overwritten for each element; nothing is allocated
/// once the workspace exists.
#[derive(Debug, Clone)]
pub struct ElementWorkspace {
    pub(crate) x: Vec<Vec3>,
    pub(crate) xl: Vec<[f64; 2]>,
    pub(crate) gradn: Vec<[f64; 2]>,
    pub(crate) bm: Mat,
    pub(crate) bb: Mat,
    pub(crate) bs: Mat,
    pub(crate) bs_avg: Mat,
    /// Shape data at the parametric center
    pub(crate) center: QuadraturePoint,
    /// Element rotation implied by the local translations (3 x 6n)
    pub(crate) w: Mat,
    /// Element matrix in the local frame
    pub(crate) k: Mat,
    /// Global to local dof transformation
    pub(crate) t: Mat,
    /// `K T` scratch
    pub(crate) kt: Mat,
    /// Element matrix in global coordinates
    pub(crate) kg: Mat,
    /// One row over the element dofs
    pub(crate) row: Vec<f64>,
    pub(crate) dofnums: Vec<Option<usize>>,
}

impl ElementWorkspace {
    pub fn new(family: ShellFamily) -> Self {
        let nn = family.nodes_per_element();
        let nd = DOFS_PER_NODE * nn;
        Self {
            x: Vec::with_capacity(nn),
            xl: Vec::with_capacity(nn),
            gradn: Vec::with_capacity(nn),
            bm: Mat::zeros(3, nd),
            bb: Mat::zeros(3, nd),
            bs: Mat::zeros(2, nd),
            bs_avg: Mat::zeros(2, nd),
            center: QuadraturePoint::at(family, parametric_center(family)),
            w: Mat::zeros(3, nd),
            k: Mat::zeros(nd, nd),
            t: Mat::zeros(nd, nd),
            kt: Mat::zeros(nd, nd),
            kg: Mat::zeros(nd, nd),
            row: vec![0.0; nd],
            dofnums: Vec::with_capacity(nd),
        }
    }

    /// Element matrix in global coordinates from the last evaluation
    pub fn global_matrix(&self) -> &Mat {
        &self.kg
    }

    /// Fill `w` from the local coordinates of the current element
    pub(crate) fn center_rotation(&mut self, element: usize) -> ShellResult<()> {
        center_rotation_operator(element, &self.xl, &self.center.dn_dparam, &mut self.gradn, &mut self.w)
    }

    /// Frame transformation of the current element, offsets linked
    pub(crate) fn linked_transform(&mut self, frame: &ElementFrame) {
        frame_transform(&frame.rotation, &mut self.t);
        add_offset_links(frame, &self.x, &mut self.t);
    }

    /// `kg = Tᵀ k T`
    pub(crate) fn to_global(&mut self) {
        congruence(&self.k, &self.t, &mut self.kt, &mut self.kg);
    }
}

/// Read-only inputs shared by every element of one assembly call
#[derive(Clone, Copy)]
pub struct ElementContext<'a> {
    pub set: &'a ElementSet,
    pub geometry: &'a NodalField,
    pub material: &'a dyn MaterialModel,
    pub rule: &'a IntegrationRule,
}

impl<'a> ElementContext<'a> {
    /// Gather the element coordinates and build its frame
    pub(crate) fn prepare(&self, ws: &mut ElementWorkspace, element: usize) -> ShellResult<ElementFrame> {
        self.geometry.gather_vectors(self.set.element(element), &mut ws.x);
        let frame = ElementFrame::new(self.set.family(), element, &ws.x)?;
        frame.local_coordinates(&ws.x, &mut ws.xl);
        Ok(frame)
    }

    fn reduced_moduli(&self, location: &Vec3) -> ShellResult<ReducedModuli> {
        let d = self
            .material
            .tangent_moduli(self.set.thickness(), location, self.set.label())?;
        ReducedModuli::from_tangent(&d)
    }
}

/// Integrate the local element stiffness into `ws.k`
///
/// Fully integrated transverse shear is weighted by `shear_weight`; the
/// remainder `1 - shear_weight` goes to the term built from the
/// area-averaged shear operator. The result is symmetric.
pub(crate) fn integrate_local(
    ctx: &ElementContext<'_>,
    ws: &mut ElementWorkspace,
    element: usize,
    frame: &ElementFrame,
    shear_weight: f64,
) -> ShellResult<()> {
    let family = ctx.set.family();
    let t = ctx.set.thickness();
    let bending_factor = t * t * t / 12.0;

    let cached = if ctx.material.is_homogeneous() {
        Some(ctx.reduced_moduli(&frame.centroid)?)
    } else {
        None
    };

    ws.k.fill(0.0);
    ws.bs_avg.fill(0.0);
    let mut area = 0.0;
    let mut ds_avg = Mat2::zeros();

    for qp in ctx.rule.points() {
        let det = local_gradients(element, &ws.xl, &qp.dn_dparam, &mut ws.gradn)?;
        let da = det * qp.weight;
        let moduli = match cached {
            Some(m) => m,
            None => {
                let location = ws
                    .x
                    .iter()
                    .zip(&qp.n)
                    .fold(Vec3::zeros(), |acc, (x, &n)| acc + x * n);
                ctx.reduced_moduli(&location)?
            }
        };

        membrane_operator(&ws.gradn, &mut ws.bm);
        add_btdb_lower(&mut ws.k, &ws.bm, &moduli.in_plane, t * da);

        bending_operator(&ws.gradn, &mut ws.bb);
        add_btdb_lower(&mut ws.k, &ws.bb, &moduli.in_plane, bending_factor * da);

        match family {
            ShellFamily::T3 => dsg_shear_operator(&ws.xl, &ws.gradn, &mut ws.bs),
            ShellFamily::Q4 => mitc4_shear_operator(element, &ws.xl, qp.param, &mut ws.bs)?,
        }
        if shear_weight > 0.0 {
            add_btdb_lower(&mut ws.k, &ws.bs, &moduli.shear, shear_weight * t * da);
        }
        ws.bs_avg.zip_apply(&ws.bs, |acc, b| *acc += da * b);
        ds_avg += moduli.shear * da;
        area += da;
    }

    if shear_weight < 1.0 {
        ws.bs_avg /= area;
        ds_avg /= area;
        add_btdb_lower(&mut ws.k, &ws.bs_avg, &ds_avg, (1.0 - shear_weight) * t * area);
    }

    complete_lt(&mut ws.k);
    Ok(())
}

/// Sum of the bending-rotation diagonal entries of a local element matrix
pub(crate) fn bending_rotation_diagonal_sum(k: &Mat, nodes: usize) -> f64 {
    (0..nodes)
        .map(|n| k[(dof(n, THETA1), dof(n, THETA1))] + k[(dof(n, THETA2), dof(n, THETA2))])
        .sum()
}

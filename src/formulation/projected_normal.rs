//! Projected-normal drilling control
//!
//! Every node carries the area-weighted average of the normals of the
//! elements around it, accumulated over all element sets that share the
//! node. An element sees the nodal rotation projected onto the plane
//! orthogonal to the nodal normal. The component along the normal is
//! replaced by the rotation the element's own translations imply, so rigid
//! motions stay strain free and the element is independent of the nodal
//! rotation about the normal. That rotation is restrained by a spring
//! `k_drill · n nᵀ` on the global rotation block of each node.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::{bending_rotation_diagonal_sum, integrate_local, ElementContext, ElementWorkspace};
use crate::elements::ElementSet;
use crate::error::{ShellError, ShellResult};
use crate::field::NodalField;
use crate::math::component::THETA1;
use crate::math::frame::ElementFrame;
use crate::math::{dof, Mat3, Vec3, DOFS_PER_NODE};

/// Fingerprint of the family and connectivity of an element set
pub fn connectivity_stamp(set: &ElementSet) -> u64 {
    let mut hasher = DefaultHasher::new();
    set.family().hash(&mut hasher);
    for nodes in set.iter() {
        nodes.hash(&mut hasher);
    }
    hasher.finish()
}

/// Fingerprint of the nodal coordinates
pub fn geometry_stamp(geometry: &NodalField) -> u64 {
    let mut hasher = DefaultHasher::new();
    geometry.dim().hash(&mut hasher);
    for v in geometry.values() {
        v.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Area-weighted nodal normals of one or more element sets
#[derive(Debug, Clone)]
pub struct NodalNormals {
    normals: Vec<Vec3>,
    sets: Vec<u64>,
    geometry: u64,
}

impl NodalNormals {
    /// Accumulate element normals at the nodes, set by set in element order
    ///
    /// Nodes not referenced by any element get a zero normal.
    pub fn compute(sets: &[&ElementSet], geometry: &NodalField) -> ShellResult<Self> {
        if sets.is_empty() {
            return Err(ShellError::InvalidInput(
                "nodal normals need at least one element set".to_string(),
            ));
        }
        let nnodes = geometry.nnodes();
        let mut sums = vec![Vec3::zeros(); nnodes];
        let mut used = vec![false; nnodes];
        let mut x = Vec::with_capacity(4);

        for set in sets {
            for (e, nodes) in set.iter().enumerate() {
                geometry.gather_vectors(nodes, &mut x);
                let frame = ElementFrame::new(set.family(), e, &x)?;
                let weighted = frame.normal() * frame.area;
                for &n in nodes {
                    sums[n] += weighted;
                    used[n] = true;
                }
            }
        }

        for (node, (sum, &is_used)) in sums.iter_mut().zip(&used).enumerate() {
            if !is_used {
                continue;
            }
            let norm = sum.norm();
            if !(norm > 0.0) {
                return Err(ShellError::InvalidInput(format!(
                    "nodal normal of node {node} vanishes; adjacent elements are oppositely oriented"
                )));
            }
            *sum /= norm;
        }

        log::debug!(
            "Associated nodal normals: {} nodes, {} set(s), {} elements",
            used.iter().filter(|&&u| u).count(),
            sets.len(),
            sets.iter().map(|s| s.len()).sum::<usize>()
        );

        Ok(Self {
            normals: sums,
            sets: sets.iter().map(|s| connectivity_stamp(s)).collect(),
            geometry: geometry_stamp(geometry),
        })
    }

    #[inline]
    pub fn normal(&self, node: usize) -> Vec3 {
        self.normals[node]
    }

    /// Combined fingerprint of the associated sets and geometry
    pub fn stamp(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.sets.hash(&mut hasher);
        self.geometry.hash(&mut hasher);
        hasher.finish()
    }

    /// Number of element sets the normals were accumulated over
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Whether `set` was one of the associated sets and the geometry is unchanged
    pub fn is_current(&self, set: &ElementSet, geometry: &NodalField) -> bool {
        self.normals.len() == geometry.nnodes()
            && self.geometry == geometry_stamp(geometry)
            && self.sets.contains(&connectivity_stamp(set))
    }

    /// Whether exactly these sets and this geometry produced the normals
    pub fn matches(&self, sets: &[&ElementSet], geometry: &NodalField) -> bool {
        self.normals.len() == geometry.nnodes()
            && self.geometry == geometry_stamp(geometry)
            && self.sets.len() == sets.len()
            && self.sets.iter().zip(sets).all(|(&stamp, set)| stamp == connectivity_stamp(set))
    }
}

/// Replace the element rotations along the nodal normals
///
/// Expects the translation rows of `ws.t` and the center rotation operator
/// `ws.w` to be in place. Row block `k` of the rotations becomes
/// `Fᵀ [P_k θ_k + n_k (n_k · Ω)]` with `P_k = I - n_k n_kᵀ` and `Ω` the global
/// element rotation implied by the translations.
fn substitute_normal_rotations(ws: &mut ElementWorkspace, rotation: &Mat3, nodes: &[usize], normals: &NodalNormals) {
    let ft = rotation.transpose();
    let nd = DOFS_PER_NODE * nodes.len();
    for (a, &node) in nodes.iter().enumerate() {
        let n = normals.normal(node);
        let r = dof(a, THETA1);
        let projected = ft * (Mat3::identity() - n * n.transpose());
        ws.t.fixed_view_mut::<3, 3>(r, r).copy_from(&projected);

        // n · Ω as a row over the global element dofs
        let nl = ft * n;
        ws.row[..nd].fill(0.0);
        for c in 0..nd {
            let coeff = nl[0] * ws.w[(0, c)] + nl[1] * ws.w[(1, c)] + nl[2] * ws.w[(2, c)];
            if coeff == 0.0 {
                continue;
            }
            for g in 0..nd {
                ws.row[g] += coeff * ws.t[(c, g)];
            }
        }
        for i in 0..3 {
            for g in 0..nd {
                ws.t[(r + i, g)] += nl[i] * ws.row[g];
            }
        }
    }
}

/// Element stiffness in global coordinates, left in the workspace
pub fn element_stiffness(
    ctx: &ElementContext<'_>,
    ws: &mut ElementWorkspace,
    element: usize,
    normals: &NodalNormals,
    drilling_scale: f64,
) -> ShellResult<()> {
    let frame = ctx.prepare(ws, element)?;
    let nodes = ctx.set.element(element);

    integrate_local(ctx, ws, element, &frame, 1.0)?;
    let k_drill = drilling_scale * bending_rotation_diagonal_sum(&ws.k, nodes.len());

    ws.center_rotation(element)?;
    ws.linked_transform(&frame);
    substitute_normal_rotations(ws, &frame.rotation, nodes, normals);
    ws.to_global();

    for (a, &node) in nodes.iter().enumerate() {
        let n = normals.normal(node);
        let r = dof(a, THETA1);
        let mut block = ws.kg.fixed_view_mut::<3, 3>(r, r);
        block += n * n.transpose() * k_drill;
    }
    Ok(())
}

//! Local element frames for flat-facet shells
//!
//! The frame is a 3x3 rotation whose columns are the local axes expressed in
//! global coordinates: `e1`, `e2` span the facet plane, `e3` is the facet normal.
//! A global vector `v` has local components `Fᵀ v`.
//!
//! The in-plane axis convention is fixed per family so that repeated evaluation
//! of the same element always yields the same frame:
//! - T3: `e1` along edge 1→2, `e3 = (x2 - x1) × (x3 - x1)`
//! - Q4: `e1` along the bisector joining the midpoints of edges 4-1 and 2-3,
//!   `e3 = m1 × m2` with `m2` the other bisector

use super::{Mat3, Vec3};
use crate::elements::ShellFamily;
use crate::error::{ShellError, ShellResult};

/// Relative tolerance below which a cross product counts as zero
const COLLINEAR_TOLERANCE: f64 = 1e-12;

/// Geometry of one element in its facet plane
#[derive(Debug, Clone)]
pub struct ElementFrame {
    /// Columns: e1, e2, e3 (global components)
    pub rotation: Mat3,
    /// Element centroid (global)
    pub centroid: Vec3,
    /// Facet area
    pub area: f64,
    /// Characteristic in-plane size
    pub size: f64,
}

impl ElementFrame {
    /// Build the frame of a T3 or Q4 element from its nodal coordinates
    pub fn new(family: ShellFamily, element: usize, x: &[Vec3]) -> ShellResult<Self> {
        if x.len() != family.nodes_per_element() {
            return Err(ShellError::ConnectivityMismatch(format!(
                "{:?} element {} has {} nodes, expected {}",
                family,
                element,
                x.len(),
                family.nodes_per_element()
            )));
        }
        if x.iter().any(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(ShellError::degenerate(element, "non-finite nodal coordinate"));
        }
        match family {
            ShellFamily::T3 => t3_frame(element, x),
            ShellFamily::Q4 => q4_frame(element, x),
        }
    }

    /// Normal of the facet (third column)
    pub fn normal(&self) -> Vec3 {
        self.rotation.column(2).into_owned()
    }

    /// Local in-plane coordinates of the nodes, relative to the centroid
    ///
    /// Nodes off the facet plane (warped Q4) are projected onto it.
    pub fn local_coordinates(&self, x: &[Vec3], out: &mut Vec<[f64; 2]>) {
        let e1 = self.rotation.column(0);
        let e2 = self.rotation.column(1);
        out.clear();
        out.extend(x.iter().map(|p| {
            let d = p - self.centroid;
            [d.dot(&e1), d.dot(&e2)]
        }));
    }
}

fn unit_or_degenerate(v: Vec3, scale: f64, element: usize, what: &str) -> ShellResult<Vec3> {
    let norm = v.norm();
    if !(norm > COLLINEAR_TOLERANCE * scale) {
        return Err(ShellError::degenerate(element, what.to_string()));
    }
    Ok(v / norm)
}

fn frame_from_axes(e1: Vec3, e3: Vec3) -> Mat3 {
    let e2 = e3.cross(&e1);
    Mat3::from_columns(&[e1, e2, e3])
}

/// Frame of a 3-node triangle
pub fn t3_frame(element: usize, x: &[Vec3]) -> ShellResult<ElementFrame> {
    let a = x[1] - x[0];
    let b = x[2] - x[0];
    let c = x[2] - x[1];
    let cross = a.cross(&b);
    let scale = a.norm() * b.norm();
    let e3 = unit_or_degenerate(cross, scale, element, "zero-area triangle (collinear nodes)")?;
    let e1 = unit_or_degenerate(a, a.norm().max(b.norm()), element, "coincident nodes 1 and 2")?;

    let area = 0.5 * cross.norm();
    let size = ((a.norm_squared() + b.norm_squared() + c.norm_squared()) / 3.0).sqrt();
    let centroid = (x[0] + x[1] + x[2]) / 3.0;

    Ok(ElementFrame {
        rotation: frame_from_axes(e1, e3),
        centroid,
        area,
        size,
    })
}

/// Frame of a 4-node quadrilateral
pub fn q4_frame(element: usize, x: &[Vec3]) -> ShellResult<ElementFrame> {
    // Bisectors: joining opposite edge midpoints
    let m1 = (x[1] + x[2] - x[0] - x[3]) * 0.5;
    let m2 = (x[2] + x[3] - x[0] - x[1]) * 0.5;
    let cross = m1.cross(&m2);
    let scale = m1.norm() * m2.norm();
    let e3 = unit_or_degenerate(cross, scale, element, "zero-area quadrilateral")?;
    let e1 = unit_or_degenerate(m1, m1.norm().max(m2.norm()), element, "collapsed quadrilateral")?;

    // |m1 x m2| is the area of the projected quadrilateral
    let area = cross.norm();
    let size = ((m1.norm_squared() + m2.norm_squared()) / 2.0).sqrt();
    let centroid = (x[0] + x[1] + x[2] + x[3]) / 4.0;

    Ok(ElementFrame {
        rotation: frame_from_axes(e1, e3),
        centroid,
        area,
        size,
    })
}

//! Quadrature rules and shape functions for shell element families
//!
//! Each rule stores, per point, the shape-function values and their parametric
//! gradients so that the element loop only has to map gradients to the facet.
//!
//! - T3: linear triangle on the unit parametric triangle, N = [1-ξ-η, ξ, η]
//! - Q4: bilinear quadrilateral on [-1, 1]², nodes counter-clockwise from (-1, -1)

use crate::elements::ShellFamily;
use crate::error::{ShellError, ShellResult};

/// One integration point with precomputed shape data
#[derive(Debug, Clone)]
pub struct QuadraturePoint {
    /// Parametric location (ξ, η)
    pub param: [f64; 2],
    /// Shape function values, one per node
    pub n: Vec<f64>,
    /// Parametric gradients [dN/dξ, dN/dη], one per node
    pub dn_dparam: Vec<[f64; 2]>,
    /// Parametric weight
    pub weight: f64,
}

impl QuadraturePoint {
    /// Shape data at an arbitrary parametric location, with zero weight
    pub fn at(family: ShellFamily, param: [f64; 2]) -> Self {
        let (n, dn_dparam) = shape_functions(family, param);
        Self {
            param,
            n,
            dn_dparam,
            weight: 0.0,
        }
    }
}

/// Ordered list of quadrature points for one element family
#[derive(Debug, Clone)]
pub struct IntegrationRule {
    family: ShellFamily,
    points: Vec<QuadraturePoint>,
}

impl IntegrationRule {
    /// Rule for a family and order
    ///
    /// T3 accepts 1 or 3 points; Q4 accepts Gauss orders 1, 2 or 3 per direction.
    pub fn for_family(family: ShellFamily, order: usize) -> ShellResult<Self> {
        let valid = match family {
            ShellFamily::T3 => matches!(order, 1 | 3),
            ShellFamily::Q4 => matches!(order, 1..=3),
        };
        if !valid {
            return Err(ShellError::InvalidInput(format!(
                "{family:?} has no integration rule of order {order}"
            )));
        }
        Ok(Self::build(family, order))
    }

    /// Default rule used for stiffness and mass: 3-point triangle, 2x2 Gauss quad
    pub fn default_for(family: ShellFamily) -> Self {
        match family {
            ShellFamily::T3 => Self::build(family, 3),
            ShellFamily::Q4 => Self::build(family, 2),
        }
    }

    fn build(family: ShellFamily, order: usize) -> Self {
        let locations = match family {
            ShellFamily::T3 => triangle_points(order),
            ShellFamily::Q4 => gauss_square(order),
        };
        let points = locations
            .into_iter()
            .map(|(param, weight)| {
                let (n, dn_dparam) = shape_functions(family, param);
                QuadraturePoint {
                    param,
                    n,
                    dn_dparam,
                    weight,
                }
            })
            .collect();
        Self { family, points }
    }

    pub fn family(&self) -> ShellFamily {
        self.family
    }

    pub fn points(&self) -> &[QuadraturePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 1D Gauss-Legendre points and weights on [-1, 1] (orders 1 to 3)
fn gauss_1d(n: usize) -> Vec<(f64, f64)> {
    match n {
        1 => vec![(0.0, 2.0)],
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            vec![(-p, 1.0), (p, 1.0)]
        }
        _ => {
            let p = (3.0 / 5.0_f64).sqrt();
            vec![(-p, 5.0 / 9.0), (0.0, 8.0 / 9.0), (p, 5.0 / 9.0)]
        }
    }
}

/// Tensor-product Gauss rule on the square
fn gauss_square(order: usize) -> Vec<([f64; 2], f64)> {
    let g = gauss_1d(order);
    let mut pts = Vec::with_capacity(g.len() * g.len());
    for &(eta, we) in &g {
        for &(xi, wx) in &g {
            pts.push(([xi, eta], wx * we));
        }
    }
    pts
}

/// Triangle rules on the unit parametric triangle (weights sum to 1/2)
fn triangle_points(npts: usize) -> Vec<([f64; 2], f64)> {
    if npts == 1 {
        return vec![([1.0 / 3.0, 1.0 / 3.0], 0.5)];
    }
    vec![
        ([1.0 / 6.0, 1.0 / 6.0], 1.0 / 6.0),
        ([2.0 / 3.0, 1.0 / 6.0], 1.0 / 6.0),
        ([1.0 / 6.0, 2.0 / 3.0], 1.0 / 6.0),
    ]
}

/// Shape functions and parametric gradients at a point
pub fn shape_functions(family: ShellFamily, param: [f64; 2]) -> (Vec<f64>, Vec<[f64; 2]>) {
    let [xi, eta] = param;
    match family {
        ShellFamily::T3 => (
            vec![1.0 - xi - eta, xi, eta],
            vec![[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]],
        ),
        ShellFamily::Q4 => {
            let (n, dn) = q4_shape(param);
            (n.to_vec(), dn.to_vec())
        }
    }
}

/// Parametric corners of the bilinear quadrilateral, counter-clockwise
pub const Q4_CORNERS: [[f64; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

/// Bilinear shape functions `N_k = (1 + ξ ξ_k)(1 + η η_k) / 4` and their gradients
pub fn q4_shape(param: [f64; 2]) -> ([f64; 4], [[f64; 2]; 4]) {
    let [xi, eta] = param;
    let mut n = [0.0; 4];
    let mut dn = [[0.0; 2]; 4];
    for (k, [xk, ek]) in Q4_CORNERS.iter().enumerate() {
        n[k] = (1.0 + xi * xk) * (1.0 + eta * ek) / 4.0;
        dn[k] = [xk * (1.0 + eta * ek) / 4.0, ek * (1.0 + xi * xk) / 4.0];
    }
    (n, dn)
}

/// Parametric centroid of the reference element
pub fn parametric_center(family: ShellFamily) -> [f64; 2] {
    match family {
        ShellFamily::T3 => [1.0 / 3.0, 1.0 / 3.0],
        ShellFamily::Q4 => [0.0, 0.0],
    }
}

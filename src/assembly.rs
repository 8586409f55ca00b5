//! Parallel global assembly of shell stiffness and mass
//!
//! Elements are split into fixed-size chunks. Each chunk is processed with a
//! private workspace into a private triplet list, and the lists are merged in
//! chunk order. The merged triplet sequence does not depend on the number of
//! threads, so parallel and sequential runs produce identical matrices.

use nalgebra_sparse::CsrMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ShellConfig;
use crate::elements::{ElementSet, MaterialModel, ShellFamily};
use crate::error::{ShellError, ShellResult};
use crate::field::NodalField;
use crate::formulation::projected_normal::NodalNormals;
use crate::formulation::{
    energy_sampling, mass, projected_normal, ElementContext, ElementWorkspace, Stabilization,
};
use crate::math::quadrature::IntegrationRule;
use crate::math::sparse::SparseMatrixBuilder;
use crate::math::{Mat, DOFS_PER_NODE};

/// Default number of elements per work unit
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Assembly configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Process chunks on the rayon thread pool
    pub parallel: bool,
    /// Elements per chunk
    pub chunk_size: usize,
    /// Stiffness integration order; `None` uses the family default
    pub quadrature_order: Option<usize>,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            quadrature_order: None,
        }
    }
}

impl AssemblyOptions {
    /// Single-threaded assembly
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ShellResult<()> {
        if self.chunk_size == 0 {
            return Err(ShellError::InvalidInput("chunk_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Stiffness and mass assembler for one stabilization variant
pub struct ShellAssembler<'m, M: MaterialModel> {
    material: &'m M,
    stabilization: Stabilization,
    options: AssemblyOptions,
    normals: Option<NodalNormals>,
}

impl<'m, M: MaterialModel> ShellAssembler<'m, M> {
    pub fn new(material: &'m M, stabilization: Stabilization) -> Self {
        Self {
            material,
            stabilization,
            options: AssemblyOptions::default(),
            normals: None,
        }
    }

    pub fn from_config(material: &'m M, config: &ShellConfig) -> Self {
        Self::new(material, config.stabilization).with_options(config.assembly.clone())
    }

    pub fn with_options(mut self, options: AssemblyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn stabilization(&self) -> Stabilization {
        self.stabilization
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    /// Nodal normals from the last [`associate_geometry`](Self::associate_geometry)
    pub fn normals(&self) -> Option<&NodalNormals> {
        self.normals.as_ref()
    }

    /// Compute the nodal normals the projected-normal variant needs
    ///
    /// Normals are accumulated over all `sets`, so a node shared between sets
    /// sees every element around it. Must run before
    /// [`stiffness`](Self::stiffness) on any of these sets and again whenever
    /// the geometry or connectivity changes. Repeating it with the same sets
    /// on unchanged geometry does nothing. The energy-sampling variant needs
    /// no nodal data.
    pub fn associate_geometry(&mut self, sets: &[&ElementSet], geometry: &NodalField) -> ShellResult<()> {
        if !self.stabilization.requires_geometry() {
            log::debug!("{} stabilization needs no nodal normals", self.stabilization.name());
            return Ok(());
        }
        geometry.check_shape("geometry", geometry.nnodes(), 3)?;
        for set in sets {
            set.check_nodes(geometry.nnodes())?;
        }
        if self.normals.as_ref().is_some_and(|n| n.matches(sets, geometry)) {
            log::debug!("Nodal normals already current");
            return Ok(());
        }
        self.normals = Some(NodalNormals::compute(sets, geometry)?);
        Ok(())
    }

    /// Global stiffness over the free dofs
    ///
    /// The kernel is linear: `displacement` and `rotation` (3 components per
    /// node) are checked for size and otherwise unused.
    pub fn stiffness(
        &self,
        set: &ElementSet,
        geometry: &NodalField,
        displacement: &NodalField,
        rotation: &NodalField,
        dofs: &NodalField,
    ) -> ShellResult<CsrMatrix<f64>> {
        self.check_inputs(set, geometry, dofs)?;
        displacement.check_shape("displacement", geometry.nnodes(), 3)?;
        rotation.check_shape("rotation", geometry.nnodes(), 3)?;

        let rule = self.stiffness_rule(set.family())?;
        let ctx = ElementContext {
            set,
            geometry,
            material: self.material,
            rule: &rule,
        };
        log::info!(
            "Assembling stiffness ({}): {} {:?} elements, {} free dofs",
            self.stabilization.name(),
            set.len(),
            set.family(),
            dofs.nfreedofs()
        );

        match self.stabilization {
            Stabilization::EnergySampling {
                drilling_stiffness_scale,
            } => self.assemble(set, dofs, |ws, e| {
                energy_sampling::element_stiffness(&ctx, ws, e, drilling_stiffness_scale)
            }),
            Stabilization::ProjectedNormal {
                drilling_stiffness_scale,
            } => {
                let normals = self.current_normals(set, geometry)?;
                self.assemble(set, dofs, |ws, e| {
                    projected_normal::element_stiffness(&ctx, ws, e, normals, drilling_stiffness_scale)
                })
            }
        }
    }

    /// Global lumped mass over the free dofs
    pub fn mass(&self, set: &ElementSet, geometry: &NodalField, dofs: &NodalField) -> ShellResult<CsrMatrix<f64>> {
        self.check_inputs(set, geometry, dofs)?;
        let rule = IntegrationRule::default_for(set.family());
        let ctx = ElementContext {
            set,
            geometry,
            material: self.material,
            rule: &rule,
        };
        log::info!(
            "Assembling mass: {} {:?} elements, {} free dofs",
            set.len(),
            set.family(),
            dofs.nfreedofs()
        );
        self.assemble(set, dofs, |ws, e| mass::element_mass(&ctx, ws, e))
    }

    /// Evaluator for element matrices of one set, validated once
    ///
    /// Nodal normals are looked up here, not per element. Stiffness of the
    /// projected-normal variant fails with
    /// [`ShellError::GeometryNotAssociated`] when they are not current for `set`.
    pub fn element_evaluator<'a>(
        &'a self,
        set: &'a ElementSet,
        geometry: &'a NodalField,
    ) -> ShellResult<ElementEvaluator<'a, M>> {
        self.stabilization.validate()?;
        geometry.check_shape("geometry", geometry.nnodes(), 3)?;
        set.check_nodes(geometry.nnodes())?;
        let normals = if self.stabilization.requires_geometry() {
            self.current_normals(set, geometry).ok()
        } else {
            None
        };
        Ok(ElementEvaluator {
            material: self.material,
            stabilization: self.stabilization,
            set,
            geometry,
            normals,
            stiffness_rule: self.stiffness_rule(set.family())?,
            mass_rule: IntegrationRule::default_for(set.family()),
            workspace: ElementWorkspace::new(set.family()),
        })
    }

    /// Stiffness of a single element in global coordinates, all dofs
    ///
    /// Validates its inputs on every call; use
    /// [`element_evaluator`](Self::element_evaluator) for many elements.
    pub fn element_stiffness(&self, set: &ElementSet, geometry: &NodalField, element: usize) -> ShellResult<Mat> {
        let mut evaluator = self.element_evaluator(set, geometry)?;
        let k = evaluator.stiffness(element)?;
        Ok(k.clone())
    }

    /// Mass of a single element in global coordinates, all dofs
    pub fn element_mass(&self, set: &ElementSet, geometry: &NodalField, element: usize) -> ShellResult<Mat> {
        let mut evaluator = self.element_evaluator(set, geometry)?;
        let m = evaluator.mass(element)?;
        Ok(m.clone())
    }

    fn stiffness_rule(&self, family: ShellFamily) -> ShellResult<IntegrationRule> {
        match self.options.quadrature_order {
            Some(order) => IntegrationRule::for_family(family, order),
            None => Ok(IntegrationRule::default_for(family)),
        }
    }

    fn current_normals(&self, set: &ElementSet, geometry: &NodalField) -> ShellResult<&NodalNormals> {
        match &self.normals {
            Some(normals) if normals.is_current(set, geometry) => Ok(normals),
            _ => Err(ShellError::GeometryNotAssociated),
        }
    }

    fn check_inputs(&self, set: &ElementSet, geometry: &NodalField, dofs: &NodalField) -> ShellResult<()> {
        self.stabilization.validate()?;
        self.options.validate()?;
        let nnodes = geometry.nnodes();
        geometry.check_shape("geometry", nnodes, 3)?;
        set.check_nodes(nnodes)?;
        dofs.check_shape("dofs", nnodes, DOFS_PER_NODE)?;
        if !dofs.is_numbered() {
            return Err(ShellError::DofsNotNumbered);
        }
        Ok(())
    }

    /// Run `kernel` over every element and scatter into the free dofs
    ///
    /// The kernel leaves the global element matrix in the workspace.
    fn assemble<F>(&self, set: &ElementSet, dofs: &NodalField, kernel: F) -> ShellResult<CsrMatrix<f64>>
    where
        F: Fn(&mut ElementWorkspace, usize) -> ShellResult<()> + Sync,
    {
        let family = set.family();
        let nfree = dofs.nfreedofs();
        let edofs = DOFS_PER_NODE * set.nodes_per_element();
        let chunk_size = self.options.chunk_size;

        let assemble_chunk = |ws: &mut ElementWorkspace, chunk: &[usize]| -> ShellResult<SparseMatrixBuilder> {
            let mut builder = SparseMatrixBuilder::start(nfree, chunk.len() * edofs * edofs);
            for &e in chunk {
                kernel(ws, e)?;
                dofs.gather_dofnums(set.element(e), &mut ws.dofnums)?;
                builder.assemble_symmetric(&ws.kg, &ws.dofnums);
            }
            Ok(builder)
        };

        let elements: Vec<usize> = (0..set.len()).collect();
        let partials: Vec<SparseMatrixBuilder> = if self.options.parallel {
            elements
                .par_chunks(chunk_size)
                .map_init(|| ElementWorkspace::new(family), |ws, chunk| assemble_chunk(ws, chunk))
                .collect::<ShellResult<Vec<_>>>()?
        } else {
            let mut ws = ElementWorkspace::new(family);
            elements
                .chunks(chunk_size)
                .map(|chunk| assemble_chunk(&mut ws, chunk))
                .collect::<ShellResult<Vec<_>>>()?
        };
        log::debug!(
            "Merging {} chunk(s) of up to {} elements (parallel: {})",
            partials.len(),
            chunk_size,
            self.options.parallel
        );

        let mut global = SparseMatrixBuilder::start(nfree, partials.iter().map(|p| p.nnz()).sum());
        for partial in partials {
            global.append(partial);
        }
        log::debug!("{} triplets before summation", global.nnz());
        Ok(global.make_matrix())
    }
}

/// Element-by-element evaluation on one set and geometry
///
/// Inputs and nodal normals are checked once by
/// [`ShellAssembler::element_evaluator`]; each call only evaluates one
/// element into a reused workspace.
pub struct ElementEvaluator<'a, M: MaterialModel> {
    material: &'a M,
    stabilization: Stabilization,
    set: &'a ElementSet,
    geometry: &'a NodalField,
    normals: Option<&'a NodalNormals>,
    stiffness_rule: IntegrationRule,
    mass_rule: IntegrationRule,
    workspace: ElementWorkspace,
}

impl<'a, M: MaterialModel> ElementEvaluator<'a, M> {
    /// Global stiffness of `element`, valid until the next call
    pub fn stiffness(&mut self, element: usize) -> ShellResult<&Mat> {
        self.check_element(element)?;
        let ctx = ElementContext {
            set: self.set,
            geometry: self.geometry,
            material: self.material,
            rule: &self.stiffness_rule,
        };
        match (self.stabilization, self.normals) {
            (Stabilization::EnergySampling { drilling_stiffness_scale }, _) => {
                energy_sampling::element_stiffness(&ctx, &mut self.workspace, element, drilling_stiffness_scale)?
            }
            (Stabilization::ProjectedNormal { drilling_stiffness_scale }, Some(normals)) => {
                projected_normal::element_stiffness(&ctx, &mut self.workspace, element, normals, drilling_stiffness_scale)?
            }
            (Stabilization::ProjectedNormal { .. }, None) => return Err(ShellError::GeometryNotAssociated),
        }
        Ok(self.workspace.global_matrix())
    }

    /// Global lumped mass of `element`, valid until the next call
    pub fn mass(&mut self, element: usize) -> ShellResult<&Mat> {
        self.check_element(element)?;
        let ctx = ElementContext {
            set: self.set,
            geometry: self.geometry,
            material: self.material,
            rule: &self.mass_rule,
        };
        mass::element_mass(&ctx, &mut self.workspace, element)?;
        Ok(self.workspace.global_matrix())
    }

    fn check_element(&self, element: usize) -> ShellResult<()> {
        if element >= self.set.len() {
            return Err(ShellError::InvalidInput(format!(
                "element {element} out of range for a set of {} elements",
                self.set.len()
            )));
        }
        Ok(())
    }
}

//! Mesh generators and solve helpers shared by the benchmark tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use nalgebra::DVector;
use shell_fea::prelude::*;

pub fn env_usize(name: &str, default_val: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default_val)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Nodes with coincident positions are merged
#[derive(Default)]
pub struct MeshBuilder {
    coords: Vec<[f64; 3]>,
    index: HashMap<[i64; 3], usize>,
    conn: Vec<usize>,
}

impl MeshBuilder {
    /// Index of a node at `p`, reusing an existing node at the same position to `1e-8`
    pub fn node(&mut self, p: [f64; 3]) -> usize {
        let key = p.map(|c| (c * 1e8).round() as i64);
        let next = self.coords.len();
        let id = *self.index.entry(key).or_insert(next);
        if id == next {
            self.coords.push(p);
        }
        id
    }

    pub fn element(&mut self, nodes: &[usize]) {
        self.conn.extend_from_slice(nodes);
    }

    /// Build the set with nodes renumbered for a narrow profile
    ///
    /// Returns the new index of every node handed out by [`node`](Self::node).
    pub fn finish(
        self,
        family: ShellFamily,
        thickness: f64,
        label: &str,
    ) -> anyhow::Result<(ElementSet, NodalField, Vec<usize>)> {
        let order = reverse_cuthill_mckee(self.coords.len(), &self.conn, family.nodes_per_element());
        let mut new_index = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }
        let coords: Vec<[f64; 3]> = order.iter().map(|&old| self.coords[old]).collect();
        let conn = self.conn.iter().map(|&old| new_index[old]).collect();
        let set = ElementSet::new(family, conn, thickness, label)?;
        Ok((set, NodalField::from_coords(&coords), new_index))
    }
}

/// Node order with small bandwidth; the sparse Cholesky does not reorder
fn reverse_cuthill_mckee(nnodes: usize, conn: &[usize], nodes_per_element: usize) -> Vec<usize> {
    let mut adjacency = vec![Vec::new(); nnodes];
    for element in conn.chunks(nodes_per_element) {
        for &a in element {
            adjacency[a].extend(element.iter().copied().filter(|&b| b != a));
        }
    }
    for list in &mut adjacency {
        list.sort_unstable();
        list.dedup();
    }

    let mut order = Vec::with_capacity(nnodes);
    let mut seen = vec![false; nnodes];
    while order.len() < nnodes {
        let Some(start) = (0..nnodes).filter(|&i| !seen[i]).min_by_key(|&i| adjacency[i].len()) else {
            break;
        };
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(u) = queue.pop_front() {
            order.push(u);
            let mut next: Vec<usize> = adjacency[u].iter().copied().filter(|&v| !seen[v]).collect();
            next.sort_by_key(|&v| adjacency[v].len());
            for v in next {
                seen[v] = true;
                queue.push_back(v);
            }
        }
    }
    order.reverse();
    order
}

fn on_sphere(p: [f64; 3], radius: f64) -> [f64; 3] {
    let n = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
    [radius * p[0] / n, radius * p[1] / n, radius * p[2] / n]
}

fn lerp(a: [f64; 3], b: [f64; 3], s: f64) -> [f64; 3] {
    [
        a[0] + s * (b[0] - a[0]),
        a[1] + s * (b[1] - a[1]),
        a[2] + s * (b[2] - a[2]),
    ]
}

/// Octant of a sphere (x, y, z >= 0) as a barycentric grid of triangles
pub fn octant_t3(n: usize, radius: f64, thickness: f64) -> anyhow::Result<(ElementSet, NodalField)> {
    let corners = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let mut mesh = MeshBuilder::default();
    let mut ids = vec![vec![0usize; n + 1]; n + 1];
    for i in 0..=n {
        for j in 0..=(n - i) {
            let (b, c) = (i as f64 / n as f64, j as f64 / n as f64);
            let a = 1.0 - b - c;
            let p = [
                a * corners[0][0] + b * corners[1][0] + c * corners[2][0],
                a * corners[0][1] + b * corners[1][1] + c * corners[2][1],
                a * corners[0][2] + b * corners[1][2] + c * corners[2][2],
            ];
            ids[i][j] = mesh.node(on_sphere(p, radius));
        }
    }
    for i in 0..n {
        for j in 0..(n - i) {
            mesh.element(&[ids[i][j], ids[i + 1][j], ids[i][j + 1]]);
            if i + j + 1 < n {
                mesh.element(&[ids[i + 1][j], ids[i + 1][j + 1], ids[i][j + 1]]);
            }
        }
    }
    let (set, geometry, _) = mesh.finish(ShellFamily::T3, thickness, "hemisphere")?;
    Ok((set, geometry))
}

/// Octant of a sphere as three n x n quadrilateral patches
pub fn octant_q4(n: usize, radius: f64, thickness: f64) -> anyhow::Result<(ElementSet, NodalField)> {
    let a = [1.0, 0.0, 0.0];
    let b = [0.0, 1.0, 0.0];
    let c = [0.0, 0.0, 1.0];
    let g = [1.0, 1.0, 1.0];
    let mab = [1.0, 1.0, 0.0];
    let mbc = [0.0, 1.0, 1.0];
    let mca = [1.0, 0.0, 1.0];
    let patches = [[a, mab, g, mca], [b, mbc, g, mab], [c, mca, g, mbc]];

    let mut mesh = MeshBuilder::default();
    for [p00, p10, p11, p01] in patches {
        let p00 = on_sphere(p00, 1.0);
        let p10 = on_sphere(p10, 1.0);
        let p11 = on_sphere(p11, 1.0);
        let p01 = on_sphere(p01, 1.0);
        let mut ids = vec![vec![0usize; n + 1]; n + 1];
        for (i, row) in ids.iter_mut().enumerate() {
            for (j, id) in row.iter_mut().enumerate() {
                let (s, t) = (i as f64 / n as f64, j as f64 / n as f64);
                let p = lerp(lerp(p00, p10, s), lerp(p01, p11, s), t);
                *id = mesh.node(on_sphere(p, radius));
            }
        }
        for i in 0..n {
            for j in 0..n {
                mesh.element(&[ids[i][j], ids[i + 1][j], ids[i + 1][j + 1], ids[i][j + 1]]);
            }
        }
    }
    let (set, geometry, _) = mesh.finish(ShellFamily::Q4, thickness, "hemisphere")?;
    Ok((set, geometry))
}

/// Nearest node to a point
pub fn nearest_node(geometry: &NodalField, p: [f64; 3]) -> usize {
    let target = nalgebra::Vector3::new(p[0], p[1], p[2]);
    (0..geometry.nnodes())
        .min_by(|&i, &j| {
            let di = (geometry.vector3(i) - target).norm();
            let dj = (geometry.vector3(j) - target).norm();
            di.total_cmp(&dj)
        })
        .unwrap_or(0)
}

/// Assemble, solve `K u = F` for nodal forces, and scatter into `dofs`
pub fn solve_static(
    assembler: &ShellAssembler<'_, IsotropicElastic>,
    set: &ElementSet,
    geometry: &NodalField,
    dofs: &mut NodalField,
    loads: &[(usize, usize, f64)],
) -> anyhow::Result<()> {
    let u = NodalField::like(geometry, 3);
    let k = assembler.stiffness(set, geometry, &u, &u, dofs)?;
    let mut f = DVector::zeros(dofs.nfreedofs());
    for &(node, component, value) in loads {
        if let Some(i) = dofs.dof_number(node, component)? {
            f[i] += value;
        }
    }
    let x = solve_spd(&k, &f)?;
    dofs.scatter_sysvec(&x)?;
    Ok(())
}

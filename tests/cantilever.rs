//! Flat cantilever strip: length 10, width 1, thickness 0.1, E = 1e7,
//! nu = 0.3, clamped at x = 0 with a unit transverse shear on the free edge.
//! The mean tip deflection is compared with the beam value L³ / 3EI.

mod common;

use common::{init_logging, solve_static, MeshBuilder};
use shell_fea::prelude::*;

const LENGTH: f64 = 10.0;
const WIDTH: f64 = 1.0;
const THICKNESS: f64 = 0.1;
const E: f64 = 1e7;
const NU: f64 = 0.3;
const ACROSS: usize = 2;

const UZ: usize = 2;

/// Mean tip deflection over the beam value for `along` elements along the strip
fn normalized_tip_deflection(family: ShellFamily, along: usize, stabilization: Stabilization) -> anyhow::Result<f64> {
    let mut mesh = MeshBuilder::default();
    let ids: Vec<Vec<usize>> = (0..=along)
        .map(|i| {
            (0..=ACROSS)
                .map(|j| {
                    mesh.node([
                        LENGTH * i as f64 / along as f64,
                        WIDTH * j as f64 / ACROSS as f64,
                        0.0,
                    ])
                })
                .collect()
        })
        .collect();
    for i in 0..along {
        for j in 0..ACROSS {
            let q = [ids[i][j], ids[i + 1][j], ids[i + 1][j + 1], ids[i][j + 1]];
            match family {
                ShellFamily::Q4 => mesh.element(&q),
                ShellFamily::T3 => {
                    mesh.element(&[q[0], q[1], q[2]]);
                    mesh.element(&[q[0], q[2], q[3]]);
                }
            }
        }
    }
    let (set, geometry, renumbered) = mesh.finish(family, THICKNESS, "strip")?;

    let mut dofs = NodalField::like(&geometry, 6);
    for &node in &ids[0] {
        for c in 0..6 {
            dofs.set_ebc(renumbered[node], c, 0.0)?;
        }
    }
    dofs.number_dofs();

    let tip: Vec<usize> = ids[along].iter().map(|&n| renumbered[n]).collect();
    let loads: Vec<(usize, usize, f64)> = tip
        .iter()
        .enumerate()
        .map(|(j, &node)| {
            let weight = if j == 0 || j == ACROSS { 0.5 } else { 1.0 };
            (node, UZ, weight / ACROSS as f64)
        })
        .collect();

    let material = IsotropicElastic::new(E, NU, 1.0);
    let mut assembler = ShellAssembler::new(&material, stabilization);
    assembler.associate_geometry(&[&set], &geometry)?;
    solve_static(&assembler, &set, &geometry, &mut dofs, &loads)?;

    let mean = tip.iter().map(|&n| dofs.value(n, UZ)).sum::<f64>() / tip.len() as f64;
    let inertia = WIDTH * THICKNESS.powi(3) / 12.0;
    Ok(mean / (LENGTH.powi(3) / (3.0 * E * inertia)))
}

fn assert_converges(family: ShellFamily, stabilization: Stabilization, tolerance: f64) -> anyhow::Result<()> {
    init_logging();
    let mut ratios = Vec::new();
    for along in [4, 8, 16] {
        let ratio = normalized_tip_deflection(family, along, stabilization)?;
        println!("cantilever {family:?} {} ({along} x {ACROSS}): {ratio:.4}", stabilization.name());
        ratios.push(ratio);
    }
    for pair in ratios.windows(2) {
        assert!(pair[0] < pair[1], "deflection not increasing with refinement: {ratios:?}");
    }
    let finest = ratios[ratios.len() - 1];
    assert!((finest - 1.0).abs() < tolerance, "finest normalized tip deflection {finest}");
    Ok(())
}

#[test]
fn cantilever_q4_energy_sampling_converges() -> anyhow::Result<()> {
    assert_converges(ShellFamily::Q4, Stabilization::energy_sampling(), 0.02)
}

#[test]
fn cantilever_q4_projected_normal_converges() -> anyhow::Result<()> {
    assert_converges(ShellFamily::Q4, Stabilization::projected_normal(), 0.02)
}

#[test]
fn cantilever_t3_energy_sampling_converges() -> anyhow::Result<()> {
    assert_converges(ShellFamily::T3, Stabilization::energy_sampling(), 0.03)
}

#[test]
fn cantilever_t3_projected_normal_converges() -> anyhow::Result<()> {
    assert_converges(ShellFamily::T3, Stabilization::projected_normal(), 0.03)
}

#[test]
fn cantilever_coarse_q4_is_not_locked() -> anyhow::Result<()> {
    // Two elements along a span-to-thickness ratio of 100
    init_logging();
    let ratio = normalized_tip_deflection(ShellFamily::Q4, 2, Stabilization::energy_sampling())?;
    assert!(ratio > 0.85, "coarse Q4 locks: {ratio}");
    Ok(())
}

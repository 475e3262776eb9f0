use std::io::{self, Write};

use log::warn;
use rayon::prelude::*;

use crate::{
    equation_of_state::MaterialTable, errors::RiemannSolverError,
    physical_quantities::Primitive,
};

use super::{ExactRiemannSolver, Scratch, WaveFamily};

/// One sampled point of the self-similar solution.
#[derive(Debug, Clone, Copy)]
pub struct TracePoint {
    /// Self-similar coordinate ξ = x/t.
    pub xi: f64,
    pub density: f64,
    pub velocity: f64,
    pub pressure: f64,
    pub id: usize,
}

/// Request-scoped collector for the (ξ, ρ, u, p, id) wave profile. Pushes
/// are no-ops unless tracing was requested, so the solver can thread it
/// through unconditionally.
pub(crate) struct WaveTrace {
    points: Option<Vec<TracePoint>>,
}

impl WaveTrace {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            points: enabled.then(Vec::new),
        }
    }

    pub(crate) fn push(&mut self, xi: f64, density: f64, velocity: f64, pressure: f64, id: usize) {
        if let Some(points) = &mut self.points {
            points.push(TracePoint {
                xi,
                density,
                velocity,
                pressure,
                id,
            });
        }
    }

    /// Drop everything collected so far (used when a pressure iteration is
    /// retried: only the converged iteration's waves may survive).
    pub(crate) fn clear(&mut self) {
        if let Some(points) = &mut self.points {
            points.clear();
        }
    }

    pub(crate) fn take(&mut self) -> Option<Vec<TracePoint>> {
        self.points.take()
    }
}

/// The full wave profile of a solved Riemann problem: all sampled states
/// ordered by ξ, padded with a sentinel row on each end so plots extend past
/// the outermost waves.
#[derive(Debug, Clone)]
pub struct WaveProfile {
    rows: Vec<TracePoint>,
}

impl WaveProfile {
    pub(crate) fn assemble(mut rows: Vec<TracePoint>) -> Self {
        rows.sort_by(|a, b| a.xi.total_cmp(&b.xi));
        if let (Some(&first), Some(&last)) = (rows.first(), rows.last()) {
            let span = last.xi - first.xi;
            rows.insert(
                0,
                TracePoint {
                    xi: first.xi - span,
                    ..first
                },
            );
            rows.push(TracePoint {
                xi: last.xi + span,
                ..last
            });
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[TracePoint] {
        &self.rows
    }

    /// Write the profile as whitespace-separated columns
    /// (ξ, ρ, u, p, e, id); the internal energy is recovered through the
    /// material table.
    pub fn write<W: Write>(&self, out: &mut W, materials: &MaterialTable) -> io::Result<()> {
        writeln!(
            out,
            "## xi(x/t) | density | velocity | pressure | internal energy per mass | material id"
        )?;
        for row in &self.rows {
            let e = materials
                .eos(row.id)
                .internal_energy(row.density, row.pressure);
            writeln!(
                out,
                "{:e}    {:e}    {:e}    {:e}    {:e}    {}",
                row.xi, row.density, row.velocity, row.pressure, e, row.id
            )?;
        }
        Ok(())
    }
}

/// The two one-sided star-state curves (p*, ρ*, u*) over a pressure grid.
#[derive(Debug, Clone, Default)]
pub struct StarRelations {
    pub left: Vec<[f64; 3]>,
    pub right: Vec<[f64; 3]>,
}

impl StarRelations {
    /// Write one curve as whitespace-separated (p*, ρ*, u*) rows.
    pub fn write_side<W: Write>(rows: &[[f64; 3]], out: &mut W) -> io::Result<()> {
        writeln!(out, "## p_star | rho_star | u_star")?;
        for row in rows {
            writeln!(out, "{:e}    {:e}    {:e}", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

impl<'a> ExactRiemannSolver<'a> {
    /// Sweep candidate star pressures over [pmin, pmax] with step dp and
    /// evaluate both wave branches independently at each point. Infeasible
    /// grid points are logged and skipped. The probes are independent, so
    /// the grid is evaluated in parallel.
    #[allow(clippy::too_many_arguments)]
    pub fn star_relations(
        &self,
        dir: usize,
        left: &Primitive,
        idl: usize,
        right: &Primitive,
        idr: usize,
        pmin: f64,
        pmax: f64,
        dp: f64,
    ) -> Result<StarRelations, RiemannSolverError> {
        let nonphysical = RiemannSolverError::NonphysicalState {
            left: *left,
            idl,
            right: *right,
            idr,
        };
        let ol = self.outer_1d(left, idl, dir).ok_or(nonphysical)?;
        let or = self.outer_1d(right, idr, dir).ok_or(nonphysical)?;

        let mut grid = vec![pmin];
        if dp > 0. {
            let mut ps = pmin;
            while ps < pmax {
                ps = (ps + dp).min(pmax);
                grid.push(ps);
            }
        }

        let rows: Vec<_> = grid
            .par_iter()
            .map(|&ps| {
                let mut scratch = Scratch::new(false);
                let left_row = self
                    .compute_rho_u_star(
                        WaveFamily::One,
                        &ol,
                        ps,
                        ol.rho,
                        if ps > ol.p { 1.1 * ol.rho } else { 0.9 * ol.rho },
                        false,
                        &mut scratch,
                    )
                    .map(|(rho, u)| [ps, rho, u])
                    .map_err(|err| {
                        warn!("1-wave star state failed at p* = {:e}: {}", ps, err);
                        err
                    })
                    .ok();
                let right_row = self
                    .compute_rho_u_star(
                        WaveFamily::Three,
                        &or,
                        ps,
                        or.rho,
                        if ps > or.p { 1.1 * or.rho } else { 0.9 * or.rho },
                        false,
                        &mut scratch,
                    )
                    .map(|(rho, u)| [ps, rho, u])
                    .map_err(|err| {
                        warn!("3-wave star state failed at p* = {:e}: {}", ps, err);
                        err
                    })
                    .ok();
                (left_row, right_row)
            })
            .collect();

        let mut relations = StarRelations::default();
        for (left_row, right_row) in rows {
            if let Some(row) = left_row {
                relations.left.push(row);
            }
            if let Some(row) = right_row {
                relations.right.push(row);
            }
        }
        Ok(relations)
    }
}

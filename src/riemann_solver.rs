mod bracket;
mod diagnostics;
mod rarefaction;
mod wave;

use glam::DVec3;
use log::warn;
use yaml_rust::Yaml;

use crate::{
    equation_of_state::MaterialTable,
    errors::RiemannSolverError,
    physical_quantities::Primitive,
};

use self::bracket::BracketResult;
use self::diagnostics::WaveTrace;
pub use self::diagnostics::{StarRelations, TracePoint, WaveProfile};

/// Tunables of the exact Riemann solver. All values have defaults; any of
/// them can be overridden from the `exact_riemann:` section of the
/// configuration.
#[derive(Debug, Clone, Copy)]
pub struct RiemannSolverConfig {
    /// Iteration cap for the pressure-space bracketing and convergence loops.
    pub max_its_main: usize,
    /// Iteration cap for the Hugoniot bracketing and refinement loops.
    pub max_its_shock: usize,
    /// Target number of integration steps across a rarefaction (the walk is
    /// hard-capped at five times this number).
    pub num_steps_rarefaction: usize,
    /// Relative convergence tolerance on the star pressure and velocity.
    pub tol_main: f64,
    /// Absolute tolerance on the shock-density bracket width.
    pub tol_shock: f64,
    /// Absolute tolerance on the rarefaction endpoint pressure.
    pub tol_rarefaction: f64,
    /// Lower clamp for probe pressures during the bracket search.
    pub min_pressure: f64,
    /// Residual threshold (relative to |uₗ − uᵣ|) under which a best-so-far
    /// probe is accepted when no pressure bracket exists.
    pub failure_threshold: f64,
    /// Forced star pressure probed when bracketing fails outright.
    pub pressure_at_failure: f64,
}

impl Default for RiemannSolverConfig {
    fn default() -> Self {
        Self {
            max_its_main: 400,
            max_its_shock: 200,
            num_steps_rarefaction: 100,
            tol_main: 1.0e-6,
            tol_shock: 1.0e-8,
            tol_rarefaction: 1.0e-8,
            min_pressure: 1.0e-12,
            failure_threshold: 0.2,
            pressure_at_failure: 1.0e-8,
        }
    }
}

impl RiemannSolverConfig {
    pub fn init(cfg: &Yaml) -> Self {
        let defaults = Self::default();
        let get_usize = |key: &str, default: usize| {
            cfg[key].as_i64().map(|i| i as usize).unwrap_or(default)
        };
        let get_f64 = |key: &str, default: f64| cfg[key].as_f64().unwrap_or(default);
        Self {
            max_its_main: get_usize("maxIts_main", defaults.max_its_main),
            max_its_shock: get_usize("maxIts_shock", defaults.max_its_shock),
            num_steps_rarefaction: get_usize(
                "numSteps_rarefaction",
                defaults.num_steps_rarefaction,
            ),
            tol_main: get_f64("tol_main", defaults.tol_main),
            tol_shock: get_f64("tol_shock", defaults.tol_shock),
            tol_rarefaction: get_f64("tol_rarefaction", defaults.tol_rarefaction),
            min_pressure: get_f64("min_pressure", defaults.min_pressure),
            failure_threshold: get_f64("failure_threshold", defaults.failure_threshold),
            pressure_at_failure: get_f64("pressure_at_failure", defaults.pressure_at_failure),
        }
    }
}

/// Which nonlinear wave a star state is connected through: the left-going
/// (u − c) family or the right-going (u + c) family. The contact in between
/// is always the 2-wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaveFamily {
    One,
    Three,
}

impl WaveFamily {
    /// The self-similar wave speed ξ = u ∓ c of this family.
    pub(crate) fn characteristic(&self, u: f64, c: f64) -> f64 {
        match self {
            WaveFamily::One => u - c,
            WaveFamily::Three => u + c,
        }
    }

    /// u ∓ du: velocity changes have opposite signs across the two families.
    pub(crate) fn apply_du(&self, u: f64, du: f64) -> f64 {
        match self {
            WaveFamily::One => u - du,
            WaveFamily::Three => u + du,
        }
    }
}

/// One of the two outer states, reduced to the 1D problem along the normal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Outer1d {
    pub(crate) rho: f64,
    pub(crate) u: f64,
    pub(crate) p: f64,
    pub(crate) e: f64,
    pub(crate) c: f64,
    pub(crate) id: usize,
}

/// The star-region plateau: a single pressure and normal velocity, with
/// separate densities on either side of the contact.
#[derive(Debug, Default, Clone, Copy)]
struct RiemannStarValues {
    rho_l: f64,
    rho_r: f64,
    u: f64,
    p: f64,
}

/// State inside a transonic rarefaction fan, sampled at ξ = 0.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FanSample {
    pub(crate) rho: f64,
    pub(crate) u: f64,
    pub(crate) p: f64,
}

/// Request-scoped working state: the transonic-fan sample, the optional wave
/// trace and the rarefaction-cap flag. Cleared/reset on every retry of the
/// pressure iteration.
pub(crate) struct Scratch {
    pub(crate) fan: Option<FanSample>,
    pub(crate) trace: WaveTrace,
    pub(crate) rarefaction_capped: bool,
}

impl Scratch {
    pub(crate) fn new(with_trace: bool) -> Self {
        Self {
            fan: None,
            trace: WaveTrace::new(with_trace),
            rarefaction_capped: false,
        }
    }
}

/// A successfully probed star pressure together with the star densities and
/// the two one-sided star velocities it implies.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProbePoint {
    pub(crate) p: f64,
    pub(crate) rho_l: f64,
    pub(crate) rho_r: f64,
    pub(crate) u_l: f64,
    pub(crate) u_r: f64,
}

impl ProbePoint {
    /// The pressure-iteration residual f(p) = u*ₗ − u*ᵣ.
    pub(crate) fn f(&self) -> f64 {
        self.u_l - self.u_r
    }
}

/// Solution of a two-material Riemann problem, sampled along the ray
/// x/t = 0.
#[derive(Debug, Clone)]
pub struct RiemannSolution {
    /// Primitive state at x/t = 0.
    pub state: Primitive,
    /// Material id at x/t = 0.
    pub id: usize,
    /// Star state immediately left of the contact discontinuity.
    pub star_left: Primitive,
    /// Star state immediately right of the contact discontinuity.
    pub star_right: Primitive,
    /// The ray x/t = 0 lies inside a rarefaction fan.
    pub transonic: bool,
    /// No pressure bracket was found; the solution is a best-effort
    /// approximation (a warning has been logged).
    pub approximate: bool,
    /// A rarefaction walk hit its hard step cap but ended at a physical
    /// state, which was accepted.
    pub rarefaction_capped: bool,
    /// Full wave-profile trace, present when requested.
    pub profile: Option<WaveProfile>,
}

/// Exact Riemann solver for the 1D Euler equations, supporting a different
/// material (and therefore a different EOS) on each side of the contact.
///
/// The solver holds only its tunables and a borrowed material table; all
/// per-request state lives on the stack, so a single instance can be shared
/// across threads.
pub struct ExactRiemannSolver<'a> {
    config: RiemannSolverConfig,
    materials: &'a MaterialTable,
}

impl<'a> ExactRiemannSolver<'a> {
    pub fn new(config: RiemannSolverConfig, materials: &'a MaterialTable) -> Self {
        Self { config, materials }
    }

    pub(crate) fn config(&self) -> &RiemannSolverConfig {
        &self.config
    }

    pub(crate) fn materials(&self) -> &MaterialTable {
        self.materials
    }

    /// Solve the Riemann problem posed by `left` and `right` along axis
    /// `dir` and sample the solution at x/t = 0.
    pub fn solve(
        &self,
        dir: usize,
        left: &Primitive,
        idl: usize,
        right: &Primitive,
        idr: usize,
    ) -> Result<RiemannSolution, RiemannSolverError> {
        self.solve_impl(dir, left, idl, right, idr, false)
    }

    /// Like [`solve`](Self::solve), but additionally records the full
    /// (ξ, ρ, u, p, id) wave profile in the returned solution.
    pub fn solve_with_profile(
        &self,
        dir: usize,
        left: &Primitive,
        idl: usize,
        right: &Primitive,
        idr: usize,
    ) -> Result<RiemannSolution, RiemannSolverError> {
        self.solve_impl(dir, left, idl, right, idr, true)
    }

    fn solve_impl(
        &self,
        dir: usize,
        left: &Primitive,
        idl: usize,
        right: &Primitive,
        idr: usize,
        with_trace: bool,
    ) -> Result<RiemannSolution, RiemannSolverError> {
        assert!(dir < 3, "dir must select one of the 3 spatial axes");

        let nonphysical = RiemannSolverError::NonphysicalState {
            left: *left,
            idl,
            right: *right,
            idr,
        };
        let ol = self
            .outer_1d(left, idl, dir)
            .ok_or(nonphysical)?;
        let or = self
            .outer_1d(right, idr, dir)
            .ok_or(nonphysical)?;

        let mut scratch = Scratch::new(with_trace);

        // Trivial case: no velocity or pressure jump means the only wave is
        // the contact itself.
        if ol.u == or.u && ol.p == or.p {
            let star = RiemannStarValues {
                rho_l: ol.rho,
                rho_r: or.rho,
                u: ol.u,
                p: ol.p,
            };
            return self.finalize_solution(dir, left, right, &ol, &or, star, &mut scratch, false);
        }

        // Phases A and B: two feasible probes, then a confirmed sign change
        // of f(p) = u*l - u*r.
        let bracket = self
            .find_initial_interval(&ol, &or, &mut scratch)
            .ok_or(RiemannSolverError::NoFeasiblePoints {
                left: *left,
                idl,
                right: *right,
                idr,
            })?;
        let (mut lo, mut hi) = match bracket {
            BracketResult::Bracketed(lo, hi) => (lo, hi),
            BracketResult::BestEffort(point) => {
                // No bracket exists; re-evaluate the fallback pressure with
                // fan capture and tracing so the solution can be assembled.
                scratch.fan = None;
                scratch.trace.clear();
                scratch.rarefaction_capped = false;
                let star = self
                    .star_at_pressure(&ol, &or, point.p, point.rho_l, point.rho_r, &mut scratch)
                    .ok_or(RiemannSolverError::StarStateFailed {
                        pressure: point.p,
                        left: *left,
                        idl,
                        right: *right,
                        idr,
                    })?;
                return self
                    .finalize_solution(dir, left, right, &ol, &or, star, &mut scratch, true);
            }
        };

        // Phase C: safeguarded secant iteration on the bracket.
        let mut f0 = lo.f();
        let mut f1 = hi.f();
        let mut cur = hi;
        let mut f2 = f1;
        let mut err_p = 1.0;
        let mut err_u = 1.0;
        let mut converged = false;

        let err_p_norm = (ol.p + 0.5 * ol.rho * ol.u * ol.u)
            .abs()
            .max((or.p + 0.5 * or.rho * or.u * or.u).abs());
        let err_u_norm = ol.c.max(or.c);

        scratch.trace.clear();
        scratch.rarefaction_capped = false;
        for _iter in 0..self.config.max_its_main {
            let denom = f1 - f0;
            if denom == 0. {
                return Err(RiemannSolverError::DegenerateSecant {
                    f0,
                    f1,
                    left: *left,
                    idl,
                    right: *right,
                    idr,
                });
            }

            let mut p2 = cur.p - f2 * (hi.p - lo.p) / denom;
            if p2 <= lo.p || p2 >= hi.p {
                // discard and switch to bisection
                p2 = 0.5 * (lo.p + hi.p);
            }

            let star_failed = RiemannSolverError::StarStateFailed {
                pressure: p2,
                left: *left,
                idl,
                right: *right,
                idr,
            };
            let (rho_l2, u_l2) = self
                .compute_rho_u_star(
                    WaveFamily::One,
                    &ol,
                    p2,
                    lo.rho_l,
                    hi.rho_l,
                    true,
                    &mut scratch,
                )
                .map_err(|_| star_failed)?;
            let (rho_r2, u_r2) = self
                .compute_rho_u_star(
                    WaveFamily::Three,
                    &or,
                    p2,
                    lo.rho_r,
                    hi.rho_r,
                    true,
                    &mut scratch,
                )
                .map_err(|_| star_failed)?;
            cur = ProbePoint {
                p: p2,
                rho_l: rho_l2,
                rho_r: rho_r2,
                u_l: u_l2,
                u_r: u_r2,
            };
            f2 = cur.f();

            if f0 * f2 < 0. {
                hi = cur;
                f1 = f2;
            } else {
                lo = cur;
                f0 = f2;
            }

            err_p = (hi.p - lo.p).abs() / err_p_norm;
            err_u = f2.abs() / err_u_norm;
            if (err_p < self.config.tol_main && err_u < self.config.tol_main)
                || err_p < self.config.tol_main * 1e-3
                || err_u < self.config.tol_main * 1e-3
            {
                converged = true;
                break;
            }

            scratch.fan = None;
            scratch.trace.clear();
            scratch.rarefaction_capped = false;
        }

        if !converged {
            return Err(RiemannSolverError::Diverged {
                err_p,
                err_u,
                left: *left,
                idl,
                right: *right,
                idr,
            });
        }

        let star = RiemannStarValues {
            rho_l: cur.rho_l,
            rho_r: cur.rho_r,
            u: 0.5 * (cur.u_l + cur.u_r),
            p: cur.p,
        };
        self.finalize_solution(dir, left, right, &ol, &or, star, &mut scratch, false)
    }

    /// Reduce a primitive state to the 1D problem along `dir` and validate
    /// it against its EOS. Returns `None` for a nonphysical state.
    pub(crate) fn outer_1d(&self, state: &Primitive, id: usize, dir: usize) -> Option<Outer1d> {
        let rho = state.density();
        let u = state.normal_velocity(dir);
        let p = state.pressure();
        let eos = self.materials.eos(id);
        let e = eos.internal_energy(rho, p);
        let c2 = eos.sound_speed_squared(rho, e);
        if rho <= 0. || c2 < 0. {
            return None;
        }
        Some(Outer1d {
            rho,
            u,
            p,
            e,
            c: c2.sqrt(),
            id,
        })
    }

    /// Evaluate both star branches at a prescribed pressure (the no-bracket
    /// fallback path), averaging the one-sided velocities.
    fn star_at_pressure(
        &self,
        ol: &Outer1d,
        or: &Outer1d,
        p: f64,
        rho_l_seed: f64,
        rho_r_seed: f64,
        scratch: &mut Scratch,
    ) -> Option<RiemannStarValues> {
        let (rho_l, u_l) = self
            .compute_rho_u_star(
                WaveFamily::One,
                ol,
                p,
                rho_l_seed,
                rho_l_seed * 1.1,
                true,
                scratch,
            )
            .ok()?;
        let (rho_r, u_r) = self
            .compute_rho_u_star(
                WaveFamily::Three,
                or,
                p,
                rho_r_seed,
                rho_r_seed * 1.1,
                true,
                scratch,
            )
            .ok()?;
        Some(RiemannStarValues {
            rho_l,
            rho_r,
            u: 0.5 * (u_l + u_r),
            p,
        })
    }

    /// Assemble the solution at x/t = 0 from the converged star values (C5):
    /// pick the material id, decide which wave governs the ray, upwind the
    /// tangential velocities and emit both star states.
    #[allow(clippy::too_many_arguments)]
    fn finalize_solution(
        &self,
        dir: usize,
        left: &Primitive,
        right: &Primitive,
        ol: &Outer1d,
        or: &Outer1d,
        star: RiemannStarValues,
        scratch: &mut Scratch,
        approximate: bool,
    ) -> Result<RiemannSolution, RiemannSolverError> {
        let id = if star.u >= 0. { ol.id } else { or.id };

        if approximate {
            warn!(
                "Using an approximate Riemann solution: p* = {:e}, u* = {:e} (left: {:?}, right: {:?})",
                star.p,
                star.u,
                left.to_array(),
                right.to_array()
            );
        }

        // the 2-wave
        scratch.trace.push(
            star.u - 1e-6_f64.max(0.001 * star.u.abs()),
            star.rho_l,
            star.u,
            star.p,
            ol.id,
        );
        scratch.trace.push(star.u, star.rho_r, star.u, star.p, or.id);

        let (rho, un, p) = if let Some(fan) = scratch.fan {
            // transonic rarefaction: x/t = 0 lies inside the fan
            (fan.rho, fan.u, fan.p)
        } else if star.u >= 0. {
            // left of the contact: either the outer left state or the left
            // star state, depending on the 1-wave
            let is_star_state = if ol.p >= star.p {
                // 1-rarefaction: has the tail already passed x/t = 0?
                let eos = self.materials.eos(ol.id);
                let e2 = eos.internal_energy(star.rho_l, star.p);
                let c2 = eos.sound_speed_squared(star.rho_l, e2);
                if star.rho_l <= 0. || c2 < 0. {
                    return Err(RiemannSolverError::NonphysicalState {
                        left: *left,
                        idl: ol.id,
                        right: *right,
                        idr: or.id,
                    });
                }
                star.u - c2.sqrt() <= 0.
            } else {
                // 1-shock: shock speed from mass conservation across the jump
                (star.rho_l * star.u - ol.rho * ol.u) / (star.rho_l - ol.rho) <= 0.
            };
            if is_star_state {
                (star.rho_l, star.u, star.p)
            } else {
                (ol.rho, ol.u, ol.p)
            }
        } else {
            // right of the contact: mirror image through the 3-wave
            let is_star_state = if or.p >= star.p {
                let eos = self.materials.eos(or.id);
                let e2 = eos.internal_energy(star.rho_r, star.p);
                let c2 = eos.sound_speed_squared(star.rho_r, e2);
                if star.rho_r <= 0. || c2 < 0. {
                    return Err(RiemannSolverError::NonphysicalState {
                        left: *left,
                        idl: ol.id,
                        right: *right,
                        idr: or.id,
                    });
                }
                star.u + c2.sqrt() >= 0.
            } else {
                (star.rho_r * star.u - or.rho * or.u) / (star.rho_r - or.rho) >= 0.
            };
            if is_star_state {
                (star.rho_r, star.u, star.p)
            } else {
                (or.rho, or.u, or.p)
            }
        };

        // tangential components pass through by upwinding on the contact
        let mut velocity = DVec3::ZERO;
        velocity[dir] = un;
        for i in 1..=2 {
            let k = (dir + i) % 3;
            velocity[k] = if star.u > 0. {
                left.velocity()[k]
            } else if star.u < 0. {
                right.velocity()[k]
            } else {
                0.5 * (left.velocity()[k] + right.velocity()[k])
            };
        }

        let mut star_left_velocity = left.velocity();
        star_left_velocity[dir] = star.u;
        let mut star_right_velocity = right.velocity();
        star_right_velocity[dir] = star.u;

        Ok(RiemannSolution {
            state: Primitive::new(rho, velocity, p),
            id,
            star_left: Primitive::new(star.rho_l, star_left_velocity, star.p),
            star_right: Primitive::new(star.rho_r, star_right_velocity, star.p),
            transonic: scratch.fan.is_some(),
            approximate,
            rarefaction_capped: scratch.rarefaction_capped,
            profile: scratch.trace.take().map(WaveProfile::assemble),
        })
    }
}

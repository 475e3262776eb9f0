use log::debug;

use crate::errors::WaveError;

use super::{
    rarefaction::one_step_rk4, ExactRiemannSolver, FanSample, Outer1d, Scratch, WaveFamily,
};

impl<'a> ExactRiemannSolver<'a> {
    /// Connect an outer state to its star state through the 1- or 3-wave at
    /// the candidate star pressure `p_star`, returning (ρ*, u*).
    ///
    /// The wave type is a pure sign test: a pressure drop towards the star
    /// region is a rarefaction (solved by isentrope integration), anything
    /// else is a shock (solved on the Hugoniot curve). `seed0`/`seed1` seed
    /// the Hugoniot bracket; `capture_fan` enables the transonic-fan sample
    /// at ξ = 0.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn compute_rho_u_star(
        &self,
        family: WaveFamily,
        outer: &Outer1d,
        p_star: f64,
        seed0: f64,
        seed1: f64,
        capture_fan: bool,
        scratch: &mut Scratch,
    ) -> Result<(f64, f64), WaveError> {
        if outer.p > p_star {
            self.integrate_rarefaction(family, outer, p_star, capture_fan, scratch)
        } else {
            self.solve_hugoniot(family, outer, p_star, seed0, seed1, scratch)
        }
    }

    /// Walk the isentrope from the outer state down to `p_star` with a
    /// pressure-controlled adaptive RK4 (Kamm's formulation: density is the
    /// integration variable, pressure drives the step size).
    fn integrate_rarefaction(
        &self,
        family: WaveFamily,
        outer: &Outer1d,
        p_star: f64,
        capture_fan: bool,
        scratch: &mut Scratch,
    ) -> Result<(f64, f64), WaveError> {
        let eos = self.materials().eos(outer.id);
        let cfg = self.config();
        let n = cfg.num_steps_rarefaction as f64;

        let dp_max = 1.25 * (outer.p - p_star) / n;
        let dp_target = dp_max / 1.25;

        // initial step from the EOS linearization, bounded by a fixed
        // fraction of the density
        let dpdrho = eos.dp_drho(outer.rho, outer.e);
        let mut drho = ((outer.p - p_star) / dpdrho).min(outer.rho / (2.5 * n));

        let (mut rho_0, mut u_0, mut p_0) = (outer.rho, outer.u, outer.p);
        let mut xi_0 = family.characteristic(outer.u, outer.c);
        scratch.trace.push(xi_0, rho_0, u_0, p_0, outer.id);

        for _ in 0..5 * cfg.num_steps_rarefaction {
            let step = match one_step_rk4(eos, family, rho_0, u_0, p_0, drho) {
                Ok(step) => step,
                Err(_) => {
                    drho *= 0.5;
                    continue;
                }
            };

            let dp = p_0 - step.p;
            if dp > dp_max {
                // too big a pressure drop: rewind and rescale
                drho = drho / dp * dp_target;
                continue;
            }
            if step.p - p_star < -cfg.tol_rarefaction {
                // overshot the star pressure: rewind and aim exactly
                if dp != 0. {
                    drho = drho / dp * (p_0 - p_star);
                } else {
                    drho *= 0.5;
                }
                continue;
            }

            scratch.trace.push(step.xi, step.rho, step.u, step.p, outer.id);

            if capture_fan && xi_0 * step.xi <= 0. {
                // transonic rarefaction: the fan crosses x = ξ = 0 within
                // this step; interpolate to the crossing
                let w0 = step.xi.abs();
                let w1 = xi_0.abs();
                let ww = w0 + w1;
                let (w0, w1) = (w0 / ww, w1 / ww);
                let fan = FanSample {
                    rho: w0 * rho_0 + w1 * step.rho,
                    u: w0 * u_0 + w1 * step.u,
                    p: w0 * p_0 + w1 * step.p,
                };
                scratch.trace.push(0., fan.rho, fan.u, fan.p, outer.id);
                scratch.fan = Some(fan);
            }

            if (step.p - p_star).abs() <= cfg.tol_rarefaction {
                if eos.is_nonphysical(step.rho, p_star) {
                    return Err(WaveError::NonphysicalProbe);
                }
                return Ok((step.rho, step.u));
            }

            // accept the step; grow carefully towards the remaining drop
            drho = (drho / dp * dp_target.min(step.p - p_star)).min(4. * drho);
            rho_0 = step.rho;
            u_0 = step.u;
            p_0 = step.p;
            xi_0 = step.xi;
        }

        // Budget exhausted. If the walk ended somewhere physical, accept the
        // last state as a best-effort answer and flag it; otherwise fail.
        if eos.is_nonphysical(rho_0, p_0) {
            Err(WaveError::RarefactionNotConverged)
        } else {
            debug!(
                "Rarefaction walk capped at {} steps (p = {:e}, target {:e})",
                5 * cfg.num_steps_rarefaction,
                p_0,
                p_star
            );
            scratch.rarefaction_capped = true;
            Ok((rho_0, u_0))
        }
    }

    /// Solve the Hugoniot equation at fixed `p_star` for the post-shock
    /// density, then recover the star velocity from the jump conditions.
    fn solve_hugoniot(
        &self,
        family: WaveFamily,
        outer: &Outer1d,
        p_star: f64,
        seed0: f64,
        seed1: f64,
        scratch: &mut Scratch,
    ) -> Result<(f64, f64), WaveError> {
        let eos = self.materials().eos(outer.id);
        let cfg = self.config();
        let (rho, u, p, e) = (outer.rho, outer.u, outer.p, outer.e);

        // Hugoniot residual at fixed (rho, p, p_star); the admissible root
        // lies in [rho, +inf)
        let hugo = |rho_star: f64| {
            eos.internal_energy(rho_star, p_star)
                - e
                - 0.5 * (p_star + p) * (1. / rho - 1. / rho_star)
        };

        let mut drho = (seed0 - seed1).abs().max(0.001 * seed0);
        let mut rho_s0 = seed0;
        let mut rho_s1 = seed1;
        let mut found0 = false;
        let mut found1 = false;
        let mut f0;
        let mut f1;

        if rho_s0.min(rho_s1) >= rho {
            // both seeds admissible
            f0 = hugo(rho_s0);
            f1 = hugo(rho_s1);
            if f0 * f1 <= 0. {
                if rho_s0 > rho_s1 {
                    std::mem::swap(&mut rho_s0, &mut rho_s1);
                    std::mem::swap(&mut f0, &mut f1);
                }
                found0 = true;
                found1 = true;
            } else {
                // collapse onto the (presumably better) second seed
                rho_s0 = rho_s1;
                f0 = f1;
            }
        } else {
            // start from the larger seed, clamped into the admissible range
            rho_s0 = rho_s0.max(rho_s1);
            if rho_s0 < rho {
                rho_s0 = rho;
                found0 = true;
            }
            f0 = hugo(rho_s0);
            f1 = f0;
        }

        if !found0 || !found1 {
            // expand geometrically around the single admissible point:
            // alternate inward (towards rho) and outward probes
            rho_s1 = rho_s0;
            f1 = f0;
            let factor = 1.5;
            let mut its = 0;
            while !found0 {
                its += 1;
                if its >= cfg.max_its_shock {
                    return Err(WaveError::HugoniotBracketNotFound);
                }
                let mut keep = rho_s1;
                let mut keep_f = f1;
                // move towards rho
                rho_s1 = rho_s0;
                f1 = f0;
                rho_s0 = rho_s1 - factor * drho;
                if rho_s0 <= rho {
                    rho_s0 = rho;
                    found0 = true;
                }
                f0 = hugo(rho_s0);

                if f0 * f1 <= 0. {
                    found0 = true;
                    found1 = true;
                } else {
                    // move outward instead, remembering the innermost point
                    rho_s1 = keep;
                    f1 = keep_f;
                    keep = rho_s0;
                    keep_f = f0;
                    rho_s0 = rho_s1;
                    f0 = f1;
                    rho_s1 = rho_s0 + factor * drho;
                    f1 = hugo(rho_s1);
                    if f0 * f1 <= 0. {
                        found0 = true;
                        found1 = true;
                    } else {
                        rho_s0 = keep;
                        f0 = keep_f;
                        drho = rho_s1 - rho_s0;
                    }
                }
            }

            if !found1 {
                // keep moving outward
                let factor = 2.5;
                let mut its = 0;
                while !found1 {
                    its += 1;
                    if its >= cfg.max_its_shock {
                        return Err(WaveError::HugoniotBracketNotFound);
                    }
                    rho_s0 = rho_s1;
                    f0 = f1;
                    rho_s1 = rho_s0 + factor * drho;
                    f1 = hugo(rho_s1);
                    if f0 * f1 <= 0. {
                        found1 = true;
                    } else {
                        drho = rho_s1 - rho_s0;
                    }
                }
            }
        }

        // refine with Brent's method, stopping on the bracket width
        let width_tol = cfg.tol_shock.min(0.001 * (rho_s1 - rho_s0));
        let rho_star = if f0 == 0. {
            rho_s0
        } else if f1 == 0. {
            rho_s1
        } else {
            brent(&hugo, rho_s0, rho_s1, f0, f1, width_tol, cfg.max_its_shock)?
        };

        // u* from the Rankine-Hugoniot jump; a negative radicand means the
        // jump violates hyperbolicity at this pressure
        let du2 = -(p_star - p) * (1. / rho_star - 1. / rho);
        if du2 < 0. {
            return Err(WaveError::NonphysicalProbe);
        }
        if eos.is_nonphysical(rho_star, p_star) {
            return Err(WaveError::NonphysicalProbe);
        }
        let u_star = family.apply_du(u, du2.sqrt());

        // shock speed from mass conservation, for the trace
        let xi = (rho_star * u_star - rho * u) / (rho_star - rho);
        match family {
            WaveFamily::One => {
                scratch
                    .trace
                    .push(xi - 0.0001 * xi.abs(), rho, u, p, outer.id);
                scratch.trace.push(xi, rho_star, u_star, p_star, outer.id);
            }
            WaveFamily::Three => {
                scratch.trace.push(xi, rho_star, u_star, p_star, outer.id);
                scratch
                    .trace
                    .push(xi + 0.0001 * xi.abs(), rho, u, p, outer.id);
            }
        }

        Ok((rho_star, u_star))
    }
}

/// Find a zero of `f` inside the bracket [a, b] (f(a)·f(b) ≤ 0) using
/// Brent's method, stopping when the bracket is narrower than `width_tol`.
fn brent(
    f: &impl Fn(f64) -> f64,
    mut a: f64,
    mut b: f64,
    mut fa: f64,
    mut fb: f64,
    width_tol: f64,
    max_its: usize,
) -> Result<f64, WaveError> {
    debug_assert!(fa * fb <= 0.);

    // if |f(a)| < |f(b)| then swap (a, b)
    if fa.abs() < fb.abs() {
        (a, b) = (b, a);
        (fa, fb) = (fb, fa);
    }

    let mut c = a;
    let mut fc = fa;
    let mut d = f64::INFINITY;
    let mut mflag = true;

    let mut its = 0;
    while fb != 0. && (a - b).abs() > width_tol {
        its += 1;
        if its > max_its {
            return Err(WaveError::HugoniotBracketNotFound);
        }

        let mut s = if fa != fc && fb != fc {
            // inverse quadratic interpolation
            a * fb * fc / (fa - fb) / (fa - fc)
                + b * fa * fc / (fb - fa) / (fb - fc)
                + c * fa * fb / (fc - fa) / (fc - fb)
        } else {
            // secant rule
            b - fb * (b - a) / (fb - fa)
        };

        let tmp = 0.25 * (3. * a + b);
        if !((s > tmp && s < b) || (s < tmp && s > b))
            || (mflag && (s - b).abs() >= 0.5 * (b - c).abs())
            || (!mflag && (s - b).abs() >= 0.5 * (c - d).abs())
            || (mflag && (b - c).abs() < width_tol)
            || (!mflag && (c - d).abs() < width_tol)
        {
            s = 0.5 * (a + b);
            mflag = true;
        } else {
            mflag = false;
        }

        let fs = f(s);
        d = c;
        c = b;
        fc = fb;
        if fa * fs < 0. {
            b = s;
            fb = fs;
        } else {
            a = s;
            fa = fs;
        }

        if fa.abs() < fb.abs() {
            (a, b) = (b, a);
            (fa, fb) = (fb, fa);
        }
    }

    Ok(b)
}

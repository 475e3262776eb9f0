use crate::{equation_of_state::EquationOfState, errors::WaveError};

use super::WaveFamily;

/// End state of one integration step along an isentrope.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RarefactionStep {
    pub(crate) rho: f64,
    pub(crate) u: f64,
    pub(crate) p: f64,
    /// ξ = u ∓ c at the end point.
    pub(crate) xi: f64,
}

/// One classical RK4 step of the rarefaction ODEs
///
///   dp/dρ = c²(ρ, p),   du/dρ = ∓ c/ρ,
///
/// advanced by `drho` in density. `drho` is passed in positive and negated
/// here: a rarefaction expands, so the integration runs from the outer state
/// towards lower densities.
///
/// Fails as soon as any stage leaves the physical region (ρ ≤ 0 or c² < 0),
/// which the caller handles by halving the step.
pub(crate) fn one_step_rk4(
    eos: &dyn EquationOfState,
    family: WaveFamily,
    rho_0: f64,
    u_0: f64,
    p_0: f64,
    drho: f64,
) -> Result<RarefactionStep, WaveError> {
    let drho = -drho;

    let stage = |rho: f64, p: f64| -> Result<(f64, f64), WaveError> {
        let e = eos.internal_energy(rho, p);
        let c2 = eos.sound_speed_squared(rho, e);
        if rho <= 0. || c2 < 0. {
            return Err(WaveError::NonphysicalProbe);
        }
        Ok((c2, c2.sqrt()))
    };

    let (c2_0, c_0) = stage(rho_0, p_0)?;

    let rho_1 = rho_0 + 0.5 * drho;
    let p_1 = p_0 + 0.5 * drho * c2_0;
    let (c2_1, c_1) = stage(rho_1, p_1)?;

    let rho_2 = rho_1;
    let p_2 = p_0 + 0.5 * drho * c2_1;
    let (c2_2, c_2) = stage(rho_2, p_2)?;

    let rho_3 = rho_0 + drho;
    let p_3 = p_0 + drho * c2_2;
    let (c2_3, c_3) = stage(rho_3, p_3)?;

    let p = p_0 + drho / 6. * (c2_0 + 2. * (c2_1 + c2_2) + c2_3);
    let du = drho / 6. * (c_0 / rho_0 + 2. * (c_1 / rho_1 + c_2 / rho_2) + c_3 / rho_3);
    let u = family.apply_du(u_0, du);
    // Note: for |drho| tiny compared to rho_0 this can reproduce rho_0
    // exactly due to roundoff.
    let rho = rho_0 + drho;

    let (_, c) = stage(rho, p)?;
    Ok(RarefactionStep {
        rho,
        u,
        p,
        xi: family.characteristic(u, c),
    })
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use crate::equation_of_state::StiffenedGas;

    use super::*;

    #[test]
    fn test_step_follows_ideal_gas_isentrope() {
        let gamma = 1.4;
        let eos = StiffenedGas::ideal(gamma);
        let (rho_0, u_0, p_0) = (1.0, 0.0, 1.0);
        let drho = 0.01;
        let step = one_step_rk4(&eos, WaveFamily::One, rho_0, u_0, p_0, drho).unwrap();

        assert_approx_eq!(f64, step.rho, rho_0 - drho);
        // p / rho^gamma is invariant along the isentrope; RK4 should track it
        // to ~(drho)^5
        let p_exact = p_0 * (step.rho / rho_0).powf(gamma);
        assert_approx_eq!(f64, step.p, p_exact, epsilon = 1e-10);
        // u + 2c/(gamma-1) is the invariant of the left family
        let c_0 = (gamma * p_0 / rho_0).sqrt();
        let c_exact = (gamma * p_exact / step.rho).sqrt();
        let u_exact = u_0 + 2. / (gamma - 1.) * (c_0 - c_exact);
        assert_approx_eq!(f64, step.u, u_exact, epsilon = 1e-10);
        assert_approx_eq!(f64, step.xi, step.u - c_exact, epsilon = 1e-10);
    }

    #[test]
    fn test_right_family_mirrors_left() {
        let eos = StiffenedGas::ideal(1.4);
        let left = one_step_rk4(&eos, WaveFamily::One, 1.0, 0.0, 1.0, 0.01).unwrap();
        let right = one_step_rk4(&eos, WaveFamily::Three, 1.0, 0.0, 1.0, 0.01).unwrap();
        assert_approx_eq!(f64, left.rho, right.rho);
        assert_approx_eq!(f64, left.p, right.p);
        assert_approx_eq!(f64, left.u, -right.u);
    }

    #[test]
    fn test_overshooting_step_fails() {
        let eos = StiffenedGas::ideal(1.4);
        // a step larger than the density itself must leave the physical region
        assert!(one_step_rk4(&eos, WaveFamily::One, 1.0, 0.0, 1.0, 1.5).is_err());
    }
}

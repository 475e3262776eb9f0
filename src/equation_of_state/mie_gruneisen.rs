use yaml_rust::Yaml;

use crate::errors::ConfigError;

use super::{parse_f64, EquationOfState};

/// Mie–Grüneisen EOS with a linear us–up Hugoniot reference curve:
///
/// p(ρ, e) = ρ₀c₀²η(1 − ½Γ₀η)/(1 − sη)² + Γ₀ρ₀(e − e₀),  η = 1 − ρ₀/ρ.
///
/// Suited to solids and liquids under shock loading. The model is only
/// defined up to the compression singularity at sη = 1.
#[derive(Debug, Clone, Copy)]
pub struct MieGruneisen {
    rho0: f64,
    c0: f64,
    gamma0: f64,
    s: f64,
    e0: f64,
}

impl MieGruneisen {
    pub fn new(rho0: f64, c0: f64, gamma0: f64, s: f64, e0: f64) -> Self {
        Self {
            rho0,
            c0,
            gamma0,
            s,
            e0,
        }
    }

    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let context = "materials: MieGruneisen";
        Ok(Self::new(
            parse_f64(cfg, "rho0", context)?,
            parse_f64(cfg, "c0", context)?,
            parse_f64(cfg, "Gamma0", context)?,
            parse_f64(cfg, "s", context)?,
            cfg["e0"].as_f64().unwrap_or(0.),
        ))
    }

    fn eta(&self, density: f64) -> f64 {
        1. - self.rho0 / density
    }

    /// The cold-curve part F(η) of the pressure.
    fn reference_pressure(&self, eta: f64) -> f64 {
        let denom = 1. - self.s * eta;
        self.rho0 * self.c0 * self.c0 * eta * (1. - 0.5 * self.gamma0 * eta) / (denom * denom)
    }

    /// dF/dη.
    fn reference_pressure_deta(&self, eta: f64) -> f64 {
        let denom = 1. - self.s * eta;
        self.rho0 * self.c0 * self.c0
            * ((1. - self.gamma0 * eta) * denom
                + 2. * self.s * eta * (1. - 0.5 * self.gamma0 * eta))
            / (denom * denom * denom)
    }
}

impl EquationOfState for MieGruneisen {
    fn internal_energy(&self, density: f64, pressure: f64) -> f64 {
        let eta = self.eta(density);
        (pressure - self.reference_pressure(eta)) / (self.gamma0 * self.rho0) + self.e0
    }

    fn pressure(&self, density: f64, internal_energy: f64) -> f64 {
        let eta = self.eta(density);
        self.reference_pressure(eta) + self.gamma0 * self.rho0 * (internal_energy - self.e0)
    }

    fn sound_speed_squared(&self, density: f64, internal_energy: f64) -> f64 {
        let pressure = self.pressure(density, internal_energy);
        self.dp_drho(density, internal_energy)
            + pressure / (density * density) * self.gamma0 * self.rho0
    }

    fn dp_drho(&self, density: f64, _internal_energy: f64) -> f64 {
        // dη/dρ = ρ₀/ρ²
        self.reference_pressure_deta(self.eta(density)) * self.rho0 / (density * density)
    }

    fn is_nonphysical(&self, density: f64, _pressure: f64) -> bool {
        density <= 0. || 1. - self.s * self.eta(density) <= 0.
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;

    // copper-like parameters (Mbar-cm-µs units)
    fn copper() -> MieGruneisen {
        MieGruneisen::new(8.93, 0.394, 2.0, 1.48, 0.)
    }

    #[test]
    fn test_reference_state() {
        let eos = copper();
        // at rho = rho0 the cold curve vanishes: p = Gamma0 rho0 e
        let e = 1.0e-3;
        assert_approx_eq!(f64, eos.pressure(8.93, e), 2.0 * 8.93 * e);
        let p = eos.pressure(8.93, e);
        assert_approx_eq!(f64, eos.internal_energy(8.93, p), e, epsilon = 1e-12);
    }

    #[test]
    fn test_dp_drho_matches_finite_difference() {
        let eos = copper();
        let (rho, e) = (9.5, 2.0e-3);
        let drho = 1e-6;
        let numeric = (eos.pressure(rho + drho, e) - eos.pressure(rho - drho, e)) / (2. * drho);
        assert_approx_eq!(f64, eos.dp_drho(rho, e), numeric, epsilon = 1e-6);
        assert!(eos.sound_speed_squared(rho, e) > 0.);
    }

    #[test]
    fn test_compression_limit_is_nonphysical() {
        let eos = copper();
        // s * eta >= 1 at strong compression
        let rho_limit = 8.93 / (1. - 1. / 1.48);
        assert!(eos.is_nonphysical(rho_limit + 1., 1.));
        assert!(!eos.is_nonphysical(8.93, 1.));
    }
}

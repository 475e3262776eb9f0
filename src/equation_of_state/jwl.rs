use yaml_rust::Yaml;

use crate::errors::ConfigError;

use super::{parse_f64, EquationOfState};

/// Jones–Wilkins–Lee EOS for detonation products:
///
/// p(ρ, e) = A₁(1 − ωρ/(R₁ρ₀))e^(−R₁ρ₀/ρ) + A₂(1 − ωρ/(R₂ρ₀))e^(−R₂ρ₀/ρ) + ωρe.
#[derive(Debug, Clone, Copy)]
pub struct Jwl {
    omega: f64,
    a1: f64,
    a2: f64,
    r1: f64,
    r2: f64,
    rho0: f64,
}

impl Jwl {
    pub fn new(omega: f64, a1: f64, a2: f64, r1: f64, r2: f64, rho0: f64) -> Self {
        Self {
            omega,
            a1,
            a2,
            r1,
            r2,
            rho0,
        }
    }

    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let context = "materials: JWL";
        Ok(Self::new(
            parse_f64(cfg, "omega", context)?,
            parse_f64(cfg, "A1", context)?,
            parse_f64(cfg, "A2", context)?,
            parse_f64(cfg, "R1", context)?,
            parse_f64(cfg, "R2", context)?,
            parse_f64(cfg, "rho0", context)?,
        ))
    }

    /// The energy-independent part F(ρ) of the pressure.
    fn reference_pressure(&self, density: f64) -> f64 {
        let x1 = self.r1 * self.rho0 / density;
        let x2 = self.r2 * self.rho0 / density;
        self.a1 * (1. - self.omega / x1) * (-x1).exp()
            + self.a2 * (1. - self.omega / x2) * (-x2).exp()
    }

    /// dF/dρ.
    fn reference_pressure_drho(&self, density: f64) -> f64 {
        let mut deriv = 0.;
        for (a, r) in [(self.a1, self.r1), (self.a2, self.r2)] {
            let x = r * self.rho0 / density;
            // d/dρ [(1 − ω/x)e^(−x)], with x = Rρ₀/ρ
            deriv += a
                * (-x).exp()
                * (-self.omega / (r * self.rho0) + (1. - self.omega / x) * x / density);
        }
        deriv
    }
}

impl EquationOfState for Jwl {
    fn internal_energy(&self, density: f64, pressure: f64) -> f64 {
        (pressure - self.reference_pressure(density)) / (self.omega * density)
    }

    fn pressure(&self, density: f64, internal_energy: f64) -> f64 {
        self.reference_pressure(density) + self.omega * density * internal_energy
    }

    fn sound_speed_squared(&self, density: f64, internal_energy: f64) -> f64 {
        let pressure = self.pressure(density, internal_energy);
        self.dp_drho(density, internal_energy) + self.omega * pressure / density
    }

    fn dp_drho(&self, density: f64, internal_energy: f64) -> f64 {
        self.reference_pressure_drho(density) + self.omega * internal_energy
    }

    fn is_nonphysical(&self, density: f64, _pressure: f64) -> bool {
        density <= 0.
    }
}

#[cfg(test)]
mod test {
    use float_cmp::assert_approx_eq;

    use super::*;

    // TNT products (Mbar-cm-µs units)
    fn tnt() -> Jwl {
        Jwl::new(0.3, 3.712, 0.03231, 4.15, 0.95, 1.63)
    }

    #[test]
    fn test_energy_pressure_consistency() {
        let eos = tnt();
        let (rho, e) = (1.2, 0.05);
        let p = eos.pressure(rho, e);
        assert_approx_eq!(f64, eos.internal_energy(rho, p), e, epsilon = 1e-12);
    }

    #[test]
    fn test_dp_drho_matches_finite_difference() {
        let eos = tnt();
        let (rho, e) = (1.2, 0.05);
        let drho = 1e-7;
        let numeric = (eos.pressure(rho + drho, e) - eos.pressure(rho - drho, e)) / (2. * drho);
        assert_approx_eq!(f64, eos.dp_drho(rho, e), numeric, epsilon = 1e-6);
        assert!(eos.sound_speed_squared(rho, e) > 0.);
    }
}

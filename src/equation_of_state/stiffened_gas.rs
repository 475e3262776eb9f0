use yaml_rust::Yaml;

use crate::errors::ConfigError;

use super::{parse_f64, EquationOfState};

/// Stiffened gas: p = (γ − 1)ρe − γp∞. With p∞ = 0 this reduces to the
/// ideal (gamma-law) gas.
#[derive(Debug, Clone, Copy)]
pub struct StiffenedGas {
    gamma: f64,
    /// 1 / (γ − 1), precomputed.
    odgm1: f64,
    pstiff: f64,
}

impl StiffenedGas {
    pub fn new(gamma: f64, pstiff: f64) -> Self {
        Self {
            gamma,
            odgm1: 1. / (gamma - 1.),
            pstiff,
        }
    }

    /// An ideal gas with adiabatic index `gamma`.
    pub fn ideal(gamma: f64) -> Self {
        Self::new(gamma, 0.)
    }

    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let gamma = parse_f64(cfg, "gamma", "materials: StiffenedGas")?;
        let pstiff = cfg["pressure_constant"].as_f64().unwrap_or(0.);
        Ok(Self::new(gamma, pstiff))
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl EquationOfState for StiffenedGas {
    fn internal_energy(&self, density: f64, pressure: f64) -> f64 {
        (pressure + self.gamma * self.pstiff) * self.odgm1 / density
    }

    fn pressure(&self, density: f64, internal_energy: f64) -> f64 {
        (self.gamma - 1.) * density * internal_energy - self.gamma * self.pstiff
    }

    fn sound_speed_squared(&self, density: f64, internal_energy: f64) -> f64 {
        let pressure = self.pressure(density, internal_energy);
        self.gamma * (pressure + self.pstiff) / density
    }

    fn dp_drho(&self, _density: f64, internal_energy: f64) -> f64 {
        (self.gamma - 1.) * internal_energy
    }

    fn is_nonphysical(&self, density: f64, pressure: f64) -> bool {
        density <= 0. || pressure + self.pstiff <= 0.
    }
}

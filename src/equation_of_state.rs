mod jwl;
mod mie_gruneisen;
mod stiffened_gas;

use yaml_rust::Yaml;

use crate::errors::ConfigError;

pub use jwl::Jwl;
pub use mie_gruneisen::MieGruneisen;
pub use stiffened_gas::StiffenedGas;

/// Thermodynamic capability object of a single material.
///
/// The solver never assumes closed-form gas relations: every derivative and
/// sound speed is obtained through this interface, so non-convex equations of
/// state are supported as long as they can answer these queries.
pub trait EquationOfState: Sync + Send {
    /// Specific internal energy e(ρ, p).
    fn internal_energy(&self, density: f64, pressure: f64) -> f64;

    /// Pressure p(ρ, e).
    fn pressure(&self, density: f64, internal_energy: f64) -> f64;

    /// Squared sound speed c²(ρ, e). May return a negative value for a
    /// nonphysical state; callers must treat that as a failed probe.
    fn sound_speed_squared(&self, density: f64, internal_energy: f64) -> f64;

    /// ∂p/∂ρ at constant internal energy.
    fn dp_drho(&self, density: f64, internal_energy: f64) -> f64;

    /// Whether (ρ, p) lies outside the physically admissible region of this
    /// material. Note the polarity: `true` means *nonphysical*.
    fn is_nonphysical(&self, density: f64, pressure: f64) -> bool;
}

/// The material catalogue: one EOS capability object per material id, with a
/// lifetime covering every solver that borrows it.
pub struct MaterialTable {
    materials: Vec<Box<dyn EquationOfState>>,
}

impl MaterialTable {
    pub fn new(materials: Vec<Box<dyn EquationOfState>>) -> Self {
        Self { materials }
    }

    /// Parse the `materials:` list of the configuration. The list index is
    /// the material id.
    pub fn init(cfg: &Yaml) -> Result<Self, ConfigError> {
        let entries = cfg
            .as_vec()
            .ok_or_else(|| ConfigError::MissingParameter("materials".to_string()))?;
        let mut materials: Vec<Box<dyn EquationOfState>> = Vec::with_capacity(entries.len());
        for entry in entries {
            let kind = entry["kind"]
                .as_str()
                .ok_or_else(|| ConfigError::MissingParameter("materials: kind".to_string()))?;
            materials.push(match kind {
                "StiffenedGas" => Box::new(StiffenedGas::init(entry)?),
                "MieGruneisen" => Box::new(MieGruneisen::init(entry)?),
                "JWL" => Box::new(Jwl::init(entry)?),
                _ => return Err(ConfigError::UnknownEquationOfState(kind.to_string())),
            });
        }
        Ok(Self { materials })
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// The EOS of material `id`. Ids are validated when a problem is parsed;
    /// an out-of-range id here is a programming error.
    pub fn eos(&self, id: usize) -> &dyn EquationOfState {
        self.materials[id].as_ref()
    }
}

pub(crate) fn parse_f64(cfg: &Yaml, key: &str, context: &str) -> Result<f64, ConfigError> {
    cfg[key]
        .as_f64()
        .or_else(|| cfg[key].as_i64().map(|i| i as f64))
        .ok_or_else(|| ConfigError::MissingParameter(format!("{}: {}", context, key)))
}

#[cfg(test)]
mod test {
    use yaml_rust::YamlLoader;

    use super::*;

    #[test]
    fn test_material_table_from_yaml() {
        let docs = YamlLoader::load_from_str(
            r##"
materials:
  - kind: "StiffenedGas"
    gamma: 1.4
  - kind: "StiffenedGas"
    gamma: 4.4
    pressure_constant: 6.0e8
"##,
        )
        .unwrap();
        let table = MaterialTable::init(&docs[0]["materials"]).unwrap();
        assert_eq!(table.len(), 2);
        // ideal gas: e = p / ((gamma - 1) rho)
        let e = table.eos(0).internal_energy(1., 1.);
        assert!((e - 2.5).abs() < 1e-14);
    }

    #[test]
    fn test_unknown_eos_kind() {
        let docs = YamlLoader::load_from_str(
            r##"
materials:
  - kind: "PerfectFluid"
"##,
        )
        .unwrap();
        assert!(MaterialTable::init(&docs[0]["materials"]).is_err());
    }
}

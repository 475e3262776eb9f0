use glam::DVec3;

/// Primitive hydrodynamic state of a fluid parcel: density, velocity and
/// pressure. The wire layout used by mesh-level callers is the flat array
/// (ρ, u₁, u₂, u₃, p).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Primitive {
    density: f64,
    velocity: DVec3,
    pressure: f64,
}

impl Primitive {
    pub fn new(density: f64, velocity: DVec3, pressure: f64) -> Self {
        Self {
            density,
            velocity,
            pressure,
        }
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    /// Velocity component normal to the interface (`dir` ∈ {0, 1, 2}).
    pub fn normal_velocity(&self, dir: usize) -> f64 {
        self.velocity[dir]
    }

    pub fn from_array(v: &[f64; 5]) -> Self {
        Self {
            density: v[0],
            velocity: DVec3::new(v[1], v[2], v[3]),
            pressure: v[4],
        }
    }

    pub fn to_array(&self) -> [f64; 5] {
        [
            self.density,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
            self.pressure,
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_array_roundtrip() {
        let v = [0.75, 0.4, -0.1, 2.5, 0.8];
        let primitive = Primitive::from_array(&v);
        assert_eq!(primitive.density(), 0.75);
        assert_eq!(primitive.normal_velocity(0), 0.4);
        assert_eq!(primitive.normal_velocity(2), 2.5);
        assert_eq!(primitive.pressure(), 0.8);
        assert_eq!(primitive.to_array(), v);
    }
}

use std::{
    error::Error,
    fmt::{Debug, Display},
};

use yaml_rust::Yaml;

use crate::physical_quantities::Primitive;

/// Errors raised while parsing the YAML configuration.
#[derive(Debug)]
pub enum ConfigError {
    MissingParameter(String),
    UnknownEquationOfState(String),
    InvalidMaterialId(usize, usize),
    InvalidArrayFormat(Yaml),
    IllegalDirection(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingParameter(name) => {
                write!(f, "Missing required parameter in configuration: {}", name)
            }
            ConfigError::UnknownEquationOfState(name) => {
                write!(f, "Unknown type of equation of state configured: {}", name)
            }
            ConfigError::InvalidMaterialId(id, count) => {
                write!(
                    f,
                    "Material id {} out of range ({} materials configured)",
                    id, count
                )
            }
            ConfigError::InvalidArrayFormat(value) => {
                write!(f, "Expected array of 3 reals but found: {:?}", value)
            }
            ConfigError::IllegalDirection(dir) => {
                write!(f, "Illegal direction (must be 0, 1 or 2): {}", dir)
            }
        }
    }
}

impl Error for ConfigError {}

/// Recoverable failures of the wave-connector. These never escape the solver:
/// inner loops respond by reducing step sizes or re-bracketing, and the
/// pressure iteration treats them as infeasible probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveError {
    /// The EOS reported ρ ≤ 0 or c² < 0 (or a violated jump radicand) at a
    /// probed state.
    NonphysicalProbe,
    /// No sign change of the Hugoniot residual was found within the
    /// iteration budget.
    HugoniotBracketNotFound,
    /// The rarefaction walk exhausted its step budget and ended at a
    /// nonphysical state.
    RarefactionNotConverged,
}

impl Display for WaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaveError::NonphysicalProbe => {
                write!(f, "Negative density or c^2 at a probed state")
            }
            WaveError::HugoniotBracketNotFound => {
                write!(f, "Unable to bracket the Hugoniot equation root")
            }
            WaveError::RarefactionNotConverged => {
                write!(f, "Rarefaction integration failed to reach the star pressure")
            }
        }
    }
}

impl Error for WaveError {}

/// Unrecoverable solver outcomes. Each variant carries the offending left and
/// right states (and material ids) so mesh-level callers can log them.
#[derive(Debug, Clone, Copy)]
pub enum RiemannSolverError {
    /// One of the two input states is already nonphysical.
    NonphysicalState {
        left: Primitive,
        idl: usize,
        right: Primitive,
        idr: usize,
    },
    /// No pair of probe pressures permits a star-state evaluation; the inputs
    /// are almost certainly malformed.
    NoFeasiblePoints {
        left: Primitive,
        idl: usize,
        right: Primitive,
        idr: usize,
    },
    /// The wave-connector failed at a pressure inside a confirmed bracket.
    StarStateFailed {
        pressure: f64,
        left: Primitive,
        idl: usize,
        right: Primitive,
        idr: usize,
    },
    /// Zero secant denominator in the main pressure iteration.
    DegenerateSecant {
        f0: f64,
        f1: f64,
        left: Primitive,
        idl: usize,
        right: Primitive,
        idr: usize,
    },
    /// The main pressure iteration exhausted its budget on a confirmed
    /// bracket.
    Diverged {
        err_p: f64,
        err_u: f64,
        left: Primitive,
        idl: usize,
        right: Primitive,
        idr: usize,
    },
}

fn write_states(
    f: &mut std::fmt::Formatter<'_>,
    left: &Primitive,
    idl: usize,
    right: &Primitive,
    idr: usize,
) -> std::fmt::Result {
    write!(
        f,
        " left: {:?} ({}) | right: {:?} ({})",
        left.to_array(),
        idl,
        right.to_array(),
        idr
    )
}

impl Display for RiemannSolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiemannSolverError::NonphysicalState {
                left,
                idl,
                right,
                idr,
            } => {
                write!(f, "Negative density or c^2 in a Riemann input state.")?;
                write_states(f, left, *idl, right, *idr)
            }
            RiemannSolverError::NoFeasiblePoints {
                left,
                idl,
                right,
                idr,
            } => {
                write!(f, "Failed to find initial probe pressures.")?;
                write_states(f, left, *idl, right, *idr)
            }
            RiemannSolverError::StarStateFailed {
                pressure,
                left,
                idl,
                right,
                idr,
            } => {
                write!(f, "Star-state evaluation failed at p = {:e}.", pressure)?;
                write_states(f, left, *idl, right, *idr)
            }
            RiemannSolverError::DegenerateSecant {
                f0,
                f1,
                left,
                idl,
                right,
                idr,
            } => {
                write!(
                    f,
                    "Division by zero in the secant update (f0 = {:e}, f1 = {:e}).",
                    f0, f1
                )?;
                write_states(f, left, *idl, right, *idr)
            }
            RiemannSolverError::Diverged {
                err_p,
                err_u,
                left,
                idl,
                right,
                idr,
            } => {
                write!(
                    f,
                    "Pressure iteration failed to converge (err_p = {:e}, err_u = {:e}).",
                    err_p, err_u
                )?;
                write_states(f, left, *idl, right, *idr)
            }
        }
    }
}

impl Error for RiemannSolverError {}

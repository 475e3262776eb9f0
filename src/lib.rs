//! Exact Riemann solver for the one-dimensional compressible Euler equations
//! with two materials and arbitrary equations of state.
//!
//! Given a left and a right primitive state, each tied to its own material,
//! the solver computes the self-similar wave structure (rarefactions solved
//! by isentrope integration, shocks by Hugoniot root-finding), iterates on
//! the star pressure until the two one-sided star velocities agree, and
//! samples the solution along the ray x/t = 0.

pub use equation_of_state::{EquationOfState, Jwl, MaterialTable, MieGruneisen, StiffenedGas};
pub use errors::{ConfigError, RiemannSolverError, WaveError};
pub use physical_quantities::Primitive;
pub use riemann_solver::{
    ExactRiemannSolver, RiemannSolution, RiemannSolverConfig, StarRelations, TracePoint,
    WaveProfile,
};

mod equation_of_state;
mod errors;
mod physical_quantities;
mod riemann_solver;

//! End-to-end Riemann problems with an ideal-gas EOS (gamma = 1.4) and the
//! universal solver invariants. The star-state references are the classic
//! Toro test cases.

use float_cmp::assert_approx_eq;
use glam::DVec3;

use exact_riemann::{
    ExactRiemannSolver, MaterialTable, Primitive, RiemannSolution, RiemannSolverConfig,
    StiffenedGas,
};

const GAMMA: f64 = 1.4;

fn ideal_gas_table() -> MaterialTable {
    MaterialTable::new(vec![Box::new(StiffenedGas::ideal(GAMMA))])
}

fn solve_x(
    table: &MaterialTable,
    left: (f64, f64, f64),
    right: (f64, f64, f64),
) -> RiemannSolution {
    let solver = ExactRiemannSolver::new(RiemannSolverConfig::default(), table);
    let left = Primitive::new(left.0, left.1 * DVec3::X, left.2);
    let right = Primitive::new(right.0, right.1 * DVec3::X, right.2);
    solver.solve(0, &left, 0, &right, 0).unwrap()
}

fn assert_star_state(
    solution: &RiemannSolution,
    p_star: f64,
    u_star: f64,
    rho_star_l: f64,
    rho_star_r: f64,
    epsilon: f64,
) {
    assert_approx_eq!(f64, solution.star_left.pressure(), p_star, epsilon = epsilon);
    assert_approx_eq!(
        f64,
        solution.star_right.pressure(),
        p_star,
        epsilon = epsilon
    );
    assert_approx_eq!(
        f64,
        solution.star_left.normal_velocity(0),
        u_star,
        epsilon = epsilon
    );
    assert_approx_eq!(
        f64,
        solution.star_right.normal_velocity(0),
        u_star,
        epsilon = epsilon
    );
    assert_approx_eq!(
        f64,
        solution.star_left.density(),
        rho_star_l,
        epsilon = epsilon
    );
    assert_approx_eq!(
        f64,
        solution.star_right.density(),
        rho_star_r,
        epsilon = epsilon
    );
}

#[test]
fn test_sod_shock_tube() {
    let table = ideal_gas_table();
    let solution = solve_x(&table, (1., 0., 1.), (0.125, 0., 0.1));

    // rarefaction - contact - shock
    assert_star_state(&solution, 0.30313, 0.92745, 0.42632, 0.26557, 1e-4);
    assert!(!solution.approximate);
    assert!(!solution.transonic);

    // subsonic contact moving right: the interface state is the left star
    // state
    assert_approx_eq!(f64, solution.state.density(), 0.42632, epsilon = 1e-4);
    assert_approx_eq!(
        f64,
        solution.state.normal_velocity(0),
        0.92745,
        epsilon = 1e-4
    );

    // sign relations: rarefaction thins the left state, the shock compresses
    // the right state
    assert!(solution.star_left.density() <= 1.);
    assert!(solution.star_right.density() >= 0.125);
}

#[test]
fn test_double_rarefaction_123() {
    let table = ideal_gas_table();
    let solution = solve_x(&table, (1., -2., 0.4), (1., 2., 0.4));

    assert_approx_eq!(f64, solution.star_left.pressure(), 0.00189, epsilon = 1e-5);
    assert_approx_eq!(
        f64,
        solution.star_left.normal_velocity(0),
        0.,
        epsilon = 1e-5
    );
    assert_approx_eq!(f64, solution.star_left.density(), 0.02185, epsilon = 2e-4);
    assert_approx_eq!(f64, solution.star_right.density(), 0.02185, epsilon = 2e-4);
    assert!(!solution.approximate);
}

#[test]
fn test_strong_blast_wave() {
    let table = ideal_gas_table();
    let solution = solve_x(&table, (1., 0., 1000.), (1., 0., 0.01));

    assert_star_state(&solution, 460.894, 19.5975, 0.57506, 5.99924, 1e-2);
    assert!(!solution.approximate);
}

#[test]
fn test_shock_collision() {
    let table = ideal_gas_table();
    let solution = solve_x(
        &table,
        (5.99924, 19.5975, 460.894),
        (5.99242, -6.19633, 46.0950),
    );

    // shock - contact - shock
    assert_star_state(&solution, 1691.64, 8.68975, 14.2823, 31.0426, 5e-2);
    // both shocks compress
    assert!(solution.star_left.density() > 5.99924);
    assert!(solution.star_right.density() > 5.99242);
}

#[test]
fn test_stationary_contact_from_boosted_blast() {
    // the strong blast wave in the frame moving with its contact: u* = 0, so
    // the contact sits exactly on x/t = 0
    let table = ideal_gas_table();
    let solution = solve_x(&table, (1., -19.5975, 1000.), (1., -19.5975, 0.01));

    assert_approx_eq!(f64, solution.star_left.pressure(), 460.894, epsilon = 1e-2);
    assert_approx_eq!(
        f64,
        solution.star_left.normal_velocity(0),
        0.,
        epsilon = 1e-4
    );
    assert_approx_eq!(f64, solution.star_left.density(), 0.57506, epsilon = 1e-4);
    assert_approx_eq!(f64, solution.star_right.density(), 5.99924, epsilon = 1e-3);

    // with the contact at rest the sampled state is a star state on either
    // side of it
    assert_approx_eq!(f64, solution.state.pressure(), 460.894, epsilon = 1e-2);
    assert_approx_eq!(f64, solution.state.normal_velocity(0), 0., epsilon = 1e-4);
}

#[test]
fn test_transonic_rarefaction_fan() {
    // Sod boosted just past the sonic point of its left fan: the fan head
    // moves left, the tail moves right, and x/t = 0 samples the interior
    let table = ideal_gas_table();
    let solution = solve_x(&table, (1., 0.1, 1.), (0.125, 0.1, 0.1));

    assert!(solution.transonic);

    // the sample lies strictly inside the fan
    let state = &solution.state;
    assert!(state.pressure() < 1. && state.pressure() > solution.star_left.pressure());
    assert!(state.density() < 1. && state.density() > solution.star_left.density());

    // on the sonic line u = c
    let c = (GAMMA * state.pressure() / state.density()).sqrt();
    assert_approx_eq!(f64, state.normal_velocity(0), c, epsilon = 1e-3);
}

#[test]
fn test_idempotence_for_identical_states() {
    let table = ideal_gas_table();
    let solver = ExactRiemannSolver::new(RiemannSolverConfig::default(), &table);
    let state = Primitive::new(0.75, DVec3::new(0.4, -1.2, 2.5), 0.8);

    let solution = solver.solve(0, &state, 0, &state, 0).unwrap();

    assert_eq!(solution.state.to_array(), state.to_array());
    assert_eq!(solution.star_left.to_array(), state.to_array());
    assert_eq!(solution.star_right.to_array(), state.to_array());
    assert_eq!(solution.id, 0);
    assert!(!solution.approximate);
}

#[test]
fn test_left_right_symmetry() {
    let table = ideal_gas_table();
    let forward = solve_x(&table, (1., 0., 1.), (0.125, 0., 0.1));
    // swap the states and negate the normal velocities
    let mirrored = solve_x(&table, (0.125, 0., 0.1), (1., 0., 1.));

    assert_approx_eq!(
        f64,
        forward.state.density(),
        mirrored.state.density(),
        epsilon = 1e-10
    );
    assert_approx_eq!(
        f64,
        forward.state.pressure(),
        mirrored.state.pressure(),
        epsilon = 1e-10
    );
    assert_approx_eq!(
        f64,
        forward.state.normal_velocity(0),
        -mirrored.state.normal_velocity(0),
        epsilon = 1e-10
    );
    assert_approx_eq!(
        f64,
        forward.star_left.density(),
        mirrored.star_right.density(),
        epsilon = 1e-10
    );
}

#[test]
fn test_contact_consistency_and_tangential_passthrough() {
    // normal along y; x and z velocities are tangential and must pass
    // through untouched
    let table = ideal_gas_table();
    let solver = ExactRiemannSolver::new(RiemannSolverConfig::default(), &table);
    let left = Primitive::new(1., DVec3::new(1.5, 0., -0.3), 1.);
    let right = Primitive::new(0.125, DVec3::new(-2.5, 0., 0.7), 0.1);

    let solution = solver.solve(1, &left, 0, &right, 0).unwrap();

    // the two star states share normal velocity and pressure; only density
    // and material may jump across the contact
    assert_eq!(
        solution.star_left.normal_velocity(1),
        solution.star_right.normal_velocity(1)
    );
    assert_eq!(solution.star_left.pressure(), solution.star_right.pressure());

    // tangential passthrough
    assert_eq!(solution.star_left.velocity().x, 1.5);
    assert_eq!(solution.star_left.velocity().z, -0.3);
    assert_eq!(solution.star_right.velocity().x, -2.5);
    assert_eq!(solution.star_right.velocity().z, 0.7);

    // u* > 0, so the interface state upwinds the left tangentials
    assert!(solution.star_left.normal_velocity(1) > 0.);
    assert_eq!(solution.state.velocity().x, 1.5);
    assert_eq!(solution.state.velocity().z, -0.3);
    assert_eq!(solution.id, 0);
}

#[test]
fn test_two_materials_across_the_contact() {
    // ideal gas expanding against a stiffened liquid-like material
    let table = MaterialTable::new(vec![
        Box::new(StiffenedGas::ideal(1.4)),
        Box::new(StiffenedGas::new(2.0, 1.0)),
    ]);
    let solver = ExactRiemannSolver::new(RiemannSolverConfig::default(), &table);
    let left = Primitive::new(1., DVec3::ZERO, 2.);
    let right = Primitive::new(2., DVec3::ZERO, 1.);

    let solution = solver.solve(0, &left, 0, &right, 1).unwrap();

    let p_star = solution.star_left.pressure();
    let u_star = solution.star_left.normal_velocity(0);
    assert_eq!(p_star, solution.star_right.pressure());
    assert_eq!(u_star, solution.star_right.normal_velocity(0));
    // the pressure jump drives the contact to the right, into the heavier
    // material
    assert!(u_star > 0.);
    assert!(p_star > 1. && p_star < 2.);
    // left wave is a rarefaction, right wave is a shock
    assert!(solution.star_left.density() < 1.);
    assert!(solution.star_right.density() > 2.);
    // material id at the interface follows the contact
    assert_eq!(solution.id, 0);
    assert!(!solution.approximate);
}

#[test]
fn test_wave_profile_brackets_the_waves() {
    let table = ideal_gas_table();
    let solver = ExactRiemannSolver::new(RiemannSolverConfig::default(), &table);
    let left = Primitive::new(1., DVec3::ZERO, 1.);
    let right = Primitive::new(0.125, DVec3::ZERO, 0.1);

    let solution = solver.solve_with_profile(0, &left, 0, &right, 0).unwrap();
    let profile = solution.profile.expect("profile was requested");
    let rows = profile.rows();
    assert!(rows.len() > 4);

    // sorted by xi
    assert!(rows.windows(2).all(|w| w[0].xi <= w[1].xi));

    // sentinel rows replicate the outer states beyond the outermost waves
    let first = rows.first().unwrap();
    let last = rows.last().unwrap();
    assert_eq!(first.density, 1.);
    assert_eq!(last.density, 0.125);
    // the head of the left rarefaction moves at -c_l
    let c_l = (GAMMA * 1. / 1.0_f64).sqrt();
    assert!(rows[1].xi <= -c_l + 1e-8);
    // the right shock is supersonic with respect to the pre-shock gas
    assert!(rows[rows.len() - 2].xi > 0.);
}

#[test]
fn test_solutions_without_profile_carry_none() {
    let table = ideal_gas_table();
    let solution = solve_x(&table, (1., 0., 1.), (0.125, 0., 0.1));
    assert!(solution.profile.is_none());
}

use std::{
    error::Error,
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use glam::DVec3;
use yaml_rust::{Yaml, YamlLoader};

use exact_riemann::{
    ConfigError, ExactRiemannSolver, MaterialTable, Primitive, RiemannSolverConfig, StarRelations,
};

#[derive(Parser)]
pub struct Cli {
    /// The path to the config file to read
    #[clap(parse(from_os_str))]
    pub config: PathBuf,
    /// Lower bound of the star-relations pressure sweep
    #[clap(long)]
    pub pmin: Option<f64>,
    /// Upper bound of the star-relations pressure sweep
    #[clap(long)]
    pub pmax: Option<f64>,
    /// Pressure step of the star-relations sweep
    #[clap(long)]
    pub dp: Option<f64>,
}

fn parse_dvec3(yaml: &Yaml) -> Result<DVec3, ConfigError> {
    let arr = yaml
        .as_vec()
        .ok_or_else(|| ConfigError::InvalidArrayFormat(yaml.clone()))?;
    if arr.len() != 3 {
        return Err(ConfigError::InvalidArrayFormat(yaml.clone()));
    }
    let mut values = [0.; 3];
    for (value, y) in values.iter_mut().zip(arr) {
        *value = match y {
            Yaml::Real(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidArrayFormat(yaml.clone()))?,
            Yaml::Integer(i) => *i as f64,
            _ => return Err(ConfigError::InvalidArrayFormat(yaml.clone())),
        };
    }
    Ok(DVec3::from_array(values))
}

struct StateCfg {
    state: Primitive,
    id: usize,
}

impl StateCfg {
    fn parse(yaml: &Yaml, side: &str, material_count: usize) -> Result<Self, ConfigError> {
        let density = yaml["density"]
            .as_f64()
            .ok_or_else(|| ConfigError::MissingParameter(format!("problem: {}: density", side)))?;
        let pressure = yaml["pressure"]
            .as_f64()
            .ok_or_else(|| ConfigError::MissingParameter(format!("problem: {}: pressure", side)))?;
        let velocity = if yaml["velocity"].is_badvalue() {
            DVec3::ZERO
        } else {
            parse_dvec3(&yaml["velocity"])?
        };
        let id = yaml["material_id"].as_i64().unwrap_or(0) as usize;
        if id >= material_count {
            return Err(ConfigError::InvalidMaterialId(id, material_count));
        }
        Ok(Self {
            state: Primitive::new(density, velocity, pressure),
            id,
        })
    }
}

struct ProblemCfg {
    direction: usize,
    left: StateCfg,
    right: StateCfg,
}

impl ProblemCfg {
    fn parse(yaml: &Yaml, material_count: usize) -> Result<Self, ConfigError> {
        let direction = yaml["direction"].as_i64().unwrap_or(0);
        if !(0..3).contains(&direction) {
            return Err(ConfigError::IllegalDirection(direction));
        }
        Ok(Self {
            direction: direction as usize,
            left: StateCfg::parse(&yaml["left"], "left", material_count)?,
            right: StateCfg::parse(&yaml["right"], "right", material_count)?,
        })
    }
}

struct OutputCfg {
    solution_file: Option<String>,
}

impl OutputCfg {
    fn parse(yaml: &Yaml) -> Self {
        Self {
            solution_file: yaml["solution_file"].as_str().map(str::to_string),
        }
    }
}

struct Config {
    materials: MaterialTable,
    solver: RiemannSolverConfig,
    problem: ProblemCfg,
    output: OutputCfg,
}

impl Config {
    fn parse(file: PathBuf) -> Result<Self, Box<dyn Error>> {
        let docs = YamlLoader::load_from_str(&fs::read_to_string(file)?)?;
        let config_yml = &docs[0];

        let materials = MaterialTable::init(&config_yml["materials"])?;
        let problem = ProblemCfg::parse(&config_yml["problem"], materials.len())?;
        Ok(Self {
            solver: RiemannSolverConfig::init(&config_yml["exact_riemann"]),
            problem,
            output: OutputCfg::parse(&config_yml["output"]),
            materials,
        })
    }
}

fn write_star_relations(config: &Config, relations: &StarRelations) -> Result<(), Box<dyn Error>> {
    for (path, rows) in [
        ("LeftStarState.txt", &relations.left),
        ("RightStarState.txt", &relations.right),
    ] {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "## One-dimensional Riemann problem.")?;
        writeln!(
            out,
            "## Initial state: {:?} (material {}) | {:?} (material {})",
            config.problem.left.state.to_array(),
            config.problem.left.id,
            config.problem.right.state.to_array(),
            config.problem.right.id
        )?;
        StarRelations::write_side(rows, &mut out)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // parse command line parameters
    let args = Cli::parse();

    // read configuration
    let config = Config::parse(args.config)?;
    let solver = ExactRiemannSolver::new(config.solver, &config.materials);

    let problem = &config.problem;
    println!("Solving a one-dimensional Riemann problem...");
    println!(
        "Left  state: {:e} {:e} {:e} (material {})",
        problem.left.state.density(),
        problem.left.state.normal_velocity(problem.direction),
        problem.left.state.pressure(),
        problem.left.id
    );
    println!(
        "Right state: {:e} {:e} {:e} (material {})",
        problem.right.state.density(),
        problem.right.state.normal_velocity(problem.direction),
        problem.right.state.pressure(),
        problem.right.id
    );

    // optional p*-sweep diagnostic
    if let (Some(pmin), Some(pmax), Some(dp)) = (args.pmin, args.pmax, args.dp) {
        let relations = solver.star_relations(
            problem.direction,
            &problem.left.state,
            problem.left.id,
            &problem.right.state,
            problem.right.id,
            pmin,
            pmax,
            dp,
        )?;
        write_star_relations(&config, &relations)?;
        println!("Printed the star state relations.");
    }

    let solution = if config.output.solution_file.is_some() {
        solver.solve_with_profile(
            problem.direction,
            &problem.left.state,
            problem.left.id,
            &problem.right.state,
            problem.right.id,
        )?
    } else {
        solver.solve(
            problem.direction,
            &problem.left.state,
            problem.left.id,
            &problem.right.state,
            problem.right.id,
        )?
    };

    if let (Some(path), Some(profile)) = (&config.output.solution_file, &solution.profile) {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "## One-dimensional Riemann problem.")?;
        writeln!(
            out,
            "## Initial state: {:?} (material {}) | {:?} (material {})",
            problem.left.state.to_array(),
            problem.left.id,
            problem.right.state.to_array(),
            problem.right.id
        )?;
        profile.write(&mut out, &config.materials)?;
        println!("Wrote the wave profile to {}.", path);
    }

    println!(
        "Interface state (x/t = 0): {:?} (material {})",
        solution.state.to_array(),
        solution.id
    );
    println!("Left  star state: {:?}", solution.star_left.to_array());
    println!("Right star state: {:?}", solution.star_right.to_array());
    if solution.transonic {
        println!("The ray x/t = 0 lies inside a rarefaction fan.");
    }
    if solution.approximate {
        println!("Warning: no pressure bracket was found; this is an approximate solution.");
    }

    Ok(())
}

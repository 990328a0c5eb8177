use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use vm_fluids::{Composition, UnitKind, catalog, parse_quantity};
use vm_mixing::{Component, Mixture, MixturePoint, SolverConfig};

mod case;
mod error;

use case::{Case, VaporKind};
use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "vm-cli")]
#[command(about = "vapormix CLI - steam/incondensable mixture properties", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one point from pressure and enthalpy
    Ph {
        /// Pressure, e.g. "1 bar"
        #[arg(long)]
        pressure: String,
        /// Specific enthalpy, e.g. "2600 kJ/kg"
        #[arg(long)]
        enthalpy: String,
        #[command(flatten)]
        mix: MixArgs,
    },
    /// Evaluate one point from pressure and temperature
    Pt {
        /// Pressure, e.g. "1 bar"
        #[arg(long)]
        pressure: String,
        /// Temperature, e.g. "120 C"
        #[arg(long)]
        temperature: String,
        #[command(flatten)]
        mix: MixArgs,
    },
    /// Run a YAML batch case
    Case {
        /// Path to the case YAML file
        case_path: PathBuf,
    },
}

#[derive(Args)]
struct MixArgs {
    /// Incondensable gas by catalog name (repeatable)
    #[arg(long = "gas")]
    gases: Vec<String>,
    /// Mass fraction of the matching --gas (repeatable); steam takes the rest
    #[arg(long = "fraction")]
    fractions: Vec<String>,
    /// Condensable vapor model
    #[arg(long, value_enum, default_value_t = VaporKind::Coolprop)]
    vapor: VaporKind,
    /// Solver configuration YAML
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ph {
            pressure,
            enthalpy,
            mix,
        } => {
            let p = parse_quantity(&pressure, UnitKind::Pressure)?;
            let h = parse_quantity(&enthalpy, UnitKind::SpecificEnthalpy)?;
            cmd_point(&mix, p, State::Enthalpy(h))
        }
        Commands::Pt {
            pressure,
            temperature,
            mix,
        } => {
            let p = parse_quantity(&pressure, UnitKind::Pressure)?;
            let t = parse_quantity(&temperature, UnitKind::Temperature)?;
            cmd_point(&mix, p, State::Temperature(t))
        }
        Commands::Case { case_path } => cmd_case(&case_path),
    }
}

enum State {
    Enthalpy(f64),
    Temperature(f64),
}

fn build_mixture(mix: &MixArgs) -> CliResult<(Mixture, Composition)> {
    if mix.gases.len() != mix.fractions.len() {
        return Err(CliError::Case(format!(
            "{} gases but {} fractions",
            mix.gases.len(),
            mix.fractions.len()
        )));
    }
    let mut components = vec![mix.vapor.component(None)?];
    let mut fractions = vec![0.0];
    for (name, fraction) in mix.gases.iter().zip(&mix.fractions) {
        components.push(Component::gas(catalog::gas(name)?));
        fractions.push(parse_quantity(fraction, UnitKind::Fraction)?);
    }
    fractions[0] = 1.0 - fractions[1..].iter().sum::<f64>();
    let composition = Composition::new(&fractions)?;

    let mut mixture = Mixture::new(components)?;
    if let Some(path) = &mix.config {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        mixture = mixture.with_config(SolverConfig::from_yaml_str(&text)?)?;
    }
    Ok((mixture, composition))
}

fn cmd_point(mix: &MixArgs, p: f64, state: State) -> CliResult<()> {
    let (mixture, c) = build_mixture(mix)?;
    let h = match state {
        State::Enthalpy(h) => h,
        State::Temperature(t) => mixture.enthalpy_pt(p, t, &c)?.value,
    };
    let point = mixture.evaluate_ph(p, h, &c)?;

    println!("{mixture}");
    println!("status: {}", point.status);
    print_point(&point.value);
    Ok(())
}

fn print_point(point: &MixturePoint) {
    println!(
        "  split: Pv = {:.2} Pa, hv = {:.1} J/kg ({} iterations)",
        point.pv.value, point.hv.value, point.split.iterations
    );
    println!("  T      = {:.3} K", point.t.value);
    println!("  h      = {:.1} J/kg", point.h);
    println!(
        "  rho    = {:.6} kg/m3 (vapor {:.6})",
        point.rho.value, point.rho_v.value
    );
    println!("  cp     = {:.2} J/(kg K)", point.cp.value);
    println!("  lambda = {:.5} W/(m K)", point.lambda.value);
    println!("  mu     = {:.4e} Pa s", point.mu.value);
    println!("  sigma  = {:.5} N/m", point.sigma.value);
    println!(
        "  T_sat  = {:.3} K at P, {:.3} K at Pv",
        point.sat.t, point.sat_v.t
    );
    if point.gas_count > 0 {
        println!("  dncv   = {:.4e} m2/s", point.dncv.value);
        println!("  mnc    = {:.3} g/mol", point.mnc.value);
    }
}

fn cmd_case(case_path: &Path) -> CliResult<()> {
    let case = Case::load(case_path)?;
    let mixture = case.mixture()?;
    println!(
        "Case: {} ({})",
        case.name.as_deref().unwrap_or("unnamed"),
        mixture
    );
    let report = case.run(&mixture)?;

    let header: Vec<String> = report.columns.iter().map(|c| format!("{c:>16}")).collect();
    println!("{:>6}{} {:>16}", "point", header.join(""), "status");
    for (i, (row, status)) in report.rows.iter().zip(&report.statuses).enumerate() {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:>16.6e}")).collect();
        println!("{i:>6}{} {status:>16}", cells.join(""));
    }
    Ok(())
}

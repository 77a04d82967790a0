use anyhow::{bail, Context};
use clap::Parser;

use netsynth::compiler::synthesize;
use netsynth::generator::{self, Template};
use netsynth::ir::context::SynthesisContext;
use netsynth::ir::transform::substitute::{parse_assignment, Substitution};
use netsynth::models::{self, CIRCUITS};
use netsynth::solver::GaussJordan;

#[derive(Parser, Debug)]
#[command(version, about = "Circuit equation synthesizer", long_about = None)]
struct Args {
    /// Built-in circuit to synthesize
    #[arg(name = "CIRCUIT", required_unless_present = "list")]
    circuit: Option<String>,

    /// Simulation timestep, 0 keeps it symbolic
    #[arg(short = 'd', long, default_value_t = 0.0)]
    timestep: f64,

    /// Substitutes a parameter before solving, as name=value
    #[arg(short, long = "set", value_parser = parse_assignment)]
    set: Vec<(String, f64)>,

    /// Renders a template: class, dense, sparse or a template file
    #[arg(short, long)]
    template: Option<Template>,

    /// Class name used by the templates
    #[arg(short, long, default_value = "Model")]
    class_name: String,

    /// Prints the system and its solution as JSON
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// Lists the built-in circuits
    #[arg(short, long, default_value_t = false)]
    list: bool,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    netsynth::init_logger_with(if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });

    if args.list {
        for circuit in CIRCUITS {
            println!("{:<12} {}", circuit.name, circuit.description);
        }
        return Ok(());
    }

    let name = args.circuit.unwrap_or_default();
    let Some(circuit) = models::find(&name) else {
        bail!("unknown circuit '{}', try --list", name);
    };

    let mut ctx = SynthesisContext::with_timestep(args.timestep)?;
    let system = synthesize(&mut ctx, circuit);
    let balance = system.check_balance();
    let substitution = Substitution::from_assignments(&ctx, &args.set)?;
    let solved = system
        .solve(&GaussJordan::new(), &substitution)
        .with_context(|| format!("failed to solve '{}'", circuit.name))?;

    if args.json {
        let report = serde_json::json!({
            "circuit": circuit.name,
            "system": &system,
            "balance": &balance,
            "solution": &solved,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.template.is_none() {
        let bar = "=".repeat(40);
        println!("{}", system);
        println!("{}", balance);
        println!("{}", bar);
        println!("{}", solved);
    }

    if let Some(template) = &args.template {
        let txt = generator::generate(&system, &solved, &substitution, template, &args.class_name)?;
        println!("{txt:}");
    }

    Ok(())
}

//! Headless Arbiter Simulator
//!
//! Runs a scripted timeline against a manager configuration and prints the session summary.

use behavior_arbiter::core::config::ManagerConfig;
use behavior_arbiter::sim::{run_script, Script, SimOptions, SimReport};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Headless Arbiter Simulator - replay events against a behavior configuration
#[derive(Parser, Debug)]
#[command(name = "arbiter_sim")]
#[command(about = "Drive the behavior manager through a scripted timeline")]
struct Args {
    /// Manager configuration (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Timeline of events, messages and state changes (TOML)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.1)]
    tick_secs: f64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        "behavior_arbiter=debug"
    } else {
        "behavior_arbiter=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(report) => {
            print_report(&report, &args.format);
            if report.errors.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> behavior_arbiter::Result<SimReport> {
    let config = ManagerConfig::load(&args.config)?;
    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };

    let options = SimOptions {
        ticks: args.ticks,
        tick_secs: args.tick_secs,
    };
    run_script(&config, &script, options)
}

fn print_report(report: &SimReport, format: &str) {
    match format {
        "text" => {
            println!("Arbiter Simulation");
            println!("==================");
            println!("Session: {}", report.session.session_id);
            println!("Ticks: {}", report.ticks);
            println!(
                "Final: {} (chooser: {})",
                report.final_behavior,
                report.final_chooser.as_deref().unwrap_or("none")
            );
            println!("Reactions fired: {}", report.session.reactions_fired);
            println!();
            println!("Transitions:");
            for t in &report.transitions {
                println!("  {:>8.2}s  {}", t.at, t);
            }
            if !report.session.activities.is_empty() {
                println!();
                println!("Activities:");
                for a in &report.session.activities {
                    println!(
                        "  {} -> {:?} ({} objectives, {:.1}s)",
                        a.activity, a.outcome, a.objectives_completed, a.elapsed_secs
                    );
                }
            }
            for e in &report.errors {
                println!("Error: {}", e);
            }
        }
        _ => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: failed to serialize report: {}", e),
        },
    }
}

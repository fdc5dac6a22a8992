use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

use fixed_matrix_cli::demo::{load_demo_config, run_demo, DemoConfig};

fn main() -> Result<()> {
    let matches = Command::new("fixmat")
        .version(clap::crate_version!())
        .about("Fixed-shape matrix value type: demonstration driver")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand(
            Command::new("demo")
                .about("Construct, edit, combine and compare matrices, printing each step")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON demo configuration. Defaults are used when omitted.")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("summary")
                        .long("summary")
                        .action(ArgAction::SetTrue)
                        .help("Print a JSON summary of the run after the trace"),
                ),
        )
        .subcommand(
            Command::new("template").about("Print the default demo configuration as JSON"),
        )
        .get_matches();

    let mut logger = env_logger::Builder::default();
    logger
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("FIXMAT_LOG", "error,fixmat=info"));
    // -v overrides the global level; per-module directives from FIXMAT_LOG stay.
    match matches.get_count("verbose") {
        0 => {}
        1 => {
            logger.filter_level(LevelFilter::Info);
        }
        2 => {
            logger.filter_level(LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(LevelFilter::Trace);
        }
    }
    logger.init();

    match matches.subcommand() {
        Some(("demo", demo_matches)) => handle_demo(demo_matches),
        Some(("template", _)) => {
            println!("{}", serde_json::to_string_pretty(&DemoConfig::default())?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_demo(matches: &ArgMatches) -> Result<()> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            log::info!("Using config: {:?}", path);
            load_demo_config(path)?
        }
        None => {
            log::info!("No config provided; using defaults.");
            DemoConfig::default()
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = run_demo(&config, &mut out)?;
    if matches.get_flag("summary") {
        writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(())
}

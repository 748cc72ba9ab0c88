//! ledctl: set a solid colour on I2C-attached RGB LED controller banks.

use std::path::PathBuf;

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "ledctl",
    version,
    about = "Set a solid colour on I2C-attached RGB LED controller banks"
)]
struct Args {
    /// Colour to set: red, blue or black (case-insensitive)
    #[arg(value_name = "COLOUR", value_parser = cli::parse_color_arg)]
    color: cli::ColorArg,

    /// Enable debug logging (register values, raw bus transactions)
    #[arg(short, long)]
    verbose: bool,

    /// Adapter device pattern, e.g. "/dev/i2c-*" (overrides the config file)
    #[arg(long, value_name = "GLOB")]
    adapters: Option<String>,

    /// Config file (default: <config dir>/ledctl/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let opts = cli::RunOptions {
        color: args.color,
        adapters: args.adapters,
        config: args.config,
        json: args.json,
    };

    if let Err(e) = cli::run(opts) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

//! Command flow: config, adapter discovery, colour apply, console report.

mod report;

use std::path::PathBuf;

use serde::Serialize;

use ledctl_lib::apply::{self, ApplyReport};
use ledctl_lib::bus;
use ledctl_lib::config::Config;
use ledctl_lib::discovery;
use ledctl_lib::error::Result;
use ledctl_lib::led::{self, Rbg};

/// A colour argument as typed and as resolved.
#[derive(Debug, Clone)]
pub struct ColorArg {
    pub name: String,
    pub rbg: Rbg,
}

/// clap value parser for the colour positional.
pub fn parse_color_arg(s: &str) -> std::result::Result<ColorArg, String> {
    led::parse_color(s)
        .map(|rbg| ColorArg {
            name: s.trim().to_string(),
            rbg,
        })
        .map_err(|e| e.to_string())
}

pub struct RunOptions {
    pub color: ColorArg,
    pub adapters: Option<String>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

// ── JSON output ──

#[derive(Serialize)]
pub(super) struct RunOutput<'a> {
    pub version: &'static str,
    pub color_name: &'a str,
    pub banks_present: usize,
    pub leds_set: usize,
    #[serde(flatten)]
    pub report: &'a ApplyReport,
}

impl<'a> RunOutput<'a> {
    fn new(color_name: &'a str, report: &'a ApplyReport) -> Self {
        RunOutput {
            version: env!("CARGO_PKG_VERSION"),
            color_name,
            banks_present: report.banks_present(),
            leds_set: report.leds_set(),
            report,
        }
    }
}

fn load_config(opts: &RunOptions) -> Result<Config> {
    let (mut config, warnings) = match opts.config {
        Some(ref path) => Config::load_from(path),
        None => Config::load_with_warnings(),
    };
    for w in &warnings {
        log::warn!("{w}");
    }
    if let Some(ref pattern) = opts.adapters {
        config.adapter_glob = pattern.clone();
    }
    config.validate()?;
    Ok(config)
}

pub fn run(opts: RunOptions) -> Result<()> {
    let config = load_config(&opts)?;
    log::debug!("config: {config:?}");

    let selected = discovery::discover(
        &config.adapter_glob,
        config.probe_address,
        bus::open_adapter,
    )?;
    if !opts.json {
        println!(
            "Using adapter: {} (found device at 0x{:02x})",
            selected.path.display(),
            config.probe_address
        );
    }
    log::debug!(
        "{}: functionality {}",
        selected.path.display(),
        selected.functionality
    );

    let color = opts.color.rbg;
    let report = apply::apply_color_with(
        &selected.adapter,
        selected.functionality,
        &config.bank_addresses,
        color,
        |event| {
            if !opts.json {
                report::print_event(event, &opts.color.name, color);
            }
        },
    );

    if opts.json {
        match serde_json::to_string_pretty(&RunOutput::new(&opts.color.name, &report)) {
            Ok(s) => println!("{s}"),
            Err(e) => log::error!("serializing report: {e}"),
        }
    }

    Ok(())
}

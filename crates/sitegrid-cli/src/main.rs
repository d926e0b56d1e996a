// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod export;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use runtime::{ExportTarget, SiteRuntime};
use sitegrid_app::AppState;
use sitegrid_testkit::DemoData;
use sitegrid_tui::ViewOptions;
use std::env;
use std::path::PathBuf;
use time::{Date, OffsetDateTime};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `sitegrid --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let view_options = ViewOptions {
        status_timeout: config.status_timeout()?,
    };
    let export = ExportTarget {
        dir: config.export_dir()?,
        format: config.export_format(),
    };
    let log_file = config.log_file()?;
    logging::env_filter(config.log_level())?;
    if options.check_only {
        return Ok(());
    }

    logging::init(&log_file, config.log_level())?;
    let data = if options.empty {
        DemoData::empty()
    } else {
        DemoData::seeded()
    };
    let mut runtime = SiteRuntime::new(data, export, today)?;
    tracing::info!(
        config = %options.config_path.display(),
        empty = options.empty,
        "sitegrid starting"
    );

    let mut state = AppState {
        active_page: config.start_page(),
        ..AppState::default()
    };
    sitegrid_tui::run_app(&mut state, &mut runtime, view_options)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    empty: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        empty: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--empty" => {
                options.empty = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("sitegrid: construction site records in the terminal");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --empty                  Start with no records instead of the sample site");
    println!("  --check                  Validate config and exit");
    println!("  --help                   Show this help");
}

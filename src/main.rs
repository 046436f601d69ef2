//! Stegaudio CLI
//!
//! Command-line interface for hiding audio clips inside images.

use anyhow::Context;
use clap::Parser;
use env_logger::{Env, DEFAULT_FILTER_ENV};
use log::{debug, LevelFilter};

use stegaudio::cli::{commands, Cli, Commands};
use stegaudio::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger before configuration loads. The filter stays open
    // and the max level narrows it once `log_level` is known.
    let rust_log_set = std::env::var_os(DEFAULT_FILTER_ENV).is_some();
    env_logger::Builder::from_env(Env::default().default_filter_or("trace")).init();
    if let Some(level) = startup_level(cli.verbose, rust_log_set) {
        log::set_max_level(level);
    }

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = configured_level(cli.verbose, rust_log_set, &config) {
        log::set_max_level(level);
    }

    debug!("Stegaudio v{}", env!("CARGO_PKG_VERSION"));

    handle_command(&config, cli.command)
}

/// Level used while configuration loads; `None` leaves `RUST_LOG` in charge
fn startup_level(verbose: bool, rust_log_set: bool) -> Option<LevelFilter> {
    match (rust_log_set, verbose) {
        (true, _) => None,
        (false, true) => Some(LevelFilter::Debug),
        (false, false) => Some(LevelFilter::Info),
    }
}

/// Level applied once configuration is known
fn configured_level(verbose: bool, rust_log_set: bool, config: &Config) -> Option<LevelFilter> {
    (!verbose && !rust_log_set).then(|| config.log_filter())
}

fn handle_command(config: &Config, cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Embed {
            cover,
            audio,
            output,
            id,
            report,
        } => commands::embed(
            config,
            &cover,
            &audio,
            output.as_deref(),
            id,
            report.as_deref(),
        )
        .with_context(|| format!("embedding {} into {}", audio.display(), cover.display())),
        Commands::Extract {
            image,
            output,
            report,
        } => commands::extract(config, &image, output.as_deref(), report.as_deref())
            .with_context(|| format!("extracting audio from {}", image.display())),
        Commands::Capacity { image, audio } => {
            commands::capacity(config, &image, audio.as_deref())
                .with_context(|| format!("measuring capacity of {}", image.display()))
        }
        Commands::Quality { cover, stego } => commands::quality(&cover, &stego)
            .with_context(|| format!("comparing {} with {}", cover.display(), stego.display())),
        Commands::Inspect { image } => commands::inspect(config, &image)
            .with_context(|| format!("inspecting {}", image.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_level() {
        assert_eq!(startup_level(false, false), Some(LevelFilter::Info));
        assert_eq!(startup_level(true, false), Some(LevelFilter::Debug));
        assert_eq!(startup_level(true, true), None);
    }

    #[test]
    fn test_configured_level() {
        let config = Config {
            log_level: "error".to_string(),
            ..Config::default()
        };
        assert_eq!(
            configured_level(false, false, &config),
            Some(LevelFilter::Error)
        );
        assert_eq!(configured_level(true, false, &config), None);
        assert_eq!(configured_level(false, true, &config), None);
    }
}

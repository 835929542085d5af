use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "backdrop",
    author,
    version,
    about = "Pointer-reactive GPU backdrop preview",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Settings file to load instead of `backdrop.toml` in the config directory.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Preview window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Use the reduced-motion frame rate and intensity.
    #[arg(long)]
    pub reduced_motion: bool,

    /// Override the motion intensity (0.0 - 1.0).
    #[arg(long, value_name = "FLOAT")]
    pub intensity: Option<f32>,

    /// Skip GPU acquisition and show the fallback state.
    #[arg(long)]
    pub force_fallback: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective settings as TOML.
    Settings,
    /// Request a GPU adapter and describe it.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug, Default)]
pub struct ProbeArgs {
    /// Emit the adapter profile as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_preview_flags() {
        let cli = Cli::parse_from([
            "backdrop",
            "--size",
            "640x360",
            "--reduced-motion",
            "--intensity",
            "0.5",
            "--force-fallback",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.run.size.as_deref(), Some("640x360"));
        assert!(cli.run.reduced_motion);
        assert_eq!(cli.run.intensity, Some(0.5));
        assert!(cli.run.force_fallback);
    }

    #[test]
    fn config_flag_applies_to_subcommands() {
        let cli = Cli::parse_from(["backdrop", "settings", "--config", "custom.toml"]);
        assert!(matches!(cli.command, Some(Command::Settings)));
        assert_eq!(cli.run.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn probe_accepts_json_flag() {
        let cli = Cli::parse_from(["backdrop", "probe", "--json"]);
        match cli.command {
            Some(Command::Probe(args)) => assert!(args.json),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

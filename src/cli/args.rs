//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Build static assets and serve pages
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Developer mode: reload templates on each page load, serve
    /// non-minified JS/CSS and rebuild on change
    #[arg(long)]
    pub dev: bool,

    /// Build the static assets, then exit
    #[arg(long)]
    pub build: bool,

    /// Source directory for static assets (default: src)
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub src: Option<PathBuf>,

    /// Host address for the server (default: localhost:8080)
    #[arg(long)]
    pub host: Option<String>,

    /// Config file path, searched upward from the working directory
    #[arg(short = 'C', long, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

impl Cli {
    /// Whether the asset build runs at all.
    pub const fn runs_build(&self) -> bool {
        self.dev || self.build
    }

    /// Whether the HTTP server starts after the build.
    pub const fn serves(&self) -> bool {
        !self.build
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag_is_distinct_from_verbose() {
        let err = Cli::try_parse_from(["kiln", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(parse(&["--verbose"]).verbose);
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kiln").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(!cli.dev && !cli.build);
        assert_eq!(cli.src, None);
        assert_eq!(cli.host, None);
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
        assert!(!cli.runs_build());
        assert!(cli.serves());
    }

    #[test]
    fn test_flags() {
        let cli = parse(&["--dev", "--src", "web", "--host", "0.0.0.0:9000", "-v"]);
        assert!(cli.dev);
        assert!(cli.verbose);
        assert_eq!(cli.src, Some(PathBuf::from("web")));
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0:9000"));
        assert!(cli.runs_build());
        assert!(cli.serves());
    }

    #[test]
    fn test_build_only() {
        let cli = parse(&["--build"]);
        assert!(cli.runs_build());
        assert!(!cli.serves());
    }
}

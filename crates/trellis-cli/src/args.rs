use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Render a Trellis diagram to SVG.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Diagram source file
    pub input: PathBuf,

    /// SVG file to write; defaults to the input path with an `.svg` extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML file holding global directives, searched for when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// One of off, error, warn, info, debug, trace
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

impl Args {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("svg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_defaults_next_to_input() {
        let args = Args::parse_from(["trellis", "docs/order.nomnoml"]);
        assert_eq!(args.output_path(), PathBuf::from("docs/order.svg"));
        assert_eq!(args.log_level, LevelFilter::Info);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_explicit_flags() {
        let args = Args::parse_from([
            "trellis",
            "a.nomnoml",
            "-o",
            "b.svg",
            "-c",
            "globals.toml",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.output_path(), PathBuf::from("b.svg"));
        assert_eq!(args.config, Some(PathBuf::from("globals.toml")));
        assert_eq!(args.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        assert!(Args::try_parse_from(["trellis", "a.nomnoml", "--log-level", "loud"]).is_err());
    }
}

//! Library half of the `trellis` binary: read one diagram, render it with
//! the global directives from the configuration file, write the SVG.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use trellis::{DiagramBuilder, TrellisError};

/// Renders `args.input` into the output path.
///
/// # Errors
///
/// Fails on I/O, on an unreadable configuration file and on a diagram that
/// does not parse. Nothing is written in any of those cases.
pub fn run(args: &Args) -> Result<(), TrellisError> {
    let output = args.output_path();
    info!(
        input = args.input.display().to_string(),
        output = output.display().to_string();
        "Rendering diagram"
    );

    let app_config = config::load_config(args.config.as_deref())?;
    let source = fs::read_to_string(&args.input)?;

    let svg = DiagramBuilder::new(app_config).render(&source)?;
    fs::write(&output, svg)?;

    info!(output = output.display().to_string(); "SVG written");
    Ok(())
}

use std::process;

use clap::Parser;
use log::{debug, info};
use miette::GraphicalReportHandler;

use trellis_cli::{Args, error_adapter::to_reports};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(args.log_level)
        .init();
    debug!(args:?; "Parsed arguments");

    let Err(err) = trellis_cli::run(&args) else {
        info!("Done");
        return;
    };

    let handler = GraphicalReportHandler::new();
    for report in to_reports(&err) {
        let mut rendered = String::new();
        handler
            .render_report(&mut rendered, &*report)
            .expect("rendering into a String cannot fail");
        eprintln!("{rendered}");
    }
    process::exit(1);
}

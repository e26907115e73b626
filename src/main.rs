use std::io;

use clap::Parser;
use symptom_intake_lib::archive::JsonFileArchive;
use symptom_intake_lib::cli::{run_session, Cli, TerminalRenderer};
use symptom_intake_lib::intake::IntakeEngine;
use symptom_intake_lib::{config, init_tracing};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.settings()?;
    init_tracing(&settings.log_filter);

    tracing::info!(
        data_dir = %settings.data_dir.display(),
        "{} v{} starting",
        config::APP_NAME,
        config::APP_VERSION
    );

    let renderer = TerminalRenderer::new(io::stdout(), settings.typing_delay);
    let archive = JsonFileArchive::new(&settings.data_dir);
    let mut engine = IntakeEngine::new(renderer, archive);

    run_session(io::stdin().lock(), &mut engine)?;
    Ok(())
}

use comove::matrix::CorrelationMatrixEngine;
use comove_cli::{
    init_logging,
    loader::{load_roster, load_store},
    settings::Settings,
    writer::{CsvBestMatchSink, write_grid_file},
};
use std::{process, sync::Arc};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_logging();

    let settings = Settings::from_env();
    info!(?settings, "starting comove");

    let identifiers = match load_roster(&settings.roster) {
        Ok(identifiers) if !identifiers.is_empty() => identifiers,
        Ok(_) => {
            error!(roster = %settings.roster.display(), "no stocklist found");
            process::exit(1);
        }
        Err(error) => {
            error!(%error, "failed to load roster");
            process::exit(1);
        }
    };
    info!(identifiers = identifiers.len(), "loaded roster");

    let store = load_store(&settings.data_dir, &identifiers);

    let sink = match CsvBestMatchSink::create(&settings.best_output) {
        Ok(sink) => sink,
        Err(error) => {
            error!(%error, path = %settings.best_output.display(), "failed to create best-match output");
            process::exit(1);
        }
    };

    let engine = Arc::new(CorrelationMatrixEngine::init(identifiers, store, settings.config));

    let grid = match comove::run(engine, sink).await {
        Ok((grid, _sink)) => grid,
        Err(error) => {
            error!(%error, "co-movement run failed");
            process::exit(1);
        }
    };

    if let Err(error) = write_grid_file(&settings.grid_output, &grid) {
        error!(%error, path = %settings.grid_output.display(), "failed to write frequency grid");
        process::exit(1);
    }

    info!(
        grid = %settings.grid_output.display(),
        best = %settings.best_output.display(),
        "comove finished"
    );
}

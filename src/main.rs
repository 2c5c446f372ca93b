use std::process::ExitCode;

use coi_serve::error::ServeError;
use coi_serve::server::{spawn_signal_listener, Server, Shutdown};
use coi_serve::{logger, Config};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(ServeError::MissingAssetDirectory { path }) => {
            logger::log_missing_directory(&path);
            ExitCode::FAILURE
        }
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ServeError> {
    let cfg = Config::load()?;

    // Size the runtime from the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
    }
    logger::log_worker_threads(cfg.server.workers);

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), ServeError> {
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = Server::bind(cfg).await?;
    server.run(shutdown).await
}

//! Headless results inspector.
//!
//! Mounts a results view for one computation against the HTTP backend and
//! writes the resulting control state to stdout as JSON.
//!
//! Usage: `chargeview <COMPUTATION_ID> [OPTIONS.toml]`

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use chargeview::backend::{ComputationId, HttpBackend};
use chargeview::options::Options;
use chargeview::viewer::HeadlessViewer;
use chargeview::{ChargeViewError, ResultsCoordinator, Session};

async fn run(
    computation: ComputationId,
    options: &Options,
) -> Result<(), ChargeViewError> {
    let backend = HttpBackend::new(&options.backend);
    let session = Session::new(computation, HeadlessViewer::new());
    let coordinator =
        ResultsCoordinator::new(session, backend, options.view.clone());

    let outcome = coordinator.mount().await?;
    log::debug!("mount finished: {outcome:?}");

    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &coordinator.state())
        .map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(computation) = args.next() else {
        log::error!("Usage: chargeview <COMPUTATION_ID> [OPTIONS.toml]");
        return ExitCode::FAILURE;
    };

    let options = match args.next() {
        Some(path) => match Options::load(Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Options::default(),
    };

    match run(ComputationId::from(computation), &options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

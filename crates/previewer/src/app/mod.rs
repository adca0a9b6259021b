mod bootstrap;
mod loop_runner;

use std::process::ExitCode;

pub(crate) fn run() -> ExitCode {
    bootstrap::init_tracing();
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            tracing::error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

//! Tutorial demos built on `critter-engine`.
//!
//! Each binary under `src/bin` is one step of the tutorial; they share the
//! apps and geometry defined here.

pub mod apps;
pub mod shapes;

use std::process::ExitCode;

use critter_engine::core::App;
use critter_engine::device::GpuInit;
use critter_engine::error::find_setup_error;
use critter_engine::logging::{init_logging, LoggingConfig, SETUP_TARGET};
use critter_engine::window::{Runtime, RuntimeConfig};
use critter_engine::SetupError;

/// Runs `app` in a window described by `config` and maps the outcome to a
/// process exit code: 0 on a normal close, 255 (`-1`) on failure.
pub fn launch<A>(config: RuntimeConfig, app: A) -> ExitCode
where
    A: App + 'static,
{
    init_logging(LoggingConfig::default());

    let result = Runtime::run(config, GpuInit::default(), app);
    if let Err(err) = &result {
        match find_setup_error(err) {
            Some(setup) => log::error!(target: SETUP_TARGET, "{setup}"),
            None => log::error!(target: SETUP_TARGET, "{err:#}"),
        }
    }

    ExitCode::from(exit_status(&result))
}

/// Process status for a finished run: 0 after a normal close, otherwise
/// `SetupError::EXIT_CODE` however deep the error is wrapped.
pub fn exit_status(result: &anyhow::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(_) => SetupError::EXIT_CODE,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn normal_close_exits_zero() {
        assert_eq!(exit_status(&Ok(())), 0);
    }

    #[test]
    fn setup_error_exits_minus_one() {
        let result: anyhow::Result<()> = Err(SetupError::window("no display").into());
        assert_eq!(exit_status(&result), 255);
    }

    #[test]
    fn wrapped_setup_error_keeps_its_code() {
        let result: anyhow::Result<()> = Err::<(), _>(SetupError::context("no adapter"))
            .context("starting critter")
            .context("launching demo");
        assert_eq!(exit_status(&result), SetupError::EXIT_CODE);
        let err = result.unwrap_err();
        assert_eq!(
            find_setup_error(&err).map(|e| e.subsystem.as_str()),
            Some("gpu")
        );
    }

    #[test]
    fn other_failures_also_exit_minus_one() {
        let result: anyhow::Result<()> = Err(anyhow::anyhow!("event loop terminated"));
        assert_eq!(exit_status(&result), 255);
    }
}

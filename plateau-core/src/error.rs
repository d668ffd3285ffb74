use std::any::Any;
use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a trial callback. Cloneable so outcomes can be copied out of the collector.
pub type TrialError = Arc<dyn Error + Send + Sync + 'static>;

/// Arbitrary value returned by the `assert` and `formalize` hooks.
pub type HookValue = Box<dyn Any + Send + Sync>;

/// What a hook returned. Recorded on the report, never acted upon.
pub type HookResult = Result<HookValue, TrialError>;

/// Errors which stop a run before a report is produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required callback `{0}` is not defined.")]
    MissingCallback(&'static str),

    #[error("No steady-phase outcomes were collected; nothing to summarize.")]
    NoOutcomes,
}

/// Convert any boxable error into a [`TrialError`].
pub fn trial_error<E>(err: E) -> TrialError
where
    E: Into<Box<dyn Error + Send + Sync + 'static>>,
{
    Arc::from(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_error_keeps_message() {
        let err = trial_error("statuscode: 500");
        assert_eq!(err.to_string(), "statuscode: 500");

        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert_eq!(trial_error(io).to_string(), "timed out");
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::MissingCallback("execute").to_string(),
            "Required callback `execute` is not defined."
        );
    }
}

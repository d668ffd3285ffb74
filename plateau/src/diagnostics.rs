//! Progress reporting for running plans.
//!
//! A plan writes human-readable progress lines (phase, percent complete) to a [`Diagnostics`]
//! sink and signals it when a run is aborted by a [`ConfigError`]. None of this output is part
//! of the [`Report`](plateau_core::Report).
use plateau_core::ConfigError;
use std::io::{self, Write};
use std::sync::Mutex;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Side channel for progress output.
pub trait Diagnostics: Send + Sync {
    /// A single progress line, without trailing newline.
    fn log(&self, line: &str);

    /// The run stopped before producing a report.
    fn abort(&self, err: &ConfigError) {
        let _ = err;
    }
}

/// Forwards progress to `tracing`. Used when no other sink is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log(&self, line: &str) {
        info!("{line}");
    }

    fn abort(&self, err: &ConfigError) {
        error!("Plan aborted: {err}");
    }
}

/// Writes `[INFO]: ...` lines to any writer.
///
/// # Example
/// ```no_run
/// use plateau::prelude::*;
///
/// # async fn run() {
/// let report = Plan::new("checkout")
///     .diagnostics(WriterDiagnostics::stderr())
///     .setup(|| async { Ok::<_, TrialError>(()) })
///     .execute(|_| async { Ok::<_, TrialError>(()) })
///     .cleanup(|_| async { Ok::<_, TrialError>(()) })
///     .await;
/// # }
/// ```
pub struct WriterDiagnostics<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterDiagnostics<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, level: &str, line: &str) {
        let Ok(mut writer) = self.writer.lock() else {
            warn!("Diagnostics writer is poisoned.");
            return;
        };

        if let Err(err) = writeln!(writer, "[{level}]: {line}") {
            warn!("Unable to write diagnostics: {err}");
        }
    }
}

impl WriterDiagnostics<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> Diagnostics for WriterDiagnostics<W> {
    fn log(&self, line: &str) {
        self.write_line("INFO", line);
    }

    fn abort(&self, err: &ConfigError) {
        self.write_line("FATAL", &err.to_string());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Keeps every line in memory.
    #[derive(Default)]
    pub(crate) struct CapturingDiagnostics {
        pub lines: Mutex<Vec<String>>,
        pub aborts: Mutex<Vec<String>>,
    }

    impl CapturingDiagnostics {
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        pub fn aborts(&self) -> Vec<String> {
            self.aborts.lock().unwrap().clone()
        }
    }

    impl Diagnostics for CapturingDiagnostics {
        fn log(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }

        fn abort(&self, err: &ConfigError) {
            self.aborts.lock().unwrap().push(err.to_string());
        }
    }

    #[test]
    fn writer_prefixes_lines() {
        let diagnostics = WriterDiagnostics::new(Vec::new());
        diagnostics.log("checkout - Rampup at 10%");
        diagnostics.abort(&ConfigError::MissingCallback("setup"));

        let out = String::from_utf8(diagnostics.into_inner()).unwrap();
        assert_eq!(
            out,
            "[INFO]: checkout - Rampup at 10%\n[FATAL]: Required callback `setup` is not defined.\n"
        );
    }

    #[tracing_test::traced_test]
    #[test]
    fn tracing_forwards_lines() {
        TracingDiagnostics.log("checkout - Test done");
        assert!(logs_contain("checkout - Test done"));
    }
}

#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod diagnostics;
pub mod plan;
pub mod summary;

pub(crate) mod collector;
pub(crate) mod hooks;
pub(crate) mod scheduler;
pub(crate) mod trial;

pub use diagnostics::{Diagnostics, TracingDiagnostics, WriterDiagnostics};
pub use plan::Plan;

#[doc(hidden)]
pub use plateau_core as core;

pub mod prelude {
    pub use crate::diagnostics::{Diagnostics, TracingDiagnostics, WriterDiagnostics};
    pub use crate::plan::Plan;

    pub use plateau_core::{ConfigError, Outcome, RampProfile, Report, TrialError};
}

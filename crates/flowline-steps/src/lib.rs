//! Flowline Step Library
//!
//! Shared step implementations for workflow runs.
//!
//! This crate provides:
//! - The run context threaded through a workflow's steps
//! - Placeholder template resolution against runtime data
//! - Typed step configurations with one executor per step kind
//! - Collaborator interfaces (completion service, notifier, HTTP caller)
//!   with HTTP-backed implementations

pub mod collab;
pub mod context;
pub mod error;
pub mod executor;
pub mod result;
pub mod step;
pub mod template;

pub use context::RunContext;
pub use error::{CollabError, StepError};
pub use executor::StepRunner;
pub use result::StepResult;
pub use step::{Step, StepAction};
pub use template::TemplateResolver;

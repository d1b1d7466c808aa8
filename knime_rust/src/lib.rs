//! Thin handle on the KNIME analytics platform: locating an installation,
//! running a workflow in batch mode and installing the platform itself.

pub mod archive;
pub mod error;
pub mod install;
pub mod knime;
pub mod preference;

pub use crate::error::KnimeError;
pub use crate::knime::{Invocation, Knime, VariableKind, WorkflowVariable};
pub use crate::preference::Preference;

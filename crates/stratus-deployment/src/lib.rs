//! Stratus deployment creation
//!
//! Request assembly for `stratus deployment create`: memory size parsing,
//! node topology fragments, template defaulting, payload building and the
//! create/track pipeline around an idempotent create call.
//!
//! ```text
//! flags ──► size / topology / template ──► payload ──┐
//!                                                    ├──► create ──► print | submit ──► track
//! --file ──► read_definition ────────────────────────┘
//! ```

pub mod create;
pub mod error;
pub mod payload;
pub mod size;
pub mod template;
pub mod topology;

#[cfg(test)]
mod testing;

// Re-exports
pub use create::{
    CREATE_FAILURE_MESSAGE, CreateContext, CreateInput, CreateOptions, Formatter, TrackParams,
    Tracker, create, request_id,
};
pub use error::{DeploymentError, Result};
pub use payload::{BuildParams, InstanceSpec, build_payload, read_definition};
pub use template::default_template;
pub use topology::NodeTopology;

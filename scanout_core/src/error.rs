// Copyright 2026 the Scanout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy.
//!
//! [`Error`] is what every client-facing operation returns. Collaborators
//! (the display pipeline and the buffer importer) fail with
//! [`PipelineError`], which the orchestrator maps onto the taxonomy at the
//! call site:
//!
//! | Collaborator failure            | Client-facing error         |
//! |---------------------------------|-----------------------------|
//! | connector / mode query          | [`Error::BadDisplay`]       |
//! | buffer import                   | [`Error::NoResources`]      |
//! | plane placement                 | [`Error::BadConfig`]        |
//! | atomic commit / activation      | [`Error::BadParameter`]     |
//!
//! None of these are fatal to the process.

use thiserror::Error;

/// Result alias for client-facing operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Client-facing error kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum Error {
    /// The display is unknown or its pipeline could not be queried.
    #[error("bad display")]
    BadDisplay,
    /// Unknown configuration id or attribute, or plane planning failed.
    #[error("bad config")]
    BadConfig,
    /// Unknown layer id, or nothing to compose at present time.
    #[error("bad layer")]
    BadLayer,
    /// Out-of-range enumerated input, or the atomic commit was rejected.
    #[error("bad parameter")]
    BadParameter,
    /// Recognized but not implemented.
    #[error("unsupported")]
    Unsupported,
    /// A buffer could not be imported while assembling a composition.
    #[error("no resources")]
    NoResources,
}

/// Failures reported by the display pipeline and buffer importer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// The connector or its modes could not be queried.
    #[error("pipeline query failed: {0}")]
    Query(String),
    /// A buffer handle could not be imported.
    #[error("buffer import failed: {0}")]
    Import(String),
    /// No valid plane assignment exists for the composition.
    #[error("plane placement failed: {0}")]
    Placement(String),
    /// The atomic commit was rejected.
    #[error("atomic commit failed: {0}")]
    Commit(String),
    /// Legacy power-control activation failed.
    #[error("display activation failed: {0}")]
    Activation(String),
}

impl From<PipelineError> for Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Query(_) => Self::BadDisplay,
            PipelineError::Import(_) => Self::NoResources,
            PipelineError::Placement(_) => Self::BadConfig,
            PipelineError::Commit(_) | PipelineError::Activation(_) => Self::BadParameter,
        }
    }
}

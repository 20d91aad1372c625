//! Error taxonomy for the harvest pipeline.

use thiserror::Error;

use crate::driver::DriverError;

/// Errors that abort a category's pagination run.
///
/// There is no cycle-level retry: whatever goes wrong mid-cycle surfaces
/// here and the session controller only captures a diagnostic and cleans up.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The extracted grid does not have the expected column count. Column
    /// semantics are positional, so nothing downstream can be trusted.
    #[error("results grid has {found} columns, expected {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    /// A price cell did not reduce to an integer after stripping formatting.
    #[error("price cell {0:?} is not numeric")]
    MalformedPrice(String),

    /// An item link carried no numeric token to derive an identity from.
    #[error("no numeric token in item link {0:?}")]
    IdentityExtraction(String),

    /// An item link could not be resolved against the storefront base URL.
    #[error("unresolvable item link {0:?}")]
    BadItemLink(String),

    /// The run configuration is unusable.
    #[error("configuration: {0}")]
    Config(String),

    /// A browser round-trip failed.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

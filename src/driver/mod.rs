//! Page driver capability consumed by the harvest pipeline.
//!
//! The pipeline never touches a DOM directly. Everything it learns about the
//! storefront arrives through [`PageDriver::rendered_html`], and everything
//! it does to the storefront goes through the small interaction set below.
//! The default implementation drives a Chromium instance over CDP; tests
//! substitute scripted fakes.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "browser")]
pub mod chromium;

#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver;

/// Errors surfaced by a page driver implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    /// No element matches the selector.
    #[error("no element matches selector {0:?}")]
    NotFound(String),

    /// The underlying browser session failed.
    #[error("browser session: {0}")]
    Session(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Remote rendering surface the harvester drives.
///
/// Implementations must reflect all DOM mutations performed so far in
/// [`rendered_html`](PageDriver::rendered_html), and must fail element
/// interactions with [`DriverError::NotFound`] when a selector has no match.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load a URL in the session's page.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Replace the content of the input matching `selector` with `text` and
    /// commit it with the return key.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    /// Scroll the results surface to an absolute pixel offset.
    async fn scroll_to(&self, position: u32) -> Result<(), DriverError>;

    /// Current page markup, including all client-side mutations so far.
    async fn rendered_html(&self) -> Result<String, DriverError>;

    /// Save a visual snapshot of the current page to `path`.
    async fn save_snapshot(&self, path: &Path) -> Result<(), DriverError>;

    /// Tear down the session. Idempotent.
    async fn close(&mut self) -> Result<(), DriverError>;
}

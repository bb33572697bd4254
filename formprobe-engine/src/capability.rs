//! Capability seams consumed by the engine.
//!
//! The engine never talks to a browser or a console directly; it drives the
//! [`BrowserDriver`] and [`Operator`] traits so the sequencing logic can be
//! exercised against scripted fakes. Every driver call returns an explicit
//! [`DriverError`] so the decision to swallow or propagate is visible at the
//! call site instead of buried in catch-all control flow.

use async_trait::async_trait;

/// Errors a browser driver implementation may surface.
///
/// The engine converts each of these into a per-stage policy (retry,
/// soft-fail, hard-fail); none of them are allowed to crash a run.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("element query failed: {0}")]
    Query(String),

    #[error("element interaction failed: {0}")]
    Interaction(String),

    #[error("browser session error: {0}")]
    Session(String),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Handle to a live element on the current page.
///
/// Handles are only valid until the next navigation or refresh; the engine
/// discards them at every stage boundary and never caches one across a
/// refresh.
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Whether the element is currently displayed.
    async fn is_displayed(&self) -> DriverResult<bool>;

    /// Read an attribute value, `None` when the attribute is absent.
    async fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    /// Clear any existing content.
    async fn clear(&self) -> DriverResult<()>;

    /// Type text into the element.
    async fn type_text(&self, text: &str) -> DriverResult<()>;

    /// Click the element.
    async fn click(&self) -> DriverResult<()>;

    /// Send the terminal key (Enter equivalent) to the element.
    async fn press_enter(&self) -> DriverResult<()>;
}

/// The browser-control capability the engine drives.
///
/// All access is sequential; the engine never issues concurrent calls
/// against the same session.
#[async_trait]
pub trait BrowserDriver: Send {
    type Element: PageElement;

    /// Navigate the session to `url`.
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Query a single element by CSS selector. `Ok(None)` means nothing
    /// matches right now, which is distinct from a driver failure.
    async fn query_selector(&mut self, selector: &str) -> DriverResult<Option<Self::Element>>;

    /// Enumerate all input-like elements currently in the DOM.
    async fn query_inputs(&mut self) -> DriverResult<Vec<Self::Element>>;

    /// Reload the current page.
    async fn refresh(&mut self) -> DriverResult<()>;
}

/// Operator's answer at the mid-run checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorDecision {
    Continue,
    Abort,
}

/// Console-side collaborator for the one mid-run prompt and progress lines.
#[async_trait]
pub trait Operator: Send {
    /// Hand control to the operator for an out-of-band manual step (for
    /// example a verification the automation cannot perform) and wait for
    /// their decision.
    async fn checkpoint(&mut self, prompt: &str) -> OperatorDecision;

    /// Report progress on one candidate, `index` is 1-based.
    fn progress(&mut self, index: usize, total: usize, candidate: &str);
}

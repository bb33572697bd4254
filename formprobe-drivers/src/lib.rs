//! Driver layer: the WebDriver-backed implementation of the engine's
//! browser capability.
//!
//! - [`webdriver::driver::ProbeSession`]: fantoccini client wrapper and
//!   session lifecycle
//! - [`webdriver::page`]: `BrowserDriver`/`PageElement` implementations
//! - [`webdriver::pacing::Pacer`]: human-scale delays and typing
pub mod webdriver;

//! Locator resolution: bounded-wait selector lookup with a heuristic
//! fallback scan.
//!
//! Operator-supplied selectors are frequently wrong or stale across page
//! variants, so a failed primary lookup falls back to scanning the visible
//! input elements for one whose `name`/`type` attributes fit the semantic
//! kind. The scan trades precision for resilience and may pick the wrong
//! field; that tradeoff is intentional.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::capability::{BrowserDriver, PageElement};

/// Semantic kind of the field being located, used by the fallback scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Phone number entry field.
    Phone,
    /// Free-text or one-time-code entry field.
    TextLike,
}

impl ElementKind {
    /// Attribute heuristic for the fallback scan. `name` and `input_type`
    /// must already be lowercased; absent attributes are the empty string.
    fn matches(self, name: &str, input_type: &str) -> bool {
        match self {
            ElementKind::Phone => {
                name.contains("phone") || name.contains("mobile") || input_type.contains("tel")
            }
            ElementKind::TextLike => {
                matches!(input_type, "" | "text" | "otp" | "one-time-code")
            }
        }
    }
}

/// Selector hint plus the semantic kind it should locate.
///
/// The selector may be absent, in which case only the heuristic scan
/// applies.
#[derive(Debug, Clone)]
pub struct ElementHint {
    selector: Option<String>,
    kind: ElementKind,
}

impl ElementHint {
    /// Build a hint from operator input; an empty or whitespace selector
    /// means "no hint supplied".
    pub fn new(selector: impl Into<String>, kind: ElementKind) -> Self {
        let selector = selector.into();
        let trimmed = selector.trim();
        Self {
            selector: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            kind,
        }
    }

    /// Hint with no selector: resolution is scan-only.
    pub fn scan_only(kind: ElementKind) -> Self {
        Self {
            selector: None,
            kind,
        }
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }
}

/// A located element together with the attributes it resolved with.
///
/// Valid only until the next navigation or refresh; never carry one across
/// a stage boundary.
#[derive(Debug)]
pub struct ResolvedElement<E> {
    pub element: E,
    pub name: Option<String>,
    pub input_type: Option<String>,
}

/// Outcome of a resolution attempt. The caller decides whether `NotFound`
/// is fatal.
#[derive(Debug)]
pub enum Resolution<E> {
    Found(ResolvedElement<E>),
    NotFound,
}

impl<E> Resolution<E> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Full resolution: bounded-wait primary lookup (when a selector was
/// supplied) followed by the fallback scan.
pub async fn resolve<D: BrowserDriver>(
    driver: &mut D,
    hint: &ElementHint,
    timeout: Duration,
    poll_interval: Duration,
) -> Resolution<D::Element> {
    if let Some(selector) = hint.selector() {
        if let Some(element) = bounded_wait(driver, selector, timeout, poll_interval).await {
            return Resolution::Found(describe(element).await);
        }
        debug!(selector, "primary lookup timed out, trying fallback scan");
    }

    match fallback_scan(driver, hint.kind()).await {
        Some(element) => Resolution::Found(describe(element).await),
        None => Resolution::NotFound,
    }
}

/// Poll for `selector` until it is present or `timeout` elapses.
///
/// Driver errors during the wait are swallowed and treated as absence;
/// transient DOM churn must never abort a run. The call returns within
/// `timeout` plus at most one poll interval.
pub async fn bounded_wait<D: BrowserDriver>(
    driver: &mut D,
    selector: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Option<D::Element> {
    let deadline = Instant::now() + timeout;
    loop {
        match driver.query_selector(selector).await {
            Ok(Some(element)) => return Some(element),
            Ok(None) => {}
            Err(e) => trace!(selector, error = %e, "query failed during wait, treating as absent"),
        }

        let now = Instant::now();
        if now >= deadline {
            return None;
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Scan the currently displayed input elements for the first one whose
/// attributes match `kind`.
pub async fn fallback_scan<D: BrowserDriver>(
    driver: &mut D,
    kind: ElementKind,
) -> Option<D::Element> {
    let inputs = match driver.query_inputs().await {
        Ok(inputs) => inputs,
        Err(e) => {
            debug!(error = %e, "input enumeration failed, fallback scan yields nothing");
            return None;
        }
    };

    for element in inputs {
        // Skip any element the driver cannot inspect; a stale node here
        // must not poison the rest of the scan.
        match element.is_displayed().await {
            Ok(true) => {}
            _ => continue,
        }
        let name = match lowered_attribute(&element, "name").await {
            Some(v) => v,
            None => continue,
        };
        let input_type = match lowered_attribute(&element, "type").await {
            Some(v) => v,
            None => continue,
        };
        if kind.matches(&name, &input_type) {
            return Some(element);
        }
    }
    None
}

/// Read an attribute lowercased, `Some("")` for an absent attribute and
/// `None` when the element could not be inspected at all.
async fn lowered_attribute<E: PageElement>(element: &E, name: &str) -> Option<String> {
    match element.attribute(name).await {
        Ok(value) => Some(value.unwrap_or_default().to_lowercase()),
        Err(_) => None,
    }
}

/// Capture the resolved attributes alongside the handle; best-effort.
pub(crate) async fn describe<E: PageElement>(element: E) -> ResolvedElement<E> {
    let name = element.attribute("name").await.ok().flatten();
    let input_type = element.attribute("type").await.ok().flatten();
    ResolvedElement {
        element,
        name,
        input_type,
    }
}

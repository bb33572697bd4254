//! `BrowserDriver` / `PageElement` implementations over fantoccini.
//!
//! Every WebDriver failure is folded into the engine's [`DriverError`]
//! taxonomy; the engine decides per call site whether that means retry,
//! soft failure, or the end of the run.

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::Locator;
use tracing::trace;

use formprobe_engine::capability::{BrowserDriver, DriverError, DriverResult, PageElement};

use crate::webdriver::driver::ProbeSession;
use crate::webdriver::pacing::Pacer;

/// Live element handle plus the pacer used for typing into it.
#[derive(Clone)]
pub struct ProbeElement {
    element: Element,
    pacer: Pacer,
}

impl ProbeElement {
    fn new(element: Element, pacer: Pacer) -> Self {
        Self { element, pacer }
    }
}

#[async_trait]
impl PageElement for ProbeElement {
    async fn is_displayed(&self) -> DriverResult<bool> {
        self.element
            .is_displayed()
            .await
            .map_err(|e| DriverError::Query(e.to_string()))
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        self.element
            .attr(name)
            .await
            .map_err(|e| DriverError::Query(e.to_string()))
    }

    async fn clear(&self) -> DriverResult<()> {
        self.element
            .clear()
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }

    async fn type_text(&self, text: &str) -> DriverResult<()> {
        self.pacer
            .type_text(&self.element, text)
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }

    async fn click(&self) -> DriverResult<()> {
        self.element
            .click()
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }

    async fn press_enter(&self) -> DriverResult<()> {
        self.element
            .send_keys(&char::from(Key::Enter).to_string())
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }
}

#[async_trait]
impl BrowserDriver for ProbeSession {
    type Element = ProbeElement;

    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        trace!(url, "navigating");
        self.client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn query_selector(&mut self, selector: &str) -> DriverResult<Option<Self::Element>> {
        // find_all so an absent element is Ok(None) rather than an error;
        // the engine treats the two differently.
        let mut found = self
            .client
            .find_all(Locator::Css(selector))
            .await
            .map_err(|e| DriverError::Query(e.to_string()))?;

        if found.is_empty() {
            Ok(None)
        } else {
            Ok(Some(ProbeElement::new(found.remove(0), self.pacer.clone())))
        }
    }

    async fn query_inputs(&mut self) -> DriverResult<Vec<Self::Element>> {
        let found = self
            .client
            .find_all(Locator::Css("input"))
            .await
            .map_err(|e| DriverError::Query(e.to_string()))?;

        Ok(found
            .into_iter()
            .map(|element| ProbeElement::new(element, self.pacer.clone()))
            .collect())
    }

    async fn refresh(&mut self) -> DriverResult<()> {
        self.client
            .refresh()
            .await
            .map_err(|e| DriverError::Session(e.to_string()))
    }
}

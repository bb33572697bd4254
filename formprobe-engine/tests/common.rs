//! Scripted in-memory driver and operator for engine tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use formprobe_engine::capability::{
    BrowserDriver, DriverError, DriverResult, Operator, OperatorDecision, PageElement,
};
use formprobe_engine::sequencer::Timing;

/// Shared call log; every driver and element interaction appends one line.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count_prefixed(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    pub fn contains_prefixed(&self, prefix: &str) -> bool {
        self.count_prefixed(prefix) > 0
    }
}

#[derive(Clone)]
pub struct FakeElement {
    pub label: &'static str,
    pub name: Option<&'static str>,
    pub input_type: Option<&'static str>,
    pub displayed: bool,
    pub fail_typing: bool,
    pub fail_enter: bool,
    pub log: CallLog,
}

impl FakeElement {
    pub fn new(label: &'static str, log: &CallLog) -> Self {
        Self {
            label,
            name: None,
            input_type: None,
            displayed: true,
            fail_typing: false,
            fail_enter: false,
            log: log.clone(),
        }
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn typed(mut self, input_type: &'static str) -> Self {
        self.input_type = Some(input_type);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn failing_typing(mut self) -> Self {
        self.fail_typing = true;
        self
    }

    pub fn failing_enter(mut self) -> Self {
        self.fail_enter = true;
        self
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn is_displayed(&self) -> DriverResult<bool> {
        Ok(self.displayed)
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        Ok(match name {
            "name" => self.name.map(str::to_string),
            "type" => self.input_type.map(str::to_string),
            _ => None,
        })
    }

    async fn clear(&self) -> DriverResult<()> {
        self.log.push(format!("clear:{}", self.label));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> DriverResult<()> {
        if self.fail_typing {
            return Err(DriverError::Interaction("typing rejected".into()));
        }
        self.log.push(format!("type:{}:{text}", self.label));
        Ok(())
    }

    async fn click(&self) -> DriverResult<()> {
        self.log.push(format!("click:{}", self.label));
        Ok(())
    }

    async fn press_enter(&self) -> DriverResult<()> {
        if self.fail_enter {
            return Err(DriverError::Interaction("enter rejected".into()));
        }
        self.log.push(format!("enter:{}", self.label));
        Ok(())
    }
}

/// What a scripted selector query yields.
#[derive(Clone)]
pub enum SelectorBehavior {
    Found(FakeElement),
    Missing,
    Error,
    /// Missing until `refresh()` has been called, then found.
    FoundAfterRefresh(FakeElement),
}

#[derive(Default)]
pub struct FakeDriver {
    pub log: CallLog,
    pub selectors: HashMap<String, SelectorBehavior>,
    pub inputs: Vec<FakeElement>,
    pub fail_navigate: bool,
    pub fail_inputs: bool,
    refreshed: bool,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_selector(&mut self, selector: &str, behavior: SelectorBehavior) {
        self.selectors.insert(selector.to_string(), behavior);
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.log.push(format!("navigate:{url}"));
        if self.fail_navigate {
            return Err(DriverError::Navigation("connection refused".into()));
        }
        Ok(())
    }

    async fn query_selector(&mut self, selector: &str) -> DriverResult<Option<Self::Element>> {
        self.log.push(format!("query:{selector}"));
        match self.selectors.get(selector) {
            Some(SelectorBehavior::Found(el)) => Ok(Some(el.clone())),
            Some(SelectorBehavior::FoundAfterRefresh(el)) if self.refreshed => Ok(Some(el.clone())),
            Some(SelectorBehavior::FoundAfterRefresh(_)) => Ok(None),
            Some(SelectorBehavior::Missing) | None => Ok(None),
            Some(SelectorBehavior::Error) => Err(DriverError::Query("stale root".into())),
        }
    }

    async fn query_inputs(&mut self) -> DriverResult<Vec<Self::Element>> {
        self.log.push("inputs".to_string());
        if self.fail_inputs {
            return Err(DriverError::Query("document unavailable".into()));
        }
        Ok(self.inputs.clone())
    }

    async fn refresh(&mut self) -> DriverResult<()> {
        self.log.push("refresh".to_string());
        self.refreshed = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeOperator {
    pub abort_at_checkpoint: bool,
    pub checkpoints: Vec<String>,
    pub progress_lines: Vec<(usize, usize, String)>,
}

#[async_trait]
impl Operator for FakeOperator {
    async fn checkpoint(&mut self, prompt: &str) -> OperatorDecision {
        self.checkpoints.push(prompt.to_string());
        if self.abort_at_checkpoint {
            OperatorDecision::Abort
        } else {
            OperatorDecision::Continue
        }
    }

    fn progress(&mut self, index: usize, total: usize, candidate: &str) {
        self.progress_lines.push((index, total, candidate.to_string()));
    }
}

/// Millisecond-scale timing so the full stage machine runs in test time.
pub fn fast_timing() -> Timing {
    Timing {
        credential_timeout: Duration::from_millis(40),
        candidate_timeout: Duration::from_millis(30),
        retry_timeout: Duration::from_millis(20),
        poll_interval: Duration::from_millis(5),
        navigation_settle: Duration::from_millis(1),
        refresh_settle: Duration::from_millis(1),
        injection_settle: Duration::from_millis(1),
        candidate_settle: Duration::from_millis(1),
    }
}

//! Interaction sequencing: the stage machine that drives a run.
//!
//! Stages are strictly ordered — acquire the target page, optionally fill
//! and submit the credential field, then iterate the candidate list — and
//! every driver failure inside a stage is converted into an explicit
//! per-stage policy (log and continue, soft-fail the candidate, or end the
//! run). Nothing in here is allowed to crash the session.

use std::time::Duration;

use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::capability::{BrowserDriver, Operator, OperatorDecision, PageElement};
use crate::resolver::{self, ElementHint, ElementKind, Resolution, ResolvedElement};
use crate::target::{CandidateList, Target};

/// Resolve timeouts and settle delays for one run.
///
/// Settle delays are fixed pauses to tolerate asynchronous rendering; they
/// are deliberately not condition-polls.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Bounded-wait ceiling for the credential field.
    pub credential_timeout: Duration,
    /// Bounded-wait ceiling for the candidate field.
    pub candidate_timeout: Duration,
    /// Shorter ceiling for the retry after a recovery refresh.
    pub retry_timeout: Duration,
    /// Interval between presence polls inside a bounded wait.
    pub poll_interval: Duration,
    /// Pause after navigation for client-side rendering.
    pub navigation_settle: Duration,
    /// Pause after a recovery refresh.
    pub refresh_settle: Duration,
    /// Pause between typing a candidate and submitting it.
    pub injection_settle: Duration,
    /// Pause after each candidate before the next resolve.
    pub candidate_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            credential_timeout: Duration::from_secs(12),
            candidate_timeout: Duration::from_secs(8),
            retry_timeout: Duration::from_secs(6),
            poll_interval: Duration::from_millis(250),
            navigation_settle: Duration::from_millis(1500),
            refresh_settle: Duration::from_millis(200),
            injection_settle: Duration::from_millis(100),
            candidate_settle: Duration::from_millis(200),
        }
    }
}

/// Credential-entry stage inputs; the stage runs only when these were
/// supplied.
#[derive(Debug, Clone)]
pub struct CredentialPlan {
    pub selector: String,
    pub value: String,
    pub submit_selector: Option<String>,
}

/// Everything a run needs, collected up front and immutable afterwards.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub target: Target,
    pub credential: Option<CredentialPlan>,
    /// Primary selector for the candidate field; may be empty, in which
    /// case only the heuristic scan applies.
    pub candidate_selector: String,
    pub candidate_submit_selector: Option<String>,
    pub candidates: CandidateList,
}

/// Current stage of the machine. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    AcquireTarget,
    CredentialStage,
    CandidateStage,
    Terminated,
}

/// Why a stage or candidate soft-failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoftReason {
    /// No field resolved after all fallbacks. Inconclusive: the field may
    /// be gone because it is no longer needed, or this may be the wrong
    /// page. Neither reading is a success.
    Unresolved,
    /// Field resolved but injection or submission failed.
    Fault(String),
    /// Operator chose to stop at the checkpoint. Clean, not an error.
    OperatorAbort,
}

/// Per-stage / per-candidate result classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Success,
    /// Recoverable; the run continues with the next candidate or stage.
    SoftFailure(SoftReason),
    /// Run-terminating.
    HardFailure(String),
}

/// Why the run reached [`SequenceState::Terminated`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// Every candidate was attempted. Says nothing about whether any of
    /// them achieved the operator's goal; the engine cannot verify that.
    ListExhausted,
    /// An unrecoverable stage failure ended the run early.
    HardFailure(String),
    /// The operator asked to stop at the checkpoint.
    OperatorAborted,
}

/// Terminal report for a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    /// Candidates in the list.
    pub total_candidates: usize,
    /// Candidates whose field was resolved and which were submitted.
    pub submitted: usize,
    /// Candidates for which no field could be resolved after all fallbacks.
    pub unresolved: usize,
    /// Candidates whose field was resolved but whose injection or
    /// submission failed.
    pub faulted: usize,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ending = match &self.outcome {
            RunOutcome::ListExhausted => "candidate list exhausted".to_string(),
            RunOutcome::HardFailure(reason) => format!("stopped: {reason}"),
            RunOutcome::OperatorAborted => "aborted by operator".to_string(),
        };
        write!(
            f,
            "run {} complete, outcome unknown ({ending}): {} candidates, {} submitted, {} unresolved, {} faulted",
            self.run_id, self.total_candidates, self.submitted, self.unresolved, self.faulted
        )
    }
}

/// Drives one run of the stage machine over a borrowed driver session.
///
/// The caller owns the session and stays responsible for closing it on
/// every exit path; the sequencer only borrows it for the run.
pub struct Sequencer<'a, D, O> {
    driver: &'a mut D,
    operator: &'a mut O,
    timing: Timing,
    state: SequenceState,
}

impl<'a, D: BrowserDriver, O: Operator> Sequencer<'a, D, O> {
    pub fn new(driver: &'a mut D, operator: &'a mut O, timing: Timing) -> Self {
        Self {
            driver,
            operator,
            timing,
            state: SequenceState::AcquireTarget,
        }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Walk the stages to completion. Never fails: every failure mode is
    /// folded into the report's outcome.
    pub async fn run(mut self, plan: &RunPlan) -> RunReport {
        let run_id = Uuid::new_v4();
        let total = plan.candidates.len();
        info!(%run_id, target = %plan.target, candidates = total, "starting run");

        self.acquire_target(plan).await;

        self.state = SequenceState::CredentialStage;
        match self.credential_stage(plan).await {
            StageOutcome::Success => {}
            StageOutcome::SoftFailure(_) => {
                self.state = SequenceState::Terminated;
                return RunReport {
                    run_id,
                    outcome: RunOutcome::OperatorAborted,
                    total_candidates: total,
                    submitted: 0,
                    unresolved: 0,
                    faulted: 0,
                };
            }
            StageOutcome::HardFailure(reason) => {
                warn!(%run_id, %reason, "credential stage failed, ending run");
                self.state = SequenceState::Terminated;
                return RunReport {
                    run_id,
                    outcome: RunOutcome::HardFailure(reason),
                    total_candidates: total,
                    submitted: 0,
                    unresolved: 0,
                    faulted: 0,
                };
            }
        }

        self.state = SequenceState::CandidateStage;
        let (submitted, unresolved, faulted) = self.candidate_stage(plan).await;

        self.state = SequenceState::Terminated;
        let report = RunReport {
            run_id,
            outcome: RunOutcome::ListExhausted,
            total_candidates: total,
            submitted,
            unresolved,
            faulted,
        };
        info!(%run_id, submitted, unresolved, faulted, "run complete");
        report
    }

    /// Open the target page. Navigation failure is non-fatal: the session
    /// may already show a usable partial page.
    async fn acquire_target(&mut self, plan: &RunPlan) {
        self.state = SequenceState::AcquireTarget;
        if let Err(e) = self.driver.navigate(plan.target.as_str()).await {
            warn!(target = %plan.target, error = %e, "navigation failed, continuing with the current page");
        }
        sleep(self.timing.navigation_settle).await;
    }

    /// Fill and submit the credential field, then hand control to the
    /// operator for any out-of-band step.
    ///
    /// `HardFailure` when the field could not be found at all: there is no
    /// safe recovery from guessing at a credential field.
    async fn credential_stage(&mut self, plan: &RunPlan) -> StageOutcome {
        let Some(credential) = &plan.credential else {
            debug!("no credential selector supplied, skipping credential stage");
            return StageOutcome::Success;
        };

        let hint = ElementHint::new(credential.selector.clone(), ElementKind::Phone);
        let resolved = resolver::resolve(
            self.driver,
            &hint,
            self.timing.credential_timeout,
            self.timing.poll_interval,
        )
        .await;

        let field = match resolved {
            Resolution::Found(field) => field,
            Resolution::NotFound => {
                return StageOutcome::HardFailure(
                    "credential field not found with supplied selector or fallback scan".into(),
                );
            }
        };
        debug!(name = ?field.name, input_type = ?field.input_type, "credential field resolved");

        // Clearing is best-effort; a field that rejects clear may still
        // accept input.
        let _ = field.element.clear().await;
        if let Err(e) = field.element.type_text(&credential.value).await {
            warn!(error = %e, "failed to type into credential field");
        }

        let submitted = self
            .submit(&field, credential.submit_selector.as_deref())
            .await;
        if submitted {
            info!("credential entered and submitted");
        } else {
            info!("credential entered, submission may have failed");
        }

        match self
            .operator
            .checkpoint("Complete any extra verification in the browser, then continue (or abort).")
            .await
        {
            OperatorDecision::Continue => StageOutcome::Success,
            OperatorDecision::Abort => {
                info!("operator aborted at checkpoint");
                StageOutcome::SoftFailure(SoftReason::OperatorAbort)
            }
        }
    }

    /// Iterate the candidate list. Returns (submitted, unresolved, faulted).
    async fn candidate_stage(&mut self, plan: &RunPlan) -> (usize, usize, usize) {
        let total = plan.candidates.len();
        let hint = ElementHint::new(plan.candidate_selector.clone(), ElementKind::TextLike);
        let mut submitted = 0usize;
        let mut unresolved = 0usize;
        let mut faulted = 0usize;

        for (index, candidate) in plan.candidates.iter().enumerate() {
            self.operator.progress(index + 1, total, candidate);

            match self.try_candidate(plan, &hint, candidate).await {
                StageOutcome::Success => submitted += 1,
                StageOutcome::SoftFailure(SoftReason::Unresolved) => {
                    unresolved += 1;
                    info!(candidate, "no input field resolved, marking inconclusive");
                }
                StageOutcome::SoftFailure(reason) => {
                    faulted += 1;
                    warn!(candidate, ?reason, "candidate faulted");
                }
                StageOutcome::HardFailure(reason) => {
                    // The candidate loop produces no hard failures by
                    // policy; downgrade anything unexpected and keep going.
                    faulted += 1;
                    warn!(candidate, %reason, "unexpected hard failure downgraded");
                }
            }

            sleep(self.timing.candidate_settle).await;
        }

        (submitted, unresolved, faulted)
    }

    /// One candidate: resolve with recovery, inject, submit.
    async fn try_candidate(
        &mut self,
        plan: &RunPlan,
        hint: &ElementHint,
        candidate: &str,
    ) -> StageOutcome {
        let field = match self.resolve_candidate_field(hint).await {
            Some(field) => field,
            None => return StageOutcome::SoftFailure(SoftReason::Unresolved),
        };

        let _ = field.element.clear().await;
        if let Err(e) = field.element.type_text(candidate).await {
            return StageOutcome::SoftFailure(SoftReason::Fault(format!("injection failed: {e}")));
        }
        sleep(self.timing.injection_settle).await;

        if self
            .submit(&field, plan.candidate_submit_selector.as_deref())
            .await
        {
            StageOutcome::Success
        } else {
            StageOutcome::SoftFailure(SoftReason::Fault("submission failed".into()))
        }
    }

    /// Candidate-field resolution policy: primary bounded wait, then one
    /// refresh-and-retry with a shorter ceiling, then the heuristic scan as
    /// a last resort.
    async fn resolve_candidate_field(
        &mut self,
        hint: &ElementHint,
    ) -> Option<ResolvedElement<D::Element>> {
        if let Some(selector) = hint.selector() {
            if let Some(element) = resolver::bounded_wait(
                self.driver,
                selector,
                self.timing.candidate_timeout,
                self.timing.poll_interval,
            )
            .await
            {
                return Some(resolver::describe(element).await);
            }

            // One recovery: the page may have wedged mid-render.
            debug!(selector, "candidate field absent, refreshing page");
            if let Err(e) = self.driver.refresh().await {
                warn!(error = %e, "refresh failed during recovery");
            }
            sleep(self.timing.refresh_settle).await;

            if let Some(element) = resolver::bounded_wait(
                self.driver,
                selector,
                self.timing.retry_timeout,
                self.timing.poll_interval,
            )
            .await
            {
                return Some(resolver::describe(element).await);
            }
        }

        match resolver::fallback_scan(self.driver, hint.kind()).await {
            Some(element) => Some(resolver::describe(element).await),
            None => None,
        }
    }

    /// Submit via the optional button selector, falling back to the
    /// terminal key on the field itself.
    async fn submit(
        &mut self,
        field: &ResolvedElement<D::Element>,
        submit_selector: Option<&str>,
    ) -> bool {
        if let Some(selector) = submit_selector {
            match self.driver.query_selector(selector).await {
                Ok(Some(button)) => match button.click().await {
                    Ok(()) => return true,
                    Err(e) => {
                        debug!(selector, error = %e, "submit click failed, falling back to terminal key")
                    }
                },
                Ok(None) => {
                    debug!(selector, "submit button not found, falling back to terminal key")
                }
                Err(e) => {
                    debug!(selector, error = %e, "submit lookup failed, falling back to terminal key")
                }
            }
        }

        match field.element.press_enter().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "terminal key failed");
                false
            }
        }
    }
}

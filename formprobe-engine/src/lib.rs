//! Resilient element resolution and step sequencing for a single
//! operator-driven browser session.
//!
//! The engine is split in two:
//!
//! - [`resolver`]: given a selector hint and a semantic element kind, find
//!   a usable element on an unreliable, asynchronously-rendered page —
//!   bounded-wait primary lookup, then a heuristic scan over the visible
//!   inputs.
//! - [`sequencer`]: the stage machine that walks target acquisition, the
//!   optional credential stage, and the candidate iteration, applying
//!   per-stage retry and refresh policy and producing a terminal
//!   [`sequencer::RunReport`].
//!
//! Browser control and console I/O are consumed through the [`capability`]
//! traits so the whole engine runs against scripted fakes in tests.

pub mod capability;
pub mod resolver;
pub mod sequencer;
pub mod target;

pub use capability::{BrowserDriver, DriverError, DriverResult, Operator, OperatorDecision, PageElement};
pub use resolver::{ElementHint, ElementKind, Resolution, ResolvedElement};
pub use sequencer::{
    CredentialPlan, RunOutcome, RunPlan, RunReport, SequenceState, Sequencer, SoftReason,
    StageOutcome, Timing,
};
pub use target::{CandidateList, Target};

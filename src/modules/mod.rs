// 🧱 Scenario Modules
//
// One module per demo page. Each owns its static catalog and its
// selection state, exposes operations for user events, and renders
// fragments addressed to the page's container ids.

pub mod cost_ticker;
pub mod data_sovereignty;
pub mod fine_tuning;
pub mod guardrails;
pub mod infra_recommender;
pub mod model_arena;
pub mod model_lab;
pub mod rag_citations;

use crate::state::RunTicket;
use crate::typing::{Keyframe, Playback, Timeline};

/// The result of starting an animated operation.
///
/// `outcome` is known up front; `timeline` is how the page gets there.
/// The module stays busy until `ticket` is dropped.
pub struct Run<T> {
    pub outcome: T,
    pub timeline: Timeline,
    pub ticket: RunTicket,
}

impl<T> Run<T> {
    pub fn new(outcome: T, timeline: Timeline, ticket: RunTicket) -> Self {
        Run {
            outcome,
            timeline,
            ticket,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Run<U> {
        Run::new(f(self.outcome), self.timeline, self.ticket)
    }

    /// Hand the animation to an incremental player
    pub fn into_playback(self) -> (T, Playback) {
        (self.outcome, Playback::new(self.timeline, Some(self.ticket)))
    }

    /// Drain the animation into a precomputed script, keeping the ticket
    pub fn into_script(self) -> (T, Vec<Keyframe>, RunTicket) {
        (self.outcome, self.timeline.into_script(), self.ticket)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Run<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run").field("outcome", &self.outcome).finish_non_exhaustive()
    }
}

//! Control seam between the orchestrator and whoever drives the run.

use crate::services::matcher::BrandProposal;
use crate::services::session::ProgressState;
use crate::types::AppResult;

/// Where a mapping run begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMode {
    FromBeginning,
    Resume,
    FromBrand(String),
}

/// The verdict on one brand's proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Skip,
    Quit,
}

/// Snapshot of stored progress, shown when choosing a start mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub processed: usize,
    pub total: usize,
    pub next_brand: Option<String>,
}

impl ResumePoint {
    pub fn from_state(state: &ProgressState) -> Self {
        Self {
            processed: state.processed(),
            total: state.brand_order.len(),
            next_brand: state.next_pending().map(str::to_string),
        }
    }
}

pub trait ControlSurface {
    /// Pick the start mode; `resume` carries stored progress when present.
    fn choose_start(&mut self, resume: Option<&ResumePoint>) -> AppResult<StartMode>;

    /// Judge one brand's proposal. `position` is 1-based within `total`.
    fn decide(
        &mut self,
        proposal: &BrandProposal,
        position: usize,
        total: usize,
    ) -> AppResult<Decision>;
}

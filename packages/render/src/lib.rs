#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rendering seam for the ticket explorer.
//!
//! Defines a [`RenderAdapter`] trait that decouples the reconciler from any
//! specific chart backend. Adapters either redraw from a full
//! [`DerivedView`] or, when they support it, apply a [`ViewPatch`] carrying
//! only the parts a reconciliation recomputed.
//!
//! The [`events`] module goes the other way: it turns chart-library
//! interaction payloads into [`SelectionEvent`]s.
//!
//! [`SelectionEvent`]: ticket_explorer_reconciler_models::SelectionEvent

pub mod events;
pub mod json_lines;

pub use json_lines::JsonLinesRenderer;

use serde::{Deserialize, Serialize};
use ticket_explorer_reconciler_models::{
    AreaCount, DemographicBars, DerivedView, Reconciliation, SelectionState, TimelineView,
};

/// Errors that can occur while emitting view updates.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing to the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A view could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A partial view update: only the parts a reconciliation recomputed are
/// present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewPatch {
    /// Selection the patch was computed for.
    pub state: SelectionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_values: Option<Vec<AreaCount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TimelineView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographic_bars: Option<DemographicBars>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographic_title: Option<String>,
    /// New hint text; an empty string hides the hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_hint: Option<String>,
}

impl ViewPatch {
    /// Extracts the recomputed parts of `reconciliation.view`.
    #[must_use]
    pub fn from_reconciliation(reconciliation: &Reconciliation) -> Self {
        let Reconciliation {
            state,
            view,
            recomputed,
        } = reconciliation;

        Self {
            state: state.clone(),
            map_values: recomputed.map_values.then(|| view.map.values.clone()),
            map_title: recomputed.map_title.then(|| view.map.title.clone()),
            timeline: recomputed.timeline.then(|| view.timeline.clone()),
            demographic_bars: recomputed
                .demographic_fractions
                .then(|| view.demographics.bars.clone()),
            demographic_title: recomputed
                .demographic_title
                .then(|| view.demographics.title.clone()),
            selection_hint: recomputed
                .selection_hint
                .then(|| view.selection_hint.clone().unwrap_or_default()),
        }
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map_values.is_none()
            && self.map_title.is_none()
            && self.timeline.is_none()
            && self.demographic_bars.is_none()
            && self.demographic_title.is_none()
            && self.selection_hint.is_none()
    }

    /// Overwrites the patched parts of `view`.
    pub fn apply_to(&self, view: &mut DerivedView) {
        if let Some(values) = &self.map_values {
            view.map.values.clone_from(values);
        }
        if let Some(title) = &self.map_title {
            view.map.title.clone_from(title);
        }
        if let Some(timeline) = &self.timeline {
            view.timeline.clone_from(timeline);
        }
        if let Some(bars) = &self.demographic_bars {
            view.demographics.bars.clone_from(bars);
        }
        if let Some(title) = &self.demographic_title {
            view.demographics.title.clone_from(title);
        }
        if let Some(hint) = &self.selection_hint {
            view.selection_hint = (!hint.is_empty()).then(|| hint.clone());
        }
    }
}

/// Draws views produced by the reconciler.
pub trait RenderAdapter {
    /// Redraws everything from `view`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the output cannot be written.
    fn render(&mut self, view: &DerivedView) -> Result<(), RenderError>;

    /// Updates only the parts present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the output cannot be written.
    fn apply_patch(&mut self, patch: &ViewPatch) -> Result<(), RenderError>;

    /// Whether [`Self::apply_patch`] is meaningful for this backend.
    ///
    /// The default implementation returns `true`.
    fn supports_patches(&self) -> bool {
        true
    }
}

/// Sends a reconciliation to `adapter`: as a patch when the adapter
/// supports patches, otherwise as a full redraw.
///
/// # Errors
///
/// Returns [`RenderError`] if the adapter fails to write.
pub fn present(
    adapter: &mut (impl RenderAdapter + ?Sized),
    reconciliation: &Reconciliation,
) -> Result<(), RenderError> {
    if adapter.supports_patches() {
        let patch = ViewPatch::from_reconciliation(reconciliation);
        log::debug!("Presenting patch (empty={})", patch.is_empty());
        adapter.apply_patch(&patch)
    } else {
        adapter.render(&reconciliation.view)
    }
}

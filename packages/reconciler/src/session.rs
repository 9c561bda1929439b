//! Per-user interactive state.

use std::sync::Arc;

use ticket_explorer_reconciler_models::{
    DerivedView, Reconciliation, SelectionEvent, SelectionState,
};

use crate::{ReconcilerContext, initial, reconcile};

/// Holds one user's current selection and view against a shared context.
///
/// Events must be applied in the order the user produced them; the session
/// does no queuing of its own.
#[derive(Debug, Clone)]
pub struct Session {
    context: Arc<ReconcilerContext>,
    current: Reconciliation,
}

impl Session {
    /// Starts a session at `state`, computing the full view.
    #[must_use]
    pub fn new(context: Arc<ReconcilerContext>, state: SelectionState) -> Self {
        let current = initial(&context, state);
        Self { context, current }
    }

    /// Starts a session at the context's default selection.
    #[must_use]
    pub fn with_initial_type(context: Arc<ReconcilerContext>, preferred: &str) -> Self {
        let state = context.initial_selection(preferred);
        Self::new(context, state)
    }

    /// Reconciles `event` against the current view and stores the result.
    pub fn apply(&mut self, event: &SelectionEvent) -> &Reconciliation {
        self.current = reconcile(&self.context, &self.current, event);
        &self.current
    }

    /// Swaps in a freshly loaded dataset and recomputes every view for the
    /// current selection.
    pub fn replace_context(&mut self, context: Arc<ReconcilerContext>) -> &Reconciliation {
        log::info!("Replacing reconciler context");
        self.context = context;
        self.current = initial(&self.context, self.current.state.clone());
        &self.current
    }

    #[must_use]
    pub const fn current(&self) -> &Reconciliation {
        &self.current
    }

    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.current.state
    }

    #[must_use]
    pub const fn view(&self) -> &DerivedView {
        &self.current.view
    }

    #[must_use]
    pub const fn context(&self) -> &Arc<ReconcilerContext> {
        &self.context
    }
}

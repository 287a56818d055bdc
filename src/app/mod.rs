//! Presentation glue: form state and explicit event-handler registration.
//!
//! The form mirrors the explorer's controls (query, results picker, split
//! picker, example count, column picker) and its outputs. Triggers are
//! [`Event`]s; what runs for each event is whatever was registered on the
//! [`EventRouter`], so any front-end (the interactive shell, a test) can
//! drive the same wiring.

pub mod shell;

use std::collections::HashMap;

use tracing::debug;

use crate::error::DataScoutError;
use crate::explore::{explore_dataset, ExploreReport};
use crate::export::{export_column, ExportResult};
use crate::hub::{DatasetHub, Split};
use crate::search::search_datasets;

pub use shell::Shell;

/// Smallest selectable example count.
pub const MIN_EXAMPLES: usize = 1;
/// Largest selectable example count.
pub const MAX_EXAMPLES: usize = 20;
/// Example count before the user touches the control.
pub const DEFAULT_EXAMPLES: usize = 5;

/// Split loaded to fill the column picker when the selection changes.
///
/// This is always `train`, independent of the split picker.
pub const COLUMN_LIST_SPLIT: Split = Split::Train;

/// Current values of every control and output of the form.
#[derive(Clone, Debug)]
pub struct FormState {
    pub query: String,
    pub results: Vec<String>,
    pub selected: Option<String>,
    pub split: Split,
    pub num_examples: usize,
    pub report: Option<ExploreReport>,
    pub column_choices: Vec<String>,
    pub column: Option<String>,
    pub export: Option<ExportResult>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            selected: None,
            split: Split::Train,
            num_examples: DEFAULT_EXAMPLES,
            report: None,
            column_choices: Vec::new(),
            column: None,
            export: None,
        }
    }
}

/// Triggers the form can fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    SearchClicked,
    DatasetChanged,
    ExploreClicked,
    ExportClicked,
}

/// A registered reaction to an [`Event`].
pub type Handler = Box<dyn Fn(&mut FormState, &dyn DatasetHub) -> Result<(), DataScoutError>>;

/// Event → handlers table. Handlers run in registration order.
#[derive(Default)]
pub struct EventRouter {
    handlers: HashMap<Event, Vec<Handler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with the explorer's standard bindings.
    pub fn wired() -> Self {
        let mut router = Self::new();
        router
            .on(Event::SearchClicked, on_search)
            .on(Event::DatasetChanged, on_dataset_changed)
            .on(Event::ExploreClicked, on_explore)
            .on(Event::ExportClicked, on_export);
        router
    }

    pub fn on<F>(&mut self, event: Event, handler: F) -> &mut Self
    where
        F: Fn(&mut FormState, &dyn DatasetHub) -> Result<(), DataScoutError> + 'static,
    {
        self.handlers
            .entry(event)
            .or_default()
            .push(Box::new(handler));
        self
    }

    pub fn handler_count(&self, event: Event) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    /// Run every handler bound to `event`, stopping at the first error.
    pub fn dispatch(
        &self,
        event: Event,
        state: &mut FormState,
        hub: &dyn DatasetHub,
    ) -> Result<(), DataScoutError> {
        let handlers = self.handlers.get(&event).map_or(&[][..], Vec::as_slice);
        debug!(?event, handlers = handlers.len(), "dispatching");
        for handler in handlers {
            handler(state, hub)?;
        }
        Ok(())
    }
}

/// Column names offered by the export picker for the current selection.
///
/// Loads [`COLUMN_LIST_SPLIT`] of the selected dataset; no selection (or
/// an empty one) yields no columns.
pub fn column_choices(
    hub: &dyn DatasetHub,
    selected: Option<&str>,
) -> Result<Vec<String>, DataScoutError> {
    match selected {
        Some(dataset) if !dataset.is_empty() => Ok(hub
            .load_split(dataset, COLUMN_LIST_SPLIT)?
            .column_names()
            .to_vec()),
        _ => Ok(Vec::new()),
    }
}

fn on_search(state: &mut FormState, hub: &dyn DatasetHub) -> Result<(), DataScoutError> {
    state.results = search_datasets(hub, &state.query)?;
    Ok(())
}

fn on_dataset_changed(state: &mut FormState, hub: &dyn DatasetHub) -> Result<(), DataScoutError> {
    state.column_choices = column_choices(hub, state.selected.as_deref())?;
    Ok(())
}

fn on_explore(state: &mut FormState, hub: &dyn DatasetHub) -> Result<(), DataScoutError> {
    let dataset = selected_dataset(state)?;
    state.report = Some(explore_dataset(hub, dataset, state.split, state.num_examples)?);
    Ok(())
}

fn on_export(state: &mut FormState, hub: &dyn DatasetHub) -> Result<(), DataScoutError> {
    let dataset = selected_dataset(state)?;
    let column = state.column.as_deref().unwrap_or_default();
    state.export = Some(export_column(hub, dataset, state.split, column)?);
    Ok(())
}

fn selected_dataset(state: &FormState) -> Result<&str, DataScoutError> {
    state
        .selected
        .as_deref()
        .filter(|dataset| !dataset.is_empty())
        .ok_or(DataScoutError::NoDatasetSelected)
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::bail;
use tracing::{debug, warn};

use crate::client::ScanApi;
use crate::endpoints::Endpoints;
use crate::table::TableView;
use crate::types::{ExportKind, QueryParams, ScanResult};
use crate::ui::{Input, TextSink, Trigger, UiPort};

/// Status text shown for every kind of failed search.
pub const FAILURE_MESSAGE: &str = "Error while searching.";

/// What happened to one `initiate_search` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query was blank; nothing was sent and the UI was not touched.
    Skipped,
    /// Response applied; `rows` listings are now shown.
    Completed { rows: usize },
    /// Request failed; the failure message is shown.
    Failed,
    /// A newer search started before this one resolved; its response was dropped.
    Superseded,
}

impl SearchOutcome {
    /// Number of listings shown, or an error when the search did not apply a result.
    pub fn into_rows(self) -> anyhow::Result<usize> {
        match self {
            SearchOutcome::Completed { rows } => Ok(rows),
            SearchOutcome::Skipped => bail!("query is empty; nothing to search"),
            SearchOutcome::Failed => bail!("{FAILURE_MESSAGE}"),
            SearchOutcome::Superseded => bail!("search was superseded by a newer one"),
        }
    }
}

struct Slot<T> {
    /// Latest search started. Only its response may touch the UI.
    generation: u64,
    table: Option<T>,
}

/// Drives a [`UiPort`] from user actions: runs searches and dispatches exports.
pub struct Controller<U: UiPort, A: ScanApi> {
    ui: Arc<U>,
    api: A,
    endpoints: Endpoints,
    slot: Mutex<Slot<U::Table>>,
}

impl<U: UiPort, A: ScanApi> Controller<U, A> {
    pub fn new(ui: Arc<U>, api: A, endpoints: Endpoints) -> Self {
        Self {
            ui,
            api,
            endpoints,
            slot: Mutex::new(Slot {
                generation: 0,
                table: None,
            }),
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn has_table(&self) -> bool {
        self.lock_slot().table.is_some()
    }

    /// Read the inputs, query the backend once and show the result.
    ///
    /// Overlapping calls are allowed. Each call takes a new generation and
    /// only the newest one applies its response; older ones resolve as
    /// [`SearchOutcome::Superseded`] without touching the UI.
    pub async fn initiate_search(&self) -> SearchOutcome {
        let query = self.ui.read_input(Input::Query).trim().to_string();
        let pages = self.ui.read_input(Input::Pages);
        if query.is_empty() {
            return SearchOutcome::Skipped;
        }

        let generation = {
            let mut slot = self.lock_slot();
            slot.generation += 1;
            self.set_loading(true, Some(format!("Searching \"{query}\" ({pages} pages)…")));
            slot.generation
        };
        debug!(generation, %query, %pages, "search started");

        let res = self.api.scan(QueryParams { query, pages }).await;

        let mut slot = self.lock_slot();
        if slot.generation != generation {
            debug!(generation, latest = slot.generation, "dropping stale response");
            return SearchOutcome::Superseded;
        }
        match res {
            Ok(result) => {
                let rows = self.apply(&mut slot, result);
                self.set_loading(false, None);
                SearchOutcome::Completed { rows }
            }
            Err(e) => {
                warn!(error = %e, "search failed");
                self.set_loading(false, Some(FAILURE_MESSAGE.to_string()));
                SearchOutcome::Failed
            }
        }
    }

    /// Send the browsing context to the export endpoint for `kind`.
    /// Inputs are not validated; the returned URL is the one navigated to.
    pub fn navigate_to_export(&self, kind: ExportKind) -> String {
        let params = QueryParams {
            query: self.ui.read_input(Input::Query).trim().to_string(),
            pages: self.ui.read_input(Input::Pages),
        };
        let url = self.endpoints.export_url(kind, &params);
        debug!(%url, "navigating to export");
        self.ui.navigate(&url);
        url
    }

    /// Stats and table from the same response, under one lock.
    fn apply(&self, slot: &mut Slot<U::Table>, result: ScanResult) -> usize {
        let ScanResult { data, stats } = result;
        self.ui.set_text(TextSink::Min, stats.min_text());
        self.ui.set_text(TextSink::Max, stats.max_text());
        self.ui.set_text(TextSink::Avg, stats.avg_text());
        self.ui.set_text(TextSink::Count, stats.count_text());

        if let Some(old) = slot.table.take() {
            self.ui.unmount_table(old);
        }
        let rows = data.len();
        slot.table = Some(self.ui.mount_table(TableView::for_rows(data)));

        let exportable = rows > 0;
        self.ui.set_enabled(Trigger::ExportCsv, exportable);
        self.ui.set_enabled(Trigger::ExportXls, exportable);
        rows
    }

    fn set_loading(&self, loading: bool, msg: Option<String>) {
        if let Some(msg) = msg {
            self.ui.set_text(TextSink::Status, msg);
        }
        self.ui.show_busy(loading);
        if loading {
            self.ui.set_enabled(Trigger::Scan, false);
            self.ui.set_enabled(Trigger::ExportCsv, false);
            self.ui.set_enabled(Trigger::ExportXls, false);
        } else {
            self.ui.set_enabled(Trigger::Scan, true);
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot<U::Table>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! Line-oriented terminal surface for the controller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::table::TableView;
use crate::types::ExportKind;
use crate::ui::{Input, TextSink, Trigger, UiPort};

/// Longest text cell printed before it is cut.
const MAX_CELL: usize = 60;

#[derive(Debug)]
struct Fields {
    query: String,
    pages: String,
    texts: HashMap<TextSink, String>,
    enabled: HashMap<Trigger, bool>,
    busy: bool,
}

/// Handle to a table printed by [`TerminalUi`].
#[derive(Debug)]
pub struct TerminalTable {
    id: u64,
}

impl TerminalTable {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Holds the input fields in memory and prints everything else to stdout.
#[derive(Debug)]
pub struct TerminalUi {
    fields: Mutex<Fields>,
    downloader: Option<Downloader>,
    next_table: AtomicU64,
    live_tables: AtomicU64,
}

impl TerminalUi {
    /// Scan trigger enabled, exports disabled until a search returns rows.
    pub fn new(downloader: Option<Downloader>) -> Self {
        let enabled = HashMap::from([
            (Trigger::Scan, true),
            (Trigger::ExportCsv, false),
            (Trigger::ExportXls, false),
        ]);
        Self {
            fields: Mutex::new(Fields {
                query: String::new(),
                pages: "1".into(),
                texts: HashMap::new(),
                enabled,
                busy: false,
            }),
            downloader,
            next_table: AtomicU64::new(1),
            live_tables: AtomicU64::new(0),
        }
    }

    pub fn set_input(&self, input: Input, value: impl Into<String>) {
        let mut f = self.lock();
        match input {
            Input::Query => f.query = value.into(),
            Input::Pages => f.pages = value.into(),
        }
    }

    pub fn is_enabled(&self, trigger: Trigger) -> bool {
        self.lock().enabled.get(&trigger).copied().unwrap_or(false)
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Let background export downloads finish. No-op without a downloader.
    pub async fn settle_downloads(&self) {
        if let Some(d) = &self.downloader {
            d.settle().await;
        }
    }

    pub fn live_tables(&self) -> u64 {
        self.live_tables.load(Ordering::SeqCst)
    }

    /// One-line summary of inputs, stats and state.
    pub fn summary(&self) -> String {
        let f = self.lock();
        let text = |s: TextSink, d: &str| f.texts.get(&s).cloned().unwrap_or_else(|| d.to_string());
        format!(
            "query={:?} pages={:?} | min={} max={} avg={} count={} | {}",
            f.query,
            f.pages,
            text(TextSink::Min, "-"),
            text(TextSink::Max, "-"),
            text(TextSink::Avg, "-"),
            text(TextSink::Count, "0"),
            if f.busy { "busy" } else { "idle" },
        )
    }

    fn lock(&self) -> MutexGuard<'_, Fields> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UiPort for TerminalUi {
    type Table = TerminalTable;

    fn read_input(&self, input: Input) -> String {
        let f = self.lock();
        match input {
            Input::Query => f.query.clone(),
            Input::Pages => f.pages.clone(),
        }
    }

    fn set_text(&self, sink: TextSink, text: String) {
        if sink == TextSink::Status {
            println!("{text}");
        }
        self.lock().texts.insert(sink, text);
    }

    fn set_enabled(&self, trigger: Trigger, enabled: bool) {
        self.lock().enabled.insert(trigger, enabled);
    }

    fn show_busy(&self, busy: bool) {
        self.lock().busy = busy;
    }

    fn mount_table(&self, view: TableView) -> TerminalTable {
        let id = self.next_table.fetch_add(1, Ordering::SeqCst);
        self.live_tables.fetch_add(1, Ordering::SeqCst);
        {
            let f = self.lock();
            let text = |s: TextSink| f.texts.get(&s).cloned().unwrap_or_default();
            println!(
                "\nmin: {}  max: {}  avg: {}  count: {}",
                text(TextSink::Min),
                text(TextSink::Max),
                text(TextSink::Avg),
                text(TextSink::Count)
            );
        }
        print!("{}", render_table(&view));
        debug!(id, rows = view.rows.len(), "table mounted");
        TerminalTable { id }
    }

    fn unmount_table(&self, table: TerminalTable) {
        self.live_tables.fetch_sub(1, Ordering::SeqCst);
        debug!(id = table.id, "table torn down");
    }

    fn navigate(&self, url: &str) {
        println!("Export: {url}");
        if let Some(d) = &self.downloader {
            d.fetch(url.to_string());
        }
    }
}

/// Format a table view as aligned text: header, rule, then one line per row.
pub fn render_table(view: &TableView) -> String {
    let rows = view.sorted_rows();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            (0..view.columns.len())
                .map(|c| {
                    let text = view.cell(r, c).map(|cell| cell.to_string()).unwrap_or_default();
                    snip(text, c + 1 == view.columns.len())
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = view.columns.iter().map(|c| c.title.len()).collect();
    for line in &cells {
        for (w, cell) in widths.iter_mut().zip(line) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<&str> = view.columns.iter().map(|c| c.title).collect();
    push_line(&mut out, &widths, header.iter().copied());
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &widths, rule.iter().map(String::as_str));
    for line in &cells {
        push_line(&mut out, &widths, line.iter().map(String::as_str));
    }
    if cells.is_empty() {
        out.push_str("(no listings)\n");
    }
    out
}

fn push_line<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    let parts: Vec<String> = cells
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}", w = *w))
        .collect();
    out.push_str(parts.join("  ").trim_end());
    out.push('\n');
}

/// Links are printed whole; other cells are cut at `MAX_CELL` characters.
fn snip(s: String, is_link: bool) -> String {
    if is_link || s.chars().count() <= MAX_CELL {
        return s;
    }
    s.chars().take(MAX_CELL).collect()
}

/// Fetches export URLs in the background and stores the attachments.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: Client,
    dir: PathBuf,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Downloader {
    pub fn new(http: Client, dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            dir: dir.into(),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Detached: the outcome is logged, never returned.
    pub fn fetch(&self, url: String) {
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            warn!(%url, "no runtime, export not downloaded");
            return;
        };
        let this = self.clone();
        let handle = rt.spawn(async move {
            match this.download(&url).await {
                Ok(path) => info!(path = %path.display(), "export saved"),
                Err(e) => warn!(%url, error = %format!("{e:#}"), "export download failed"),
            }
        });
        let mut pending = self.lock_pending();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Wait until every download started so far has finished.
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.lock_pending());
            if handles.is_empty() {
                break;
            }
            for h in handles {
                let _ = h.await;
            }
        }
    }

    fn lock_pending(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch `url` and write the body into the download directory.
    pub async fn download(&self, url: &str) -> Result<PathBuf> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()?;
        let header = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let name = attachment_file_name(header.as_deref(), url);
        let body = resp.bytes().await.context("reading export body")?;

        let path = self.dir.join(name);
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// File name from `Content-Disposition`, else the backend's default for the endpoint in `url`.
pub fn attachment_file_name(content_disposition: Option<&str>, url: &str) -> String {
    let from_header = content_disposition.and_then(|h| {
        h.split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("filename="))
            .map(|v| v.trim_matches('"'))
            .and_then(|v| Path::new(v).file_name())
            .and_then(|v| v.to_str())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    });
    from_header.unwrap_or_else(|| {
        let kind = if url.contains("/export/xls") {
            ExportKind::Xls
        } else {
            ExportKind::Csv
        };
        kind.default_file_name().to_string()
    })
}

use crate::table::TableView;

/// Editable fields the controller reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Input {
    Query,
    Pages,
}

/// Text outputs the controller writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextSink {
    Status,
    Min,
    Max,
    Avg,
    Count,
}

/// Activatable elements whose enabled state the controller manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Scan,
    ExportCsv,
    ExportXls,
}

/// Display surface driven by [`Controller`](crate::controller::Controller).
///
/// Methods take `&self` so one surface can be shared between the event loop
/// and in-flight searches; implementations keep their own interior state.
pub trait UiPort: Send + Sync {
    /// Handle to a live table widget. Consumed by `unmount_table`.
    type Table: Send;

    fn read_input(&self, input: Input) -> String;
    fn set_text(&self, sink: TextSink, text: String);
    fn set_enabled(&self, trigger: Trigger, enabled: bool);
    fn show_busy(&self, busy: bool);
    fn mount_table(&self, view: TableView) -> Self::Table;
    fn unmount_table(&self, table: Self::Table);
    /// Hand the whole browsing context over to `url`. Nothing is reported back.
    fn navigate(&self, url: &str);
}

//! Table view model bound to one scan result.

use std::cmp::Ordering;

use serde_json::Value;

use crate::types::{value_text, Row};

/// Which row field a column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Price,
    Negotiable,
    Date,
    Location,
    Link,
}

impl Field {
    pub fn get(self, row: &Row) -> &Value {
        match self {
            Field::Price => &row.preco,
            Field::Negotiable => &row.negociavel,
            Field::Date => &row.data,
            Field::Location => &row.localizacao,
            Field::Link => &row.link,
        }
    }
}

/// How a cell is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRender {
    /// The raw value as text.
    Text,
    /// The raw value wrapped into an "open" action targeting it.
    OpenLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub title: &'static str,
    pub field: Field,
    pub render: CellRender,
}

/// Presentation of one rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Open { label: &'static str, href: String },
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Open { label, href } => write!(f, "{label} {href}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: usize,
    pub direction: Direction,
}

pub const OPEN_LABEL: &str = "open";

/// Column set shared by every table view, in display order.
pub const COLUMNS: [Column; 5] = [
    Column { title: "Price", field: Field::Price, render: CellRender::Text },
    Column { title: "Negotiable", field: Field::Negotiable, render: CellRender::Text },
    Column { title: "Date", field: Field::Date, render: CellRender::Text },
    Column { title: "Location", field: Field::Location, render: CellRender::Text },
    Column { title: "Link", field: Field::Link, render: CellRender::OpenLink },
];

/// Everything a `UiPort` needs to construct a table widget.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub rows: Vec<Row>,
    pub columns: Vec<Column>,
    pub order: SortOrder,
}

impl TableView {
    /// Five fixed columns, sorted ascending by price.
    pub fn for_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            columns: COLUMNS.to_vec(),
            order: SortOrder {
                column: 0,
                direction: Direction::Asc,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `None` when `column` is past the last column.
    pub fn cell(&self, row: &Row, column: usize) -> Option<Cell> {
        let col = self.columns.get(column)?;
        let raw = col.field.get(row);
        Some(match col.render {
            CellRender::Text => Cell::Text(value_text(raw)),
            CellRender::OpenLink => Cell::Open {
                label: OPEN_LABEL,
                href: value_text(raw),
            },
        })
    }

    /// Rows in display order according to `order`. Stable for equal keys.
    ///
    /// The sort type is chosen once for the whole column: numeric when every
    /// non-blank cell reads as a number, text otherwise.
    pub fn sorted_rows(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.rows.iter().collect();
        let Some(col) = self.columns.get(self.order.column) else {
            return rows;
        };
        let numeric = rows.iter().all(|r| {
            let v = col.field.get(r);
            is_blank(v) || as_number(v).is_some()
        });

        rows.sort_by(|a, b| {
            let (a, b) = (col.field.get(a), col.field.get(b));
            let ord = if numeric {
                compare_numbers(as_number(a), as_number(b))
            } else {
                value_text(a).cmp(&value_text(b))
            };
            match self.order.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });
        rows
    }
}

/// Blank cells first, then numbers in `total_cmp` order.
fn compare_numbers(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

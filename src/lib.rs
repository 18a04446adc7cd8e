//! A sortable, filterable, paginated table over a small in-memory dataset.
//!
//! [`TableViewModel`] owns the records and the view state and recomputes
//! filter → sort → paginate on every query. The remaining modules build a
//! terminal front end around it.

pub mod config;
pub mod controller;
pub mod domain;
pub mod engine;
pub mod expansion;
pub mod inputter;
pub mod loader;
pub mod model;
pub mod record;
pub mod ui;
pub mod view_model;

pub use config::{SortCollation, TableConfig};
pub use domain::TableError;
pub use expansion::{ExpansionMode, ExpansionState};
pub use record::{ColumnId, ColumnSpec, RawRecord, Record, RecordId, SortDirection};
pub use view_model::{TableViewModel, ViewState};

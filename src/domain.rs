use std::fmt;
use std::io::Error;

use polars::error::PolarsError;
use tracing_error::SpanTrace;

use crate::record::ColumnId;

pub const HELP_TEXT: &str = "\
q        quit
↑ ↓ j k  move row
← → h l  select column
n p      next / previous page
r        cycle page size
s        sort by selected column (again to flip)
Enter    expand / collapse row
e        expand / collapse all
/        global filter
f        filter selected column
c        clear all filters
y        copy row as csv
?        this help
Esc      close / cancel";

#[derive(Debug)]
pub enum TableError {
    IoError(Error),
    PolarsError(PolarsError),
    LoadingFailed {
        reason: String,
        span_trace: SpanTrace,
    },
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    InvalidPath(String),
    UnknownColumn(String),
    ColumnNotSortable(ColumnId),
    ColumnNotFilterable(ColumnId),
}

impl TableError {
    /// Loader failure with the span trace of the call site.
    pub fn loading_failed(reason: impl Into<String>) -> Self {
        TableError::LoadingFailed {
            reason: reason.into(),
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::IoError(e) => write!(f, "io error: {e}"),
            TableError::PolarsError(e) => write!(f, "could not read data: {e}"),
            TableError::LoadingFailed { reason, span_trace } => {
                write!(f, "loading failed: {reason}\n{span_trace}")
            }
            TableError::FileNotFound => write!(f, "file not found"),
            TableError::PermissionDenied => write!(f, "permission denied"),
            TableError::UnknownFileType => {
                write!(f, "unknown file type, expected csv, parquet or arrow")
            }
            TableError::InvalidPath(p) => write!(f, "invalid path: {p}"),
            TableError::UnknownColumn(c) => write!(f, "unknown column \"{c}\""),
            TableError::ColumnNotSortable(c) => write!(f, "column {c} is not sortable"),
            TableError::ColumnNotFilterable(c) => write!(f, "column {c} is not filterable"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::IoError(e) => Some(e),
            TableError::PolarsError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Error> for TableError {
    fn from(err: Error) -> Self {
        TableError::IoError(err)
    }
}

impl From<PolarsError> for TableError {
    fn from(err: PolarsError) -> Self {
        TableError::PolarsError(err)
    }
}

/// What the command line is currently collecting input for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    GlobalFilter,
    ColumnFilter(ColumnId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PreviousPage,
    CyclePageSize,
    Sort,
    ToggleExpand,
    ToggleExpandAll,
    GlobalFilter,
    ColumnFilter,
    ClearFilters,
    CopyRow,
    Help,
    Exit,
    RawKey(ratatui::crossterm::event::KeyEvent),
}

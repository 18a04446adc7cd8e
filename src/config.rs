use derive_setters::Setters;

use crate::expansion::ExpansionMode;
use crate::record::{ColumnId, ColumnSpec, SortDirection, default_columns};

/// How the `name` column is compared when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCollation {
    /// Byte order of the field as displayed, upper case first.
    #[default]
    Raw,
    /// Lower-cased sort key computed at load time.
    CaseInsensitive,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TableConfig {
    pub columns: Vec<ColumnSpec>,
    /// `None` shows every matching row on a single page.
    pub page_size: Option<usize>,
    pub page_size_options: Vec<usize>,
    pub expansion_mode: ExpansionMode,
    pub sort_column: ColumnId,
    pub sort_direction: SortDirection,
    pub collation: SortCollation,
    pub event_poll_time: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            columns: default_columns(),
            page_size: Some(2),
            page_size_options: vec![5, 10, 25],
            expansion_mode: ExpansionMode::Global,
            sort_column: ColumnId::Name,
            sort_direction: SortDirection::Ascending,
            collation: SortCollation::Raw,
            event_poll_time: 100,
        }
    }
}

impl TableConfig {
    /// Page size that follows `current` in the configured options, wrapping around.
    pub fn next_page_size(&self, current: Option<usize>) -> Option<usize> {
        if self.page_size_options.is_empty() {
            return current;
        }
        let next = current
            .and_then(|size| self.page_size_options.iter().position(|&o| o > size))
            .unwrap_or(0);
        Some(self.page_size_options[next])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_override_defaults() {
        let cfg = TableConfig::default()
            .with_page_size(None)
            .with_expansion_mode(ExpansionMode::PerRecord)
            .with_sort_direction(SortDirection::Descending);
        assert_eq!(cfg.page_size, None);
        assert_eq!(cfg.expansion_mode, ExpansionMode::PerRecord);
        assert_eq!(cfg.sort_direction, SortDirection::Descending);
        assert_eq!(cfg.columns.len(), 5);
    }

    #[test]
    fn page_size_cycles_through_options() {
        let cfg = TableConfig::default();
        assert_eq!(cfg.next_page_size(Some(2)), Some(5));
        assert_eq!(cfg.next_page_size(Some(5)), Some(10));
        assert_eq!(cfg.next_page_size(Some(10)), Some(25));
        assert_eq!(cfg.next_page_size(Some(25)), Some(5));
        assert_eq!(cfg.next_page_size(None), Some(5));
    }
}

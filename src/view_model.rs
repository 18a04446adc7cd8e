use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::config::{SortCollation, TableConfig};
use crate::domain::TableError;
use crate::engine;
use crate::expansion::ExpansionState;
use crate::record::{ColumnId, ColumnSpec, RawRecord, Record, RecordId, SortDirection};

/// The user-controlled parameters that drive the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub sort_column: ColumnId,
    pub sort_direction: SortDirection,
    pub column_filters: BTreeMap<ColumnId, String>,
    pub global_filter: String,
    pub page_index: usize,
    pub page_size: Option<usize>,
    pub expansion: ExpansionState,
}

/// Holds the dataset and the view state, and recomputes
/// filter → sort → paginate from the raw records on every query.
pub struct TableViewModel {
    records: Vec<Record>,
    columns: Vec<ColumnSpec>,
    collation: SortCollation,
    state: ViewState,
}

impl TableViewModel {
    pub fn new(raw: Vec<RawRecord>, config: &TableConfig) -> Self {
        let records: Vec<Record> = raw
            .into_iter()
            .enumerate()
            .map(|(id, r)| Record::from_raw(id, r))
            .collect();
        debug!("Table view model holds {} records", records.len());

        let mut sort_column = config.sort_column;
        if !config
            .columns
            .iter()
            .any(|c| c.id == sort_column && c.sortable)
        {
            let fallback = config
                .columns
                .iter()
                .find(|c| c.sortable)
                .map(|c| c.id)
                .unwrap_or(ColumnId::Name);
            warn!("Column {sort_column} is not sortable, sorting by {fallback}");
            sort_column = fallback;
        }

        TableViewModel {
            records,
            columns: config.columns.clone(),
            collation: config.collation,
            state: ViewState {
                sort_column,
                sort_direction: config.sort_direction,
                column_filters: BTreeMap::new(),
                global_filter: String::new(),
                page_index: 0,
                page_size: config.page_size.map(|s| s.max(1)),
                expansion: ExpansionState::new(config.expansion_mode),
            },
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn column_spec(&self, column: ColumnId) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.id == column)
    }

    // -------------------------- Queries ---------------------------------- //

    /// Filtered and sorted, not yet paginated.
    fn matching(&self) -> Vec<&Record> {
        let start_time = Instant::now();
        let filtered = engine::filter(
            &self.records,
            &self.state.column_filters,
            &self.state.global_filter,
        );
        let sorted = engine::sort(
            filtered,
            self.state.sort_column,
            self.state.sort_direction,
            self.collation,
        );
        trace!(
            "Pipeline matched {}/{} records in {}µs",
            sorted.len(),
            self.records.len(),
            start_time.elapsed().as_micros()
        );
        sorted
    }

    pub fn visible_page(&self) -> Vec<&Record> {
        let matching = self.matching();
        engine::paginate(&matching, self.state.page_index, self.state.page_size).to_vec()
    }

    pub fn total_match_count(&self) -> usize {
        engine::filter(
            &self.records,
            &self.state.column_filters,
            &self.state.global_filter,
        )
        .len()
    }

    /// Number of pages for the current matches, never less than one.
    pub fn page_count(&self) -> usize {
        match self.state.page_size {
            Some(size) => self.total_match_count().div_ceil(size).max(1),
            None => 1,
        }
    }

    pub fn is_expanded(&self, id: RecordId) -> bool {
        self.state.expansion.is_expanded(id)
    }

    // -------------------------- Mutators --------------------------------- //

    pub fn set_sort_column(&mut self, column: ColumnId) -> Result<(), TableError> {
        match self.column_spec(column) {
            Some(spec) if spec.sortable => {
                self.state.sort_column = column;
                trace!("Sort column: {column}");
                Ok(())
            }
            _ => Err(TableError::ColumnNotSortable(column)),
        }
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.state.sort_direction = direction;
        trace!("Sort direction: {direction:?}");
    }

    /// Same column flips the direction, another column starts ascending.
    pub fn request_sort(&mut self, column: ColumnId) -> Result<(), TableError> {
        let direction = if self.state.sort_column == column {
            self.state.sort_direction.flipped()
        } else {
            SortDirection::Ascending
        };
        self.set_sort_column(column)?;
        self.set_sort_direction(direction);
        Ok(())
    }

    /// An empty `text` removes the filter on `column`.
    pub fn set_column_filter(&mut self, column: ColumnId, text: &str) -> Result<(), TableError> {
        match self.column_spec(column) {
            Some(spec) if spec.filterable => {
                if text.is_empty() {
                    self.state.column_filters.remove(&column);
                } else {
                    self.state.column_filters.insert(column, text.to_string());
                }
                trace!("Column filters: {:?}", self.state.column_filters);
                Ok(())
            }
            _ => Err(TableError::ColumnNotFilterable(column)),
        }
    }

    pub fn set_global_filter(&mut self, text: &str) {
        self.state.global_filter = text.to_string();
        trace!("Global filter: \"{text}\"");
    }

    pub fn clear_filters(&mut self) {
        self.state.column_filters.clear();
        self.state.global_filter.clear();
        trace!("Cleared all filters");
    }

    /// Any index is accepted; one past the last page renders empty.
    pub fn set_page(&mut self, index: usize) {
        self.state.page_index = index;
        trace!("Page index: {index}");
    }

    pub fn next_page(&mut self) {
        let next = self.state.page_index.saturating_add(1);
        if next < self.page_count() {
            self.set_page(next);
        }
    }

    /// From past the end this lands on the last existing page.
    pub fn previous_page(&mut self) {
        if self.state.page_index > 0 {
            let last = self.page_count() - 1;
            self.set_page(std::cmp::min(self.state.page_index - 1, last));
        }
    }

    /// Sizes below one are raised to one. Always returns to the first page.
    pub fn set_page_size(&mut self, size: Option<usize>) {
        self.state.page_size = size.map(|s| s.max(1));
        self.state.page_index = 0;
        trace!("Page size: {:?}", self.state.page_size);
    }

    /// `Some(id)` toggles one record, `None` toggles every row on the current page.
    pub fn toggle_expansion(&mut self, id: Option<RecordId>) {
        match id {
            Some(id) => self.state.expansion.toggle(id),
            None => {
                let visible: Vec<RecordId> = self.visible_page().iter().map(|r| r.id).collect();
                self.state.expansion.toggle_all(visible);
            }
        }
    }
}

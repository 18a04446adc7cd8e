use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::config::TableConfig;
use crate::domain::{CMDMode, HELP_TEXT, Message, TableError};
use crate::expansion::ExpansionMode;
use crate::inputter::{InputResult, Inputter};
use crate::record::{ColumnId, RawRecord, Record, RecordId, SortDirection};
use crate::view_model::TableViewModel;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub label: String,
    pub sort: Option<SortDirection>,
    pub filter: Option<String>,
    pub sortable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: RecordId,
    pub cells: Vec<String>,
    pub detail: String,
    pub expanded: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageInfo {
    pub index: usize,
    pub count: usize,
    pub size: Option<usize>,
    pub matches: usize,
    pub total: usize,
}

/// Snapshot of everything the UI draws.
pub struct UIData {
    pub name: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub page: PageInfo,
    pub global_filter: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            selected_row: 0,
            selected_column: 0,
            page: PageInfo::default(),
            global_filter: String::new(),
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_update: Instant::now(),
        }
    }
}

pub struct Model {
    name: String,
    config: TableConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    view: TableViewModel,
    curser_row: usize,
    curser_column: usize,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    filter_before_edit: String,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
    uidata: UIData,
}

impl Model {
    pub fn init(name: impl Into<String>, config: &TableConfig, records: Vec<RawRecord>) -> Self {
        let clipboard = match Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Clipboard unavailable, copying is disabled: {e}");
                None
            }
        };
        Self::with_clipboard(name, config, records, clipboard)
    }

    pub fn with_clipboard(
        name: impl Into<String>,
        config: &TableConfig,
        records: Vec<RawRecord>,
        clipboard: Option<Clipboard>,
    ) -> Self {
        let view = TableViewModel::new(records, config);
        let status_message = format!("Loaded {} records, ? for help", view.records().len());
        let mut model = Self {
            name: name.into(),
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            view,
            curser_row: 0,
            curser_column: 0,
            clipboard,
            input: Inputter::default(),
            cmd_mode: None,
            filter_before_edit: String::new(),
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message,
            uidata: UIData::empty(),
        };
        model.update_uidata();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn view(&self) -> &TableViewModel {
        &self.view
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        info!("Quitting ...");
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TableError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(),
                    Message::MoveUp => self.move_selection_up(),
                    Message::MoveLeft => {
                        self.curser_column = self.curser_column.saturating_sub(1)
                    }
                    Message::MoveRight => {
                        let last = self.view.columns().len().saturating_sub(1);
                        self.curser_column = std::cmp::min(self.curser_column + 1, last);
                    }
                    Message::NextPage => {
                        self.view.next_page();
                        self.curser_row = 0;
                    }
                    Message::PreviousPage => {
                        self.view.previous_page();
                        self.curser_row = 0;
                    }
                    Message::CyclePageSize => self.cycle_page_size(),
                    Message::Sort => self.sort_current_column(),
                    Message::ToggleExpand => self.toggle_current_row(),
                    Message::ToggleExpandAll => self.view.toggle_expansion(None),
                    Message::GlobalFilter => self.enter_cmd_mode(CMDMode::GlobalFilter),
                    Message::ColumnFilter => self.enter_column_filter(),
                    Message::ClearFilters => {
                        self.view.clear_filters();
                        self.set_status_message("Cleared filters");
                    }
                    Message::CopyRow => self.copy_current_row(),
                    Message::Help => self.show_help(),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key)
                    }
                }
            }
        }

        self.clamp_cursor();
        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn current_column(&self) -> Option<ColumnId> {
        self.view.columns().get(self.curser_column).map(|c| c.id)
    }

    fn current_record(&self) -> Option<Record> {
        self.view.visible_page().get(self.curser_row).map(|r| (*r).clone())
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        trace!("Status: {}", self.status_message);
    }

    fn move_selection_down(&mut self) {
        let rows = self.view.visible_page().len();
        if self.curser_row + 1 < rows {
            self.curser_row += 1;
        } else if self.view.state().page_index.saturating_add(1) < self.view.page_count() {
            // Walking off the bottom continues on the next page.
            self.view.next_page();
            self.curser_row = 0;
        }
    }

    fn move_selection_up(&mut self) {
        if self.curser_row > 0 {
            self.curser_row -= 1;
        } else if self.view.state().page_index > 0 {
            self.view.previous_page();
            self.curser_row = self.view.visible_page().len().saturating_sub(1);
        }
    }

    fn clamp_cursor(&mut self) {
        let rows = self.view.visible_page().len();
        self.curser_row = std::cmp::min(self.curser_row, rows.saturating_sub(1));
    }

    fn cycle_page_size(&mut self) {
        let next = self.config.next_page_size(self.view.state().page_size);
        self.view.set_page_size(next);
        self.curser_row = 0;
        match next {
            Some(size) => self.set_status_message(format!("{size} rows per page")),
            None => self.set_status_message("Showing all rows"),
        }
    }

    fn sort_current_column(&mut self) {
        let Some(column) = self.current_column() else {
            return;
        };
        match self.view.request_sort(column) {
            Ok(()) => {
                let direction = self.view.state().sort_direction;
                self.set_status_message(format!("Sorted by {column} {direction:?}"));
            }
            Err(e) => {
                debug!("Sort rejected: {e}");
                self.set_status_message(e.to_string());
            }
        }
    }

    fn toggle_current_row(&mut self) {
        match self.view.state().expansion.mode() {
            ExpansionMode::Global => self.view.toggle_expansion(None),
            ExpansionMode::PerRecord => {
                if let Some(record) = self.current_record() {
                    self.view.toggle_expansion(Some(record.id));
                }
            }
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
    }

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
            self.uidata.show_popup = false;
        }
    }

    fn enter_column_filter(&mut self) {
        let Some(column) = self.current_column() else {
            return;
        };
        match self.view.column_spec(column) {
            Some(spec) if spec.filterable => self.enter_cmd_mode(CMDMode::ColumnFilter(column)),
            _ => self.set_status_message(TableError::ColumnNotFilterable(column).to_string()),
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;

        let state = self.view.state();
        self.filter_before_edit = match mode {
            CMDMode::GlobalFilter => state.global_filter.clone(),
            CMDMode::ColumnFilter(column) => {
                state.column_filters.get(&column).cloned().unwrap_or_default()
            }
        };
        self.input.start(&self.filter_before_edit);
        self.last_input = self.input.get();
    }

    // Filters follow every keystroke; Esc puts the old text back.
    fn raw_input(&mut self, key: KeyEvent) {
        if !self.active_cmdinput {
            return;
        }
        self.last_input = self.input.read(key);
        let text = if self.last_input.canceled {
            self.filter_before_edit.clone()
        } else {
            self.last_input.input.clone()
        };
        self.apply_filter(&text);
        if self.last_input.finished {
            self.leave_cmd_mode();
        }
    }

    fn apply_filter(&mut self, text: &str) {
        match self.cmd_mode {
            Some(CMDMode::GlobalFilter) => self.view.set_global_filter(text),
            Some(CMDMode::ColumnFilter(column)) => {
                if let Err(e) = self.view.set_column_filter(column, text) {
                    self.set_status_message(e.to_string());
                }
            }
            None => info!("Cmd mode is none!"),
        }
        self.curser_row = 0;
    }

    fn leave_cmd_mode(&mut self) {
        trace!("Leaving command mode, input \"{}\"", self.last_input.input);
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.cmd_mode = None;
        let matches = self.view.total_match_count();
        self.set_status_message(format!("{matches} matching records"));
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_escaping || needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn row_as_csv(record: &Record) -> String {
        let mut cells: Vec<String> = ColumnId::ALL
            .iter()
            .map(|c| Self::wrap_cell_content(&record.field(*c).to_string()))
            .collect();
        cells.push(Self::wrap_cell_content(&record.detail));
        cells.join(",")
    }

    fn copy_current_row(&mut self) {
        let Some(record) = self.current_record() else {
            return;
        };
        let row_content = Self::row_as_csv(&record);
        trace!("Row content: {}", row_content);

        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(row_content).map_err(|e| e.to_string()),
            None => Err("no clipboard".to_string()),
        };
        match result {
            Ok(_) => self.set_status_message(format!("Copied \"{}\"", record.name)),
            Err(e) => {
                warn!("Error copying to clipboard: {e}");
                self.set_status_message(format!("Copy failed: {e}"));
            }
        }
    }

    fn update_uidata(&mut self) {
        let state = self.view.state();
        let headers = self
            .view
            .columns()
            .iter()
            .map(|c| HeaderView {
                label: c.label.clone(),
                sort: (c.id == state.sort_column).then_some(state.sort_direction),
                filter: state.column_filters.get(&c.id).cloned(),
                sortable: c.sortable,
            })
            .collect();
        let rows = self
            .view
            .visible_page()
            .iter()
            .map(|r| RowView {
                id: r.id,
                cells: self
                    .view
                    .columns()
                    .iter()
                    .map(|c| r.field(c.id).to_string())
                    .collect(),
                detail: r.detail.clone(),
                expanded: self.view.is_expanded(r.id),
            })
            .collect();
        let page = PageInfo {
            index: state.page_index,
            count: self.view.page_count(),
            size: state.page_size,
            matches: self.view.total_match_count(),
            total: self.view.records().len(),
        };

        self.uidata = UIData {
            name: self.name.clone(),
            headers,
            rows,
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            page,
            global_filter: state.global_filter.clone(),
            show_popup: self.uidata.show_popup,
            popup_message: std::mem::take(&mut self.uidata.popup_message),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_update: Instant::now(),
        };
    }
}

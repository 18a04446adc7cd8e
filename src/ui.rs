use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::CMDMode;
use crate::model::{HeaderView, Model, UIData};
use crate::record::SortDirection;

pub const NUMERIC_COLUMN_WIDTH: u16 = 14;
pub const POPUP_WIDTH_PERCENT: u16 = 50;
pub const POPUP_HEIGHT_PERCENT: u16 = 70;

#[derive(Default)]
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [filter_area, table_area, footer_area, cmd_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(Self::filter_line(uidata), filter_area);
        self.render_table(uidata, frame, table_area);
        frame.render_widget(Self::footer_line(uidata), footer_area);
        Self::render_cmdline(uidata, frame, cmd_area);

        if uidata.show_popup {
            let area = popup_area(frame.area(), POPUP_WIDTH_PERCENT, POPUP_HEIGHT_PERCENT);
            frame.render_widget(Clear, area);
            frame.render_widget(
                Paragraph::new(uidata.popup_message.as_str())
                    .block(Block::bordered().title(" Help ")),
                area,
            );
        }
    }

    fn header_label(header: &HeaderView, selected: bool) -> Cell<'static> {
        let mut label = header.label.clone();
        match header.sort {
            Some(SortDirection::Ascending) => label.push_str(" ▲"),
            Some(SortDirection::Descending) => label.push_str(" ▼"),
            None => {}
        }
        if let Some(filter) = &header.filter {
            label.push_str(&format!(" [{filter}]"));
        }
        let mut style = Style::new().bold();
        if !header.sortable {
            style = style.dim();
        }
        if selected {
            style = style.reversed();
        }
        Cell::from(label).style(style)
    }

    fn render_table(&mut self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header = Row::new(
            uidata
                .headers
                .iter()
                .enumerate()
                .map(|(idx, h)| Self::header_label(h, idx == uidata.selected_column)),
        );

        // Expanded records take a second line for their detail text, so the
        // selected record maps to a different table row.
        let mut rows = Vec::with_capacity(uidata.rows.len() * 2);
        let mut selected = None;
        for (idx, row) in uidata.rows.iter().enumerate() {
            if idx == uidata.selected_row {
                selected = Some(rows.len());
            }
            let marker = if row.expanded { "▾ " } else { "▸ " };
            let cells = row.cells.iter().enumerate().map(|(cidx, c)| {
                if cidx == 0 {
                    Cell::from(format!("{marker}{c}"))
                } else {
                    Cell::from(c.clone())
                }
            });
            rows.push(Row::new(cells));
            if row.expanded {
                rows.push(Row::new(vec![Cell::from(format!("    {}", row.detail)).italic()]));
            }
        }

        let widths = uidata.headers.iter().enumerate().map(|(idx, _)| {
            if idx == 0 {
                Constraint::Fill(1)
            } else {
                Constraint::Length(NUMERIC_COLUMN_WIDTH)
            }
        });

        let title = format!(" {} ", uidata.name);
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::bordered().title(title))
            .row_highlight_style(Style::new().reversed());

        self.table_state.select(selected);
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn filter_line(uidata: &UIData) -> Paragraph<'static> {
        let text = if uidata.global_filter.is_empty() {
            "Filter: -".to_string()
        } else {
            format!("Filter: {}", uidata.global_filter)
        };
        Paragraph::new(text).right_aligned()
    }

    fn footer_line(uidata: &UIData) -> Paragraph<'static> {
        let page = &uidata.page;
        let paging = match page.size {
            Some(size) => format!(
                "Page {}/{} · {} per page",
                page.index + 1,
                page.count,
                size
            ),
            None => "All rows".to_string(),
        };
        Paragraph::new(Line::from(vec![
            Span::from(paging),
            Span::from(format!(" · {} of {} records", page.matches, page.total)),
        ]))
    }

    fn render_cmdline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = match uidata.cmd_mode {
                Some(CMDMode::GlobalFilter) => "/".to_string(),
                Some(CMDMode::ColumnFilter(column)) => format!("{column}: "),
                None => "> ".to_string(),
            };
            let line = Line::from(vec![
                Span::from(prompt.clone()).bold(),
                Span::from(uidata.cmdinput.input.clone()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let offset = prompt.chars().count() + uidata.cmdinput.curser_pos;
            frame.set_cursor_position((cursor_column(area, offset), area.y));
        } else {
            frame.render_widget(Paragraph::new(uidata.status_message.clone()).dim(), area);
        }
    }
}

/// Column for a cursor `offset` characters into `area`, kept inside it.
fn cursor_column(area: Rect, offset: usize) -> u16 {
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    area.x
        .saturating_add(offset)
        .min(area.right().saturating_sub(1))
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, vertical, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, horizontal, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vertical);
    horizontal
}

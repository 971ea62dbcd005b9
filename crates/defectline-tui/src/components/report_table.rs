use crossterm::event::{KeyCode, KeyEvent};
use defectline_core::{department_label, DefectReport, Department};
use ratatui::prelude::*;
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};

const DESCRIPTION_COLUMN_CHARS: usize = 40;

/// The report listing. `rows` is `None` while a fetch is in flight (or
/// has failed); listing failures never get their own message, the
/// placeholder just stays up.
pub struct ReportTable {
    rows: Option<Vec<DefectReport>>,
    table_state: TableState,
}

impl Default for ReportTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTable {
    pub fn new() -> Self {
        Self {
            rows: None,
            table_state: TableState::default(),
        }
    }

    pub fn rows(&self) -> Option<&[DefectReport]> {
        self.rows.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.rows.is_none()
    }

    pub fn set_loading(&mut self) {
        self.rows = None;
    }

    /// Replace the listing, keeping the selection in range.
    pub fn set_rows(&mut self, rows: Vec<DefectReport>) {
        let selected = self
            .table_state
            .selected()
            .unwrap_or(0)
            .min(rows.len().saturating_sub(1));
        if rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(selected));
        }
        self.rows = Some(rows);
    }

    pub fn selected_report(&self) -> Option<&DefectReport> {
        let rows = self.rows.as_ref()?;
        rows.get(self.table_state.selected()?)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let len = self.rows.as_ref().map_or(0, Vec::len);
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.table_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.table_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') => self.table_state.select(Some(0)),
            KeyCode::Char('G') => self.table_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, filter: Option<Department>) {
        let rows = match &self.rows {
            None => {
                frame.render_widget(
                    Paragraph::new("Loading reports…")
                        .style(Style::default().fg(Color::DarkGray)),
                    area,
                );
                return;
            }
            Some(rows) => rows,
        };

        if rows.is_empty() {
            let message = match filter {
                None => "No defects have been reported yet.".to_string(),
                Some(dept) => format!("No defects reported in {}.", dept.display_name()),
            };
            frame.render_widget(
                Paragraph::new(message).style(Style::default().fg(Color::DarkGray)),
                area,
            );
            return;
        }

        let header = Row::new(vec![
            "ID",
            "Product",
            "Department",
            "Description",
            "Employee",
            "Date",
            "Photo",
        ])
        .style(Style::default().fg(Color::Cyan).bold());

        let body = rows.iter().map(|report| {
            Row::new(vec![
                Cell::from(report.id.to_string()),
                Cell::from(report.product_name.clone()),
                Cell::from(department_label(&report.department).to_string()),
                Cell::from(truncate(&report.description, DESCRIPTION_COLUMN_CHARS)),
                Cell::from(report.employee_id.clone()),
                Cell::from(report.format_timestamp()),
                Cell::from(if report.photo.is_some() { "[img]" } else { "  -  " }),
            ])
        });

        let table = Table::new(
            body,
            [
                Constraint::Length(5),
                Constraint::Min(12),
                Constraint::Length(26),
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(18),
                Constraint::Length(5),
            ],
        )
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray).bold());

        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

/// Display-only truncation; the underlying description is never elided.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn report(id: u64) -> DefectReport {
        DefectReport {
            id,
            product_name: format!("P{id}"),
            department: "cutting".into(),
            employee_id: "E1".into(),
            description: "d".into(),
            timestamp_ns: 0,
            photo: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn starts_loading() {
        let table = ReportTable::new();
        assert!(table.is_loading());
        assert!(table.selected_report().is_none());
    }

    #[test]
    fn set_rows_selects_first() {
        let mut table = ReportTable::new();
        table.set_rows(vec![report(1), report(2)]);
        assert_eq!(table.selected_report().map(|r| r.id), Some(1));
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut table = ReportTable::new();
        table.set_rows(vec![report(1), report(2)]);
        table.handle_key(key(KeyCode::Char('j')));
        table.handle_key(key(KeyCode::Char('j')));
        assert_eq!(table.selected_report().map(|r| r.id), Some(2));
        table.handle_key(key(KeyCode::Char('g')));
        assert_eq!(table.selected_report().map(|r| r.id), Some(1));
        table.handle_key(key(KeyCode::Char('k')));
        assert_eq!(table.selected_report().map(|r| r.id), Some(1));
    }

    #[test]
    fn refresh_clamps_selection() {
        let mut table = ReportTable::new();
        table.set_rows(vec![report(1), report(2), report(3)]);
        table.handle_key(key(KeyCode::Char('G')));
        table.set_rows(vec![report(1)]);
        assert_eq!(table.selected_report().map(|r| r.id), Some(1));
        table.set_rows(vec![]);
        assert!(table.selected_report().is_none());
    }

    #[test]
    fn truncate_is_display_only() {
        assert_eq!(truncate("short", 40), "short");
        let long = "x".repeat(50);
        let shown = truncate(&long, 40);
        assert_eq!(shown.chars().count(), 41);
        assert!(shown.ends_with('…'));
    }
}

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use defectline_core::Department;
use defectline_service::{BlockingClient, QueryKey, SubmissionHandle, SubmitState};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

use crate::components::report_table::ReportTable;
use crate::components::submit_form::{FormField, SubmitForm};

/// How long the success banner stays up after a submission completes.
pub const SUCCESS_BANNER_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Submit,
    Reports,
}

/// Modal state layered over the current page.
pub enum Mode {
    Normal,
    DepartmentPick { list_state: ListState },
    FilterPick { list_state: ListState },
    PhotoView { url: String, size: Option<usize> },
}

pub struct App {
    client: BlockingClient,
    page: Page,
    mode: Mode,
    form: SubmitForm,
    table: ReportTable,
    filter: Option<Department>,
    submission: Option<SubmissionHandle>,
    success_until: Option<Instant>,
}

impl App {
    pub fn new(client: BlockingClient) -> Self {
        Self {
            client,
            page: Page::Submit,
            mode: Mode::Normal,
            form: SubmitForm::new(),
            table: ReportTable::new(),
            filter: None,
            submission: None,
            success_until: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn form(&self) -> &SubmitForm {
        &self.form
    }

    pub fn table(&self) -> &ReportTable {
        &self.table
    }

    pub fn filter(&self) -> Option<Department> {
        self.filter
    }

    pub fn submit_status(&self) -> SubmitState {
        self.submission
            .as_ref()
            .map(|s| s.state())
            .unwrap_or(SubmitState::Idle)
    }

    pub fn success_visible(&self) -> bool {
        self.success_until.is_some()
    }

    /// True while something time-driven is pending and the event loop
    /// should poll with a timeout instead of blocking on input.
    pub fn needs_polling(&self) -> bool {
        self.submission.is_some() || self.success_until.is_some()
    }

    /// True when plain characters should edit a form field rather than
    /// act as shortcuts ('q' must not quit mid-typing).
    pub fn is_input_mode(&self) -> bool {
        self.page == Page::Submit
            && matches!(self.mode, Mode::Normal)
            && self.form.focused().is_text()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.mode {
            Mode::Normal => self.handle_normal(key),
            Mode::DepartmentPick { .. } => self.handle_department_pick(key),
            Mode::FilterPick { .. } => self.handle_filter_pick(key),
            Mode::PhotoView { .. } => {
                // Any key dismisses the overlay.
                self.mode = Mode::Normal;
            }
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.page = match self.page {
                    Page::Submit => {
                        self.refresh_reports();
                        Page::Reports
                    }
                    Page::Reports => Page::Submit,
                };
                return;
            }
            _ => {}
        }
        match self.page {
            Page::Submit => self.handle_submit_page(key),
            Page::Reports => self.handle_reports_page(key),
        }
    }

    fn handle_submit_page(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down => self.form.focus_next(),
            KeyCode::Up => self.form.focus_prev(),
            KeyCode::Enter => match self.form.focused() {
                FormField::Department => {
                    let mut list_state = ListState::default();
                    let selected = self
                        .form
                        .department()
                        .and_then(|d| Department::ALL.iter().position(|&x| x == d))
                        .unwrap_or(0);
                    list_state.select(Some(selected));
                    self.mode = Mode::DepartmentPick { list_state };
                }
                FormField::Submit => self.try_submit(),
                _ => self.form.focus_next(),
            },
            _ => {
                self.form.handle_edit(key);
            }
        }
    }

    fn handle_reports_page(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('f') => {
                let mut list_state = ListState::default();
                let selected = self
                    .filter
                    .and_then(|d| Department::ALL.iter().position(|&x| x == d))
                    .map(|i| i + 1)
                    .unwrap_or(0);
                list_state.select(Some(selected));
                self.mode = Mode::FilterPick { list_state };
            }
            KeyCode::Char('r') => {
                self.client.invalidate_reports();
                self.refresh_reports();
            }
            KeyCode::Enter => {
                if let Some(blob) = self
                    .table
                    .selected_report()
                    .and_then(|r| r.photo.clone())
                {
                    let url = self.client.direct_url(&blob);
                    let size = match self.client.fetch_photo(&blob) {
                        Ok(bytes) => Some(bytes.len()),
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to fetch photo");
                            None
                        }
                    };
                    self.mode = Mode::PhotoView { url, size };
                }
            }
            _ => self.table.handle_key(key),
        }
    }

    fn handle_department_pick(&mut self, key: KeyEvent) {
        let Mode::DepartmentPick { list_state } = &mut self.mode else {
            return;
        };
        let len = Department::ALL.len();
        let current = list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                list_state.select(Some((current + 1).min(len - 1)));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                list_state.select(Some(current.saturating_sub(1)));
            }
            KeyCode::Enter => {
                self.form.set_department(Department::ALL[current]);
                self.mode = Mode::Normal;
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    fn handle_filter_pick(&mut self, key: KeyEvent) {
        let Mode::FilterPick { list_state } = &mut self.mode else {
            return;
        };
        // Entry 0 is "All departments", then one per department.
        let len = Department::ALL.len() + 1;
        let current = list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                list_state.select(Some((current + 1).min(len - 1)));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                list_state.select(Some(current.saturating_sub(1)));
            }
            KeyCode::Enter => {
                self.filter = if current == 0 {
                    None
                } else {
                    Some(Department::ALL[current - 1])
                };
                self.mode = Mode::Normal;
                self.refresh_reports();
            }
            KeyCode::Esc => self.mode = Mode::Normal,
            _ => {}
        }
    }

    /// Start a submission if the form is complete and nothing is in
    /// flight. A photo path that fails to read aborts the attempt; the
    /// error goes to the log and the form stays filled.
    fn try_submit(&mut self) {
        if self.submission.is_some() || !self.form.is_complete() {
            return;
        }
        let photo = if self.form.photo_path().trim().is_empty() {
            None
        } else {
            match std::fs::read(self.form.photo_path().trim()) {
                Ok(data) => Some(bytes::Bytes::from(data)),
                Err(e) => {
                    tracing::error!(
                        path = self.form.photo_path(),
                        error = %e,
                        "failed to read photo file"
                    );
                    return;
                }
            }
        };
        let report = self.form.to_new_report();
        self.submission = Some(self.client.submit(report, photo));
    }

    /// Advance time-driven state: settle finished submissions and expire
    /// the success banner. Called from the event loop on poll timeouts.
    pub fn on_tick(&mut self) {
        if let Some(handle) = &self.submission {
            match handle.state() {
                SubmitState::Succeeded { id } => {
                    tracing::info!(id, "defect report submitted");
                    self.submission = None;
                    self.form.clear();
                    self.success_until = Some(Instant::now() + SUCCESS_BANNER_DURATION);
                    if self.page == Page::Reports {
                        self.refresh_reports();
                    }
                }
                SubmitState::Failed => {
                    self.submission = None;
                }
                _ => {}
            }
        }
        if let Some(until) = self.success_until {
            if Instant::now() >= until {
                self.success_until = None;
            }
        }
    }

    fn query_key(&self) -> QueryKey {
        match self.filter {
            None => QueryKey::AllReports,
            Some(dept) => QueryKey::ByDepartment(dept.as_str().to_string()),
        }
    }

    /// Fetch the listing for the current filter. On failure the table is
    /// left in its loading state; the error only reaches the log.
    pub fn refresh_reports(&mut self) {
        self.table.set_loading();
        match self.client.reports(&self.query_key()) {
            Ok(rows) => self.table.set_rows(rows),
            Err(e) => tracing::error!(error = %e, "failed to load reports"),
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_tabs(frame, chunks[0]);
        match self.page {
            Page::Submit => {
                let status = self.submit_status();
                self.form
                    .render(frame, chunks[1], &status, self.success_visible());
            }
            Page::Reports => self.render_reports(frame, chunks[1]),
        }
        self.render_status_bar(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::DepartmentPick { .. } => self.render_department_pick(frame),
            Mode::FilterPick { .. } => self.render_filter_pick(frame),
            Mode::PhotoView { url, size } => render_photo_view(frame, url, *size),
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let tab = |label: &str, active: bool| {
            if active {
                Span::styled(
                    format!(" {label} "),
                    Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
                )
            } else {
                Span::styled(format!(" {label} "), Style::default().fg(Color::Gray))
            }
        };
        let line = Line::from(vec![
            Span::styled("Defect Line ", Style::default().fg(Color::Cyan).bold()),
            tab("Report Defect", self.page == Page::Submit),
            tab("Browse Reports", self.page == Page::Reports),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_reports(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        let summary = match self.filter {
            None => "Filter: all departments".to_string(),
            Some(dept) => format!("Filter: {}", dept.display_name()),
        };
        frame.render_widget(
            Paragraph::new(summary).style(Style::default().fg(Color::Gray)),
            chunks[0],
        );
        self.table.render(frame, chunks[1], self.filter);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints = match (&self.mode, self.page) {
            (Mode::Normal, Page::Submit) => {
                "Tab: browse reports | ↑/↓: move | Enter: select/submit | Ctrl-C: quit"
            }
            (Mode::Normal, Page::Reports) => {
                "Tab: report defect | j/k: move | f: filter | r: refresh | Enter: photo | q: quit"
            }
            (Mode::DepartmentPick { .. } | Mode::FilterPick { .. }, _) => {
                "j/k: move | Enter: select | Esc: cancel"
            }
            (Mode::PhotoView { .. }, _) => "any key: close",
        };
        frame.render_widget(
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }

    fn render_department_pick(&mut self, frame: &mut Frame) {
        let Mode::DepartmentPick { list_state } = &mut self.mode else {
            return;
        };
        let items: Vec<ListItem> = Department::ALL
            .iter()
            .map(|d| ListItem::new(d.display_name()))
            .collect();
        render_pick_list(frame, " Select Department ", items, list_state);
    }

    fn render_filter_pick(&mut self, frame: &mut Frame) {
        let Mode::FilterPick { list_state } = &mut self.mode else {
            return;
        };
        let mut items = vec![ListItem::new("All departments")];
        items.extend(
            Department::ALL
                .iter()
                .map(|d| ListItem::new(d.display_name())),
        );
        render_pick_list(frame, " Filter by Department ", items, list_state);
    }
}

fn render_pick_list(
    frame: &mut Frame,
    title: &str,
    items: Vec<ListItem>,
    list_state: &mut ListState,
) {
    let area = centered_rect(40, (items.len() as u16) + 2, frame.area());
    frame.render_widget(Clear, area);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold());
    frame.render_stateful_widget(list, area, list_state);
}

fn render_photo_view(frame: &mut Frame, url: &str, size: Option<usize>) {
    let area = centered_rect(60, 6, frame.area());
    frame.render_widget(Clear, area);
    let size_line = match size {
        Some(n) => format!("{:.1} KiB", n as f64 / 1024.0),
        None => "(unavailable)".to_string(),
    };
    let text = vec![
        Line::from(Span::styled("Photo", Style::default().fg(Color::Cyan).bold())),
        Line::from(format!("URL:  {url}")),
        Line::from(format!("Size: {size_line}")),
    ];
    frame.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Attachment ")),
        area,
    );
}

fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}

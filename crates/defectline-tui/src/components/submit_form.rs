use crossterm::event::{KeyCode, KeyEvent};
use defectline_core::{Department, NewDefectReport};
use defectline_service::SubmitState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

/// Focusable parts of the submission form, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ProductName,
    Department,
    EmployeeId,
    Description,
    PhotoPath,
    Submit,
}

impl FormField {
    pub const ORDER: &[FormField] = &[
        FormField::ProductName,
        FormField::Department,
        FormField::EmployeeId,
        FormField::Description,
        FormField::PhotoPath,
        FormField::Submit,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|&f| f == self).unwrap_or(0)
    }

    pub fn next(self) -> FormField {
        let i = self.index();
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> FormField {
        let i = self.index();
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// Whether the field takes typed text.
    pub fn is_text(self) -> bool {
        !matches!(self, FormField::Department | FormField::Submit)
    }
}

/// The defect submission form. Owns the field values and focus; the
/// submit action stays disabled until the four required fields are
/// non-empty (photo is optional).
pub struct SubmitForm {
    product_name: String,
    department: Option<Department>,
    employee_id: String,
    description: String,
    photo_path: String,
    focus: FormField,
}

impl Default for SubmitForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitForm {
    pub fn new() -> Self {
        Self {
            product_name: String::new(),
            department: None,
            employee_id: String::new(),
            description: String::new(),
            photo_path: String::new(),
            focus: FormField::ProductName,
        }
    }

    pub fn focused(&self) -> FormField {
        self.focus
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn department(&self) -> Option<Department> {
        self.department
    }

    pub fn set_department(&mut self, dept: Department) {
        self.department = Some(dept);
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn photo_path(&self) -> &str {
        &self.photo_path
    }

    /// Route a typed character or backspace into the focused text field.
    /// Returns false for keys the form does not consume.
    pub fn handle_edit(&mut self, key: KeyEvent) -> bool {
        let field = match self.focus {
            FormField::ProductName => &mut self.product_name,
            FormField::EmployeeId => &mut self.employee_id,
            FormField::Description => &mut self.description,
            FormField::PhotoPath => &mut self.photo_path,
            FormField::Department | FormField::Submit => return false,
        };
        match key.code {
            KeyCode::Char(c) => {
                field.push(c);
                true
            }
            KeyCode::Backspace => {
                field.pop();
                true
            }
            _ => false,
        }
    }

    pub fn to_new_report(&self) -> NewDefectReport {
        NewDefectReport {
            product_name: self.product_name.trim().to_string(),
            department: self
                .department
                .map(|d| d.as_str().to_string())
                .unwrap_or_default(),
            employee_id: self.employee_id.trim().to_string(),
            description: self.description.trim().to_string(),
            photo: None,
        }
    }

    /// Submit-enable guard: all four required fields present, photo or
    /// not.
    pub fn is_complete(&self) -> bool {
        self.to_new_report().is_complete()
    }

    /// Reset every field after a successful submission.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        status: &SubmitState,
        success_visible: bool,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Defect Information ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // product
                Constraint::Length(2), // department
                Constraint::Length(2), // employee
                Constraint::Length(2), // description
                Constraint::Length(2), // photo path
                Constraint::Length(1), // progress / spacer
                Constraint::Length(1), // success banner
                Constraint::Length(1), // submit
                Constraint::Min(0),
            ])
            .split(inner);

        self.render_text_field(frame, rows[0], FormField::ProductName, "Product Name *", &self.product_name);
        let dept_value = self
            .department
            .map(|d| d.display_name().to_string())
            .unwrap_or_else(|| "(select department)".into());
        self.render_value_field(frame, rows[1], FormField::Department, "Department *", &dept_value);
        self.render_text_field(frame, rows[2], FormField::EmployeeId, "Employee ID *", &self.employee_id);
        self.render_text_field(frame, rows[3], FormField::Description, "Defect Description *", &self.description);
        self.render_text_field(frame, rows[4], FormField::PhotoPath, "Photo (optional, file path)", &self.photo_path);

        match status {
            SubmitState::Uploading { percent } => {
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(Color::Cyan))
                    .percent(u16::from(*percent))
                    .label(format!("Uploading photo… {percent}%"));
                frame.render_widget(gauge, rows[5]);
            }
            SubmitState::Submitting | SubmitState::Validating => {
                frame.render_widget(
                    Paragraph::new("Submitting…").style(Style::default().fg(Color::Yellow)),
                    rows[5],
                );
            }
            _ => {}
        }

        if success_visible {
            frame.render_widget(
                Paragraph::new("✔ Defect report submitted successfully!")
                    .style(Style::default().fg(Color::Green).bold()),
                rows[6],
            );
        }

        let enabled = self.is_complete() && matches!(status, SubmitState::Idle);
        let button_style = if !enabled {
            Style::default().fg(Color::DarkGray)
        } else if self.focus == FormField::Submit {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Cyan).bold()
        };
        frame.render_widget(
            Paragraph::new("[ Submit Defect Report ]").style(button_style),
            rows[7],
        );
    }

    fn render_text_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        field: FormField,
        label: &str,
        value: &str,
    ) {
        let cursor = if self.focus == field { "▏" } else { "" };
        self.render_line(frame, area, field, label, &format!("{value}{cursor}"));
    }

    fn render_value_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        field: FormField,
        label: &str,
        value: &str,
    ) {
        self.render_line(frame, area, field, label, value);
    }

    fn render_line(
        &self,
        frame: &mut Frame,
        area: Rect,
        field: FormField,
        label: &str,
        value: &str,
    ) {
        let label_style = if self.focus == field {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let lines = vec![
            Line::from(Span::styled(label.to_string(), label_style)),
            Line::from(Span::raw(value.to_string())),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;

    fn char_key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn filled() -> SubmitForm {
        let mut form = SubmitForm::new();
        for c in "Widget-7".chars() {
            form.handle_edit(char_key(c));
        }
        form.set_department(Department::Cutting);
        form.focus = FormField::EmployeeId;
        for c in "E123".chars() {
            form.handle_edit(char_key(c));
        }
        form.focus = FormField::Description;
        for c in "Crack on edge".chars() {
            form.handle_edit(char_key(c));
        }
        form
    }

    #[test]
    fn focus_cycles_through_all_fields() {
        let mut form = SubmitForm::new();
        for &expected in FormField::ORDER {
            assert_eq!(form.focused(), expected);
            form.focus_next();
        }
        assert_eq!(form.focused(), FormField::ProductName);
        form.focus_prev();
        assert_eq!(form.focused(), FormField::Submit);
    }

    #[test]
    fn typing_edits_focused_field_only() {
        let mut form = SubmitForm::new();
        form.handle_edit(char_key('a'));
        assert_eq!(form.product_name(), "a");
        assert_eq!(form.employee_id(), "");

        form.handle_edit(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(form.product_name(), "");
    }

    #[test]
    fn department_field_does_not_take_text() {
        let mut form = SubmitForm::new();
        form.focus = FormField::Department;
        assert!(!form.handle_edit(char_key('x')));
        assert_eq!(form.department(), None);
    }

    #[test]
    fn incomplete_until_all_required_fields_set() {
        let mut form = SubmitForm::new();
        assert!(!form.is_complete());

        form = filled();
        assert!(form.is_complete());

        // Photo path never gates completeness.
        form.focus = FormField::PhotoPath;
        for c in "/tmp/photo.png".chars() {
            form.handle_edit(char_key(c));
        }
        assert!(form.is_complete());
    }

    #[test]
    fn missing_department_blocks_submit() {
        let mut form = filled();
        form.department = None;
        assert!(!form.is_complete());
    }

    #[test]
    fn to_new_report_trims_and_maps_department() {
        let mut form = filled();
        form.focus = FormField::ProductName;
        form.handle_edit(char_key(' '));
        let report = form.to_new_report();
        assert_eq!(report.product_name, "Widget-7");
        assert_eq!(report.department, "cutting");
        assert_eq!(report.photo, None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut form = filled();
        form.clear();
        assert_eq!(form.product_name(), "");
        assert_eq!(form.department(), None);
        assert_eq!(form.focused(), FormField::ProductName);
        assert!(!form.is_complete());
    }
}

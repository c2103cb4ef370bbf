use crate::app::{AppMsg, FormController};
use crate::model::{FieldName, FieldValue, ServiceTag};
use crate::widgets::form::{FieldKind, FormState, SUBMIT_IDX};
use chrono::NaiveDate;
use crossterm::event::KeyCode;

const DATE_LEN: usize = 10;
const BUDGET_LEN: usize = 9;

#[derive(Default)]
pub struct FormWidget {
    pub form: FormState,
}

impl FormWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops local edit state that no longer matches the draft (after a reset or success).
    pub fn sync(&mut self, ctl: &FormController) {
        if !ctl.phase().accepts_edits() {
            self.form.editing = false;
        }
        if ctl.draft().is_untouched() {
            self.form.budget_text.clear();
        }
    }

    fn move_up(&mut self) {
        self.form.editing = false;
        self.form.selected = self.form.selected.saturating_sub(1);
    }

    fn move_down(&mut self) {
        self.form.editing = false;
        if self.form.selected < SUBMIT_IDX {
            self.form.selected += 1;
        }
    }

    pub fn on_key(&mut self, key: KeyCode, ctl: &FormController, today: NaiveDate) -> Vec<AppMsg> {
        let mut msgs: Vec<AppMsg> = Vec::new();
        let enabled = ctl.phase().accepts_edits();
        let spec = self.form.selected_spec();

        if !enabled {
            // Inputs are locked while a request is in flight; navigation still works.
            match key {
                KeyCode::Up => self.move_up(),
                KeyCode::Down | KeyCode::Tab => self.move_down(),
                _ => {}
            }
            return msgs;
        }

        if self.form.editing {
            let Some(spec) = spec else {
                self.form.editing = false;
                return msgs;
            };
            match spec.kind {
                FieldKind::MultiSelect => match key {
                    KeyCode::Up => {
                        self.form.option_cursor = self.form.option_cursor.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        if self.form.option_cursor + 1 < ServiceTag::ALL.len() {
                            self.form.option_cursor += 1;
                        }
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        if let Some(tag) = ServiceTag::ALL.get(self.form.option_cursor) {
                            msgs.push(AppMsg::UpdateField {
                                field: FieldName::Services,
                                value: FieldValue::Tags(ctl.draft().toggle_service(*tag)),
                            });
                        }
                    }
                    KeyCode::Esc | KeyCode::Tab => self.form.editing = false,
                    _ => {}
                },
                FieldKind::Text | FieldKind::Number | FieldKind::Date => match key {
                    KeyCode::Char(c) => {
                        if let Some(next) = self.push_char(spec.name, spec.kind, c, ctl) {
                            msgs.push(next);
                        }
                    }
                    KeyCode::Backspace => {
                        if let Some(next) = self.pop_char(spec.name, ctl) {
                            msgs.push(next);
                        }
                    }
                    KeyCode::Enter | KeyCode::Esc => self.form.editing = false,
                    KeyCode::Up => self.move_up(),
                    KeyCode::Down | KeyCode::Tab => self.move_down(),
                    _ => {}
                },
                FieldKind::Checkbox => self.form.editing = false,
            }
            return msgs;
        }

        match key {
            KeyCode::Up => self.move_up(),
            KeyCode::Down | KeyCode::Tab => self.move_down(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.form.selected == SUBMIT_IDX {
                    if key == KeyCode::Enter {
                        msgs.push(AppMsg::Submit { today });
                    }
                } else if let Some(spec) = spec {
                    match spec.kind {
                        FieldKind::Checkbox => msgs.push(AppMsg::UpdateField {
                            field: spec.name,
                            value: FieldValue::Bool(!ctl.draft().accept_terms),
                        }),
                        FieldKind::MultiSelect => {
                            self.form.editing = true;
                            self.form.option_cursor = 0;
                        }
                        _ => {
                            if key == KeyCode::Enter {
                                self.form.editing = true;
                            }
                        }
                    }
                }
            }
            _ => {}
        }
        msgs
    }

    fn current_text(&self, name: FieldName, ctl: &FormController) -> String {
        let d = ctl.draft();
        match name {
            FieldName::FullName => d.full_name.clone(),
            FieldName::Email => d.email.clone(),
            FieldName::CompanyName => d.company_name.clone(),
            FieldName::ProjectStartDate => d.project_start_date.clone(),
            FieldName::BudgetUsd => self.form.budget_text.clone(),
            FieldName::Services | FieldName::AcceptTerms => String::new(),
        }
    }

    fn push_char(
        &mut self,
        name: FieldName,
        kind: FieldKind,
        c: char,
        ctl: &FormController,
    ) -> Option<AppMsg> {
        let mut text = self.current_text(name, ctl);
        let allowed = match kind {
            FieldKind::Number => c.is_ascii_digit() && text.len() < BUDGET_LEN,
            FieldKind::Date => (c.is_ascii_digit() || c == '-') && text.len() < DATE_LEN,
            _ => !c.is_control(),
        };
        if !allowed {
            return None;
        }
        text.push(c);
        Some(self.emit(name, text))
    }

    fn pop_char(&mut self, name: FieldName, ctl: &FormController) -> Option<AppMsg> {
        let mut text = self.current_text(name, ctl);
        text.pop()?;
        Some(self.emit(name, text))
    }

    fn emit(&mut self, name: FieldName, text: String) -> AppMsg {
        if name == FieldName::BudgetUsd {
            self.form.budget_text = text.clone();
        }
        AppMsg::UpdateField {
            field: name,
            value: FieldValue::Text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::form::FIELDS;
    use crate::app::{update, FormPhase};

    fn row_of(name: FieldName) -> usize {
        FIELDS.iter().position(|f| f.name == name).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn press(w: &mut FormWidget, ctl: &mut FormController, key: KeyCode) {
        let msgs = w.on_key(key, ctl, today());
        for m in msgs {
            let _ = update(ctl, m);
        }
        w.sync(ctl);
    }

    fn type_str(w: &mut FormWidget, ctl: &mut FormController, s: &str) {
        for c in s.chars() {
            press(w, ctl, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_updates_the_draft() {
        let mut ctl = FormController::new(None);
        let mut w = FormWidget::new();
        press(&mut w, &mut ctl, KeyCode::Enter);
        type_str(&mut w, &mut ctl, "Janx");
        press(&mut w, &mut ctl, KeyCode::Backspace);
        type_str(&mut w, &mut ctl, "e");
        press(&mut w, &mut ctl, KeyCode::Enter);
        assert_eq!(ctl.draft().full_name, "Jane");
        assert!(!w.form.editing);
    }

    #[test]
    fn budget_accepts_digits_only() {
        let mut ctl = FormController::new(None);
        let mut w = FormWidget::new();
        w.form.selected = row_of(FieldName::BudgetUsd);
        press(&mut w, &mut ctl, KeyCode::Enter);
        type_str(&mut w, &mut ctl, "2a5.00");
        assert_eq!(w.form.budget_text, "2500");
        assert_eq!(ctl.draft().budget_usd, Some(2500.0));
        for _ in 0..4 {
            press(&mut w, &mut ctl, KeyCode::Backspace);
        }
        assert_eq!(ctl.draft().budget_usd, None);
    }

    #[test]
    fn services_toggle_through_option_list() {
        let mut ctl = FormController::new(None);
        let mut w = FormWidget::new();
        w.form.selected = row_of(FieldName::Services);
        press(&mut w, &mut ctl, KeyCode::Enter);
        assert!(w.form.editing);
        press(&mut w, &mut ctl, KeyCode::Down);
        press(&mut w, &mut ctl, KeyCode::Char(' '));
        press(&mut w, &mut ctl, KeyCode::Down);
        press(&mut w, &mut ctl, KeyCode::Enter);
        assert_eq!(ctl.draft().services, vec!["Branding", "Web Dev"]);
        press(&mut w, &mut ctl, KeyCode::Enter);
        assert_eq!(ctl.draft().services, vec!["Branding"]);
        press(&mut w, &mut ctl, KeyCode::Esc);
        assert!(!w.form.editing);
    }

    #[test]
    fn checkbox_toggles_and_submit_row_submits() {
        let mut ctl = FormController::new(None);
        let mut w = FormWidget::new();
        w.form.selected = row_of(FieldName::AcceptTerms);
        press(&mut w, &mut ctl, KeyCode::Char(' '));
        assert!(ctl.draft().accept_terms);
        press(&mut w, &mut ctl, KeyCode::Down);
        assert_eq!(w.form.selected, SUBMIT_IDX);
        press(&mut w, &mut ctl, KeyCode::Enter);
        assert_eq!(ctl.phase(), FormPhase::Invalid);
    }

    #[test]
    fn date_field_limits_input() {
        let mut ctl = FormController::new(None);
        let mut w = FormWidget::new();
        w.form.selected = row_of(FieldName::ProjectStartDate);
        press(&mut w, &mut ctl, KeyCode::Enter);
        type_str(&mut w, &mut ctl, "2027-01-15x99");
        assert_eq!(ctl.draft().project_start_date, "2027-01-15");
    }
}

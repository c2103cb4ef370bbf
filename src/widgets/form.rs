use crate::app::{FormController, FormPhase};
use crate::model::{FieldName, ServiceTag, SubmissionOutcome};
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use chrono::NaiveDate;
use ratatui::prelude::*;
use ratatui::widgets::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
    MultiSelect,
    Checkbox,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: FieldName,
    pub label: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    pub placeholder: &'static str,
}

pub const FIELDS: [FieldSpec; 7] = [
    FieldSpec {
        name: FieldName::FullName,
        label: "Full Name",
        required: true,
        kind: FieldKind::Text,
        placeholder: "Enter your full name",
    },
    FieldSpec {
        name: FieldName::Email,
        label: "Email Address",
        required: true,
        kind: FieldKind::Text,
        placeholder: "Enter your email address",
    },
    FieldSpec {
        name: FieldName::CompanyName,
        label: "Company Name",
        required: true,
        kind: FieldKind::Text,
        placeholder: "Enter your company name",
    },
    FieldSpec {
        name: FieldName::Services,
        label: "Services Interested In",
        required: true,
        kind: FieldKind::MultiSelect,
        placeholder: "",
    },
    FieldSpec {
        name: FieldName::BudgetUsd,
        label: "Budget (USD) — Optional",
        required: false,
        kind: FieldKind::Number,
        placeholder: "Enter your budget (100 - 1,000,000)",
    },
    FieldSpec {
        name: FieldName::ProjectStartDate,
        label: "Project Start Date",
        required: true,
        kind: FieldKind::Date,
        placeholder: "YYYY-MM-DD",
    },
    FieldSpec {
        name: FieldName::AcceptTerms,
        label: "I accept the terms and conditions",
        required: true,
        kind: FieldKind::Checkbox,
        placeholder: "",
    },
];

/// Row index of the submit button, right after the last field.
pub const SUBMIT_IDX: usize = FIELDS.len();

/// Cursor and edit state of the form, independent of the draft it shows.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub selected: usize,
    pub editing: bool,
    // Services option cursor while editing the multi-select
    pub option_cursor: usize,
    // Raw budget text, so partial input like "12" or "" renders as typed
    pub budget_text: String,
}

impl FormState {
    pub fn selected_spec(&self) -> Option<&'static FieldSpec> {
        FIELDS.get(self.selected)
    }
}

pub struct FormView<'a> {
    pub form: &'a FormState,
    pub ctl: &'a FormController,
    pub theme: &'a Theme,
    pub today: NaiveDate,
    pub highlight: bool,
    pub cursor_on: bool,
}

fn text_value(view: &FormView, name: FieldName) -> String {
    let d = view.ctl.draft();
    match name {
        FieldName::FullName => d.full_name.clone(),
        FieldName::Email => d.email.clone(),
        FieldName::CompanyName => d.company_name.clone(),
        FieldName::ProjectStartDate => d.project_start_date.clone(),
        FieldName::BudgetUsd => view.form.budget_text.clone(),
        FieldName::Services | FieldName::AcceptTerms => String::new(),
    }
}

pub fn form_lines<'a>(view: &FormView<'a>) -> Vec<Line<'a>> {
    let theme = view.theme;
    let form = view.form;
    let ctl = view.ctl;
    let disabled = ctl.phase() == FormPhase::Submitting;
    let mut lines: Vec<Line> = Vec::new();

    if let SubmissionOutcome::Failure(msg) = ctl.outcome() {
        lines.push(Line::from(Span::styled(
            "Submission Error",
            theme.text_error().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {msg}"),
            theme.text_error(),
        )));
        lines.push(Line::from(""));
    }

    for (i, spec) in FIELDS.iter().enumerate() {
        let is_sel = i == form.selected;
        let editing_here = is_sel && form.editing;
        let sel = if is_sel { '›' } else { ' ' };
        let req = if spec.required { " *" } else { "" };
        let value_style = if disabled {
            theme.text_muted()
        } else if editing_here {
            theme.text_editing_bold()
        } else if is_sel {
            theme.text_active_bold()
        } else {
            Style::default()
        };
        match spec.kind {
            FieldKind::Text | FieldKind::Number | FieldKind::Date => {
                let mut val = text_value(view, spec.name);
                let show_placeholder = val.is_empty() && !editing_here;
                if editing_here && view.cursor_on {
                    val.push('▏');
                }
                let span = if show_placeholder {
                    Span::styled(spec.placeholder.to_string(), theme.text_muted())
                } else {
                    Span::styled(val, value_style)
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} {}{req}: ", spec.label)),
                    span,
                ]));
                if spec.kind == FieldKind::Number {
                    lines.push(Line::from(Span::styled(
                        "    Enter amount between $100 and $1,000,000 (whole numbers only)",
                        theme.text_muted(),
                    )));
                } else if spec.kind == FieldKind::Date {
                    lines.push(Line::from(Span::styled(
                        format!("    Earliest: {}", view.today.format("%Y-%m-%d")),
                        theme.text_muted(),
                    )));
                }
            }
            FieldKind::MultiSelect => {
                let draft = ctl.draft();
                let count = ServiceTag::ALL
                    .iter()
                    .filter(|t| draft.has_service(**t))
                    .count();
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} {}{req}: ", spec.label)),
                    Span::styled(format!("{count} selected"), value_style),
                ]));
                for (oi, tag) in ServiceTag::ALL.iter().enumerate() {
                    let chk = if draft.has_service(*tag) { "[x]" } else { "[ ]" };
                    let on_cursor = editing_here && oi == form.option_cursor;
                    let cur = if on_cursor { '›' } else { ' ' };
                    let st = if on_cursor {
                        theme.list_cursor_style()
                    } else if editing_here {
                        Style::default()
                    } else {
                        theme.text_muted()
                    };
                    lines.push(Line::from(Span::styled(
                        format!("  {cur} {chk} {}", tag.label()),
                        st,
                    )));
                }
            }
            FieldKind::Checkbox => {
                let val = if ctl.draft().accept_terms { "[x]" } else { "[ ]" };
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} ")),
                    Span::styled(val.to_string(), value_style),
                    Span::raw(format!(" {}{req}", spec.label)),
                ]));
            }
        }
        if let Some(err) = ctl.errors().get(spec.name) {
            lines.push(Line::from(Span::styled(
                format!("  ! {err}"),
                theme.text_error(),
            )));
        }
    }

    lines.push(Line::from(""));
    let label = if disabled {
        "[ Submitting... ]"
    } else {
        "[ Submit Form ]"
    };
    let style = if form.selected == SUBMIT_IDX && ctl.can_submit() {
        theme.list_cursor_style()
    } else if form.selected == SUBMIT_IDX {
        Style::default().fg(theme.muted).bg(theme.accent)
    } else if ctl.can_submit() {
        theme.text_active_bold()
    } else {
        theme.text_muted()
    };
    lines.push(Line::from(Span::styled(format!("  {label}"), style)));
    lines
}

pub fn draw_form(f: &mut Frame, area: Rect, view: &FormView) {
    let lines = form_lines(view);
    let title = if view.form.editing {
        "Your details — editing"
    } else {
        "Your details"
    };
    // Keep the selected row visible: scroll by whole lines once it falls below the fold.
    let inner_h = area.height.saturating_sub(2) as usize;
    let anchor = selected_line(&lines);
    let scroll = if inner_h > 0 && anchor >= inner_h {
        (anchor + 1 - inner_h) as u16
    } else {
        0
    };
    let block = panel_block(title, view.highlight, view.theme);
    let p = Paragraph::new(lines)
        .block(block)
        .scroll((scroll, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

// The selected field row is the only line opening with the '›' marker; otherwise
// the submit button (last line) is selected.
fn selected_line(lines: &[Line]) -> usize {
    lines
        .iter()
        .position(|l| {
            l.spans
                .first()
                .map(|s| s.content.starts_with('›'))
                .unwrap_or(false)
        })
        .unwrap_or_else(|| lines.len().saturating_sub(1))
}

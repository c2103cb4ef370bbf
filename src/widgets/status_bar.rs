use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::{AppState, ToastLevel};

pub fn footer_spans<'a>(state: &AppState, help_text: &str) -> Vec<Span<'a>> {
    let theme = &state.theme;
    let mut spans: Vec<Span> = Vec::new();
    if let Some(msg) = &state.status_text {
        let spinner = crate::visuals::spinner_head(state.tick);
        spans.push(Span::raw(format!(" {spinner} {msg}")));
        spans.push(Span::raw("  |  "));
    }
    if let Some(t) = &state.toast {
        let color = theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    spans.push(Span::styled(
        format!("{}  |  ", state.controller.phase().label()),
        Style::default().fg(theme.primary),
    ));
    if state.widget.form.editing {
        spans.push(Span::raw("editing  |  "));
    }
    spans.push(Span::styled(
        help_text.to_string(),
        Style::default().fg(theme.muted),
    ));
    spans
}

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let p = Paragraph::new(Line::from(footer_spans(state, help_text)));
    f.render_widget(p, area);
}

use ratatui::layout::{Alignment, Rect};
use ratatui::prelude::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::FormPhase;
use crate::ui::AppState;

pub const SUBMITTING_TEXT: &str = "Submitting your information...";

/// Title and subtitle (an in-flight notice while submitting) over a subtle animated backdrop.
pub fn draw_banner(f: &mut Frame, area: Rect, state: &AppState) {
    let theme = &state.theme;
    let submitting = state.controller.phase() == FormPhase::Submitting;
    let border = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(if submitting {
            theme.accent
        } else {
            theme.muted
        }));
    let inner = border.inner(area);

    crate::visuals::draw_ambient_bg(f, inner, theme, state.tick);

    let subtitle = if submitting {
        Span::styled(
            format!("{} {SUBMITTING_TEXT}", crate::visuals::spinner_head(state.tick)),
            theme.text_active_bold(),
        )
    } else {
        Span::styled(state.config.subtitle.clone(), theme.text_muted())
    };
    let lines = vec![
        Line::from(Span::styled(
            state.config.title.clone(),
            Style::default()
                .fg(theme.fg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(subtitle),
    ];
    // Center vertically when there is room, otherwise pin to the top
    let needed_h = lines.len() as u16;
    let y = if inner.height > needed_h {
        inner.y + (inner.height - needed_h) / 2
    } else {
        inner.y
    };
    let text_area = Rect {
        x: inner.x,
        y,
        width: inner.width,
        height: needed_h.min(inner.height),
    };
    let p = Paragraph::new(lines).alignment(Alignment::Center);
    f.render_widget(p, text_area);

    f.render_widget(border, area);
}

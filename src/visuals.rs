use ratatui::layout::Rect;
use ratatui::prelude::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::theme::Theme;

pub fn spinner_head(tick: u64) -> char {
    const SPINNERS: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];
    SPINNERS[(tick as usize / 2) % SPINNERS.len()]
}

/// Dim dotted backdrop that drifts one cell per tick.
pub fn draw_ambient_bg(f: &mut Frame, area: Rect, theme: &Theme, tick: u64) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let phase = (tick % 16) as u16;
    let style = Style::default()
        .bg(theme.bg)
        .fg(theme.muted)
        .add_modifier(Modifier::DIM);
    let lines: Vec<Line> = (0..area.height)
        .map(|y| {
            let s: String = (0..area.width)
                .map(|x| if (x + y + phase) % 8 == 0 { '·' } else { ' ' })
                .collect();
            Line::from(Span::styled(s, style))
        })
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().bg(theme.bg))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

/// A short bright segment that runs around the border of `area` while a request is in flight.
pub fn draw_loading_border(f: &mut Frame, area: Rect, theme: &Theme, tick: u64) {
    if area.width < 4 || area.height < 3 {
        return;
    }
    let w = area.width as usize;
    let h = area.height as usize;
    let mut path: Vec<(usize, usize)> = Vec::with_capacity(w * 2 + h * 2);
    path.extend((0..w).map(|x| (x, 0)));
    path.extend((1..h - 1).map(|y| (w - 1, y)));
    path.extend((0..w).rev().map(|x| (x, h - 1)));
    path.extend((1..h - 1).rev().map(|y| (0, y)));
    let perim = path.len();
    let head = (tick as usize * 2) % perim;
    const TAIL: usize = 6;
    let buf = f.buffer_mut();
    for i in 0..TAIL.min(perim) {
        let (x, y) = path[(head + perim - i) % perim];
        let color = if i == 0 { theme.selected } else { theme.accent };
        if let Some(cell) = buf.cell_mut((area.x + x as u16, area.y + y as u16)) {
            cell.set_style(Style::default().fg(color));
        }
    }
}

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::model::NormalizedRecord;
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;

/// `1234567` -> `1,234,567`
pub fn with_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Pretty JSON of the accepted record, as copied to the clipboard.
pub fn record_json_pretty(record: &NormalizedRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_default()
}

pub fn result_lines<'a>(record: &NormalizedRecord, message: &str, theme: &Theme) -> Vec<Line<'a>> {
    let label = |s: &'static str| Span::styled(format!("{s:<16}"), theme.text_muted());
    let mut lines = vec![
        Line::from(Span::styled(message.to_string(), theme.text_success())),
        Line::from(""),
        Line::from(vec![label("Name:"), Span::raw(record.full_name.clone())]),
        Line::from(vec![label("Email:"), Span::raw(record.email.clone())]),
        Line::from(vec![label("Company:"), Span::raw(record.company_name.clone())]),
        Line::from(vec![label("Services:"), Span::raw(record.services_joined())]),
    ];
    if let Some(b) = record.budget_usd {
        lines.push(Line::from(vec![
            label("Budget:"),
            Span::raw(format!("${}", with_thousands(b))),
        ]));
    }
    lines.push(Line::from(vec![
        label("Start Date:"),
        Span::raw(record.project_start_date.format("%Y-%m-%d").to_string()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [ Submit Another Form ]",
        theme.list_cursor_style(),
    )));
    lines
}

pub fn draw_result(f: &mut Frame, area: Rect, record: &NormalizedRecord, message: &str, theme: &Theme) {
    let p = Paragraph::new(result_lines(record, message, theme))
        .block(panel_block("Submission received", true, theme))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceTag;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn record(budget: Option<u32>) -> NormalizedRecord {
        NormalizedRecord {
            full_name: "Jane Doe".into(),
            email: "jane@acme.io".into(),
            company_name: "Acme".into(),
            services: vec![ServiceTag::UiUx, ServiceTag::WebDev],
            budget_usd: budget,
            project_start_date: NaiveDate::from_ymd_opt(2027, 1, 15).unwrap(),
            accept_terms: true,
        }
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(with_thousands(100), "100");
        assert_eq!(with_thousands(1000), "1,000");
        assert_eq!(with_thousands(25000), "25,000");
        assert_eq!(with_thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn echo_renders_record_and_message() {
        let theme = Theme::default();
        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        terminal
            .draw(|f| draw_result(f, f.area(), &record(Some(25000)), "Thanks!", &theme))
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let text: String = (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("Thanks!"));
        assert!(text.contains("UI/UX, Web Dev"));
        assert!(text.contains("$25,000"));
        assert!(text.contains("2027-01-15"));
        assert!(text.contains("[ Submit Another Form ]"));
    }

    #[test]
    fn budget_line_omitted_when_absent() {
        let lines = result_lines(&record(None), "ok", &Theme::default());
        assert!(!lines
            .iter()
            .any(|l| l.spans.iter().any(|s| s.content.contains("Budget"))));
    }

    #[test]
    fn clipboard_json_uses_wire_names() {
        let json = record_json_pretty(&record(None));
        assert!(json.contains("\"fullName\": \"Jane Doe\""));
        assert!(!json.contains("budgetUsd"));
    }
}

use crate::app::{update, AppMsg, Effect, FormController, FormPhase, Transition};
use crate::config::{load_config, AppConfig};
use crate::model::SubmissionOutcome;
use crate::services::submitter::{spawn_submission, ReqwestTransport, SubmitMsg, Transport};
use crate::theme::Theme;
use crate::widgets::banner::draw_banner;
use crate::widgets::form::{draw_form, FormView};
use crate::widgets::form_widget::FormWidget;
use crate::widgets::result_view::{draw_result, record_json_pretty};
use crate::widgets::status_bar::draw_footer;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const TICK_MS: u64 = 200;
const TICKS_PER_SEC: u64 = 1000 / TICK_MS;
const SENDING_STATUS: &str = "Sending...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub struct AppState {
    pub config: AppConfig,
    pub controller: FormController,
    pub widget: FormWidget,
    pub theme: Theme,
    pub tick: u64,
    pub toast: Option<Toast>,
    pub status_text: Option<String>,
    transitions: Rc<RefCell<Vec<Transition>>>,
    transport: Arc<dyn Transport>,
    tx: Sender<SubmitMsg>,
    rx: Receiver<SubmitMsg>,
}

impl AppState {
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        let mut controller = FormController::new(config.endpoint.clone());
        let transitions: Rc<RefCell<Vec<Transition>>> = Rc::default();
        let sink = transitions.clone();
        controller.subscribe(move |t, _| sink.borrow_mut().push(*t));
        let (tx, rx) = mpsc::channel::<SubmitMsg>();
        Self {
            config,
            controller,
            widget: FormWidget::new(),
            theme: Theme::synthwave_dark(),
            tick: 0,
            toast: None,
            status_text: None,
            transitions,
            transport,
            tx,
            rx,
        }
    }

    pub fn show_toast(&mut self, text: impl Into<String>, level: ToastLevel, seconds: u64) {
        self.toast = Some(Toast {
            text: text.into(),
            level,
            expires_at_tick: self.tick + seconds * TICKS_PER_SEC,
        });
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::PostSubmission { endpoint, record } => {
                debug!(%endpoint, "spawning submission");
                spawn_submission(state.transport.clone(), endpoint, record, state.tx.clone());
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => state.show_toast(text, level, seconds),
        }
    }
}

/// Feeds one message through the controller, runs its effects and reacts to phase changes.
pub(crate) fn dispatch(state: &mut AppState, msg: AppMsg) {
    let effects = update(&mut state.controller, msg);
    run_effects(state, effects);
    let transitions: Vec<Transition> = state.transitions.borrow_mut().drain(..).collect();
    for t in transitions {
        if t.to == FormPhase::Submitting {
            state.status_text = Some(SENDING_STATUS.to_string());
        } else if t.from == FormPhase::Submitting {
            state.status_text = None;
        }
        if t.from == FormPhase::Succeeded && t.to == FormPhase::Idle {
            state.widget.form = Default::default();
        }
    }
    state.widget.sync(&state.controller);
}

/// Drains finished submissions without blocking.
pub(crate) fn pump(state: &mut AppState) {
    let mut drained: Vec<SubmitMsg> = Vec::new();
    while let Ok(msg) = state.rx.try_recv() {
        drained.push(msg);
    }
    for msg in drained {
        dispatch(state, AppMsg::SubmissionResolved(msg.result));
    }
}

fn copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => clipboard.set_text(text).is_ok(),
        Err(e) => {
            warn!(error = %e, "clipboard unavailable");
            false
        }
    }
}

/// Handles one key press. Returns true when the app should quit.
pub(crate) fn handle_key(state: &mut AppState, key: KeyEvent, today: NaiveDate) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl {
        match key.code {
            KeyCode::Char('c') => {
                if let SubmissionOutcome::Success { record, .. } = state.controller.outcome() {
                    let content = record_json_pretty(record);
                    if copy_to_clipboard(&content) {
                        state.show_toast("Copied to clipboard!", ToastLevel::Info, 2);
                    }
                }
            }
            KeyCode::Char('s') => {
                state.widget.form.editing = false;
                dispatch(state, AppMsg::Submit { today });
            }
            _ => {}
        }
        return false;
    }

    if state.controller.phase() == FormPhase::Succeeded {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Enter => dispatch(state, AppMsg::Reset),
            _ => {}
        }
        return false;
    }

    if key.code == KeyCode::Char('q') && !state.widget.form.editing {
        return true;
    }
    let msgs = state.widget.on_key(key.code, &state.controller, today);
    for msg in msgs {
        dispatch(state, msg);
    }
    false
}

fn help_text(state: &AppState) -> &'static str {
    if state.controller.phase() == FormPhase::Succeeded {
        "Enter submit another  Ctrl+C copy  q quit"
    } else if state.widget.form.editing {
        "type to edit  ↑/↓ move  Enter/Esc done  Ctrl+S submit"
    } else {
        "↑/↓ move  Enter edit  Space toggle  Ctrl+S submit  q quit"
    }
}

fn ui(f: &mut Frame, state: &mut AppState, today: NaiveDate) {
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    let screen = f.area();
    let bg = Block::default().style(state.theme.base_style());
    f.render_widget(bg, screen);

    let layout_h = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(5),
            Constraint::Percentage(90),
            Constraint::Percentage(5),
        ])
        .split(screen);
    crate::visuals::draw_ambient_bg(f, layout_h[0], &state.theme, state.tick);
    crate::visuals::draw_ambient_bg(f, layout_h[2], &state.theme, state.tick);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(layout_h[1]);

    draw_banner(f, chunks[0], state);
    match state.controller.outcome() {
        SubmissionOutcome::Success { record, message } => {
            draw_result(f, chunks[1], record, message, &state.theme);
        }
        _ => {
            let view = FormView {
                form: &state.widget.form,
                ctl: &state.controller,
                theme: &state.theme,
                today,
                highlight: true,
                cursor_on: state.tick % 4 < 2,
            };
            draw_form(f, chunks[1], &view);
        }
    }
    if state.controller.phase() == FormPhase::Submitting {
        crate::visuals::draw_loading_border(f, chunks[1], &state.theme, state.tick);
    }
    draw_footer(f, chunks[2], state, help_text(state));
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn run() -> Result<()> {
    let cfg = load_config().context("loading onboard.yaml")?;
    crate::logging::init(cfg.log_file.as_deref())?;
    info!(
        endpoint_configured = cfg.endpoint.is_some(),
        timeout_secs = ?cfg.request_timeout_secs,
        "starting onboarding form"
    );
    let transport: Arc<dyn Transport> = Arc::new(
        ReqwestTransport::new(cfg.request_timeout()).context("building HTTP client")?,
    );
    let mut state = AppState::new(cfg, transport);

    if env_flag("ONBOARD_TUI_HEADLESS") {
        let ticks: u64 = std::env::var("ONBOARD_TUI_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        return run_headless(&mut state, ticks, env_flag("ONBOARD_TUI_SMOKE_SUMMARY"));
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run_headless(state: &mut AppState, ticks: u64, summary: bool) -> Result<()> {
    let backend = ratatui::backend::TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend)?;
    let day = today();
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, state, day))?;
        pump(state);
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(Duration::from_millis(TICK_MS));
    }
    if summary {
        let summary = serde_json::json!({
            "ok": state.controller.phase() != FormPhase::Failed,
            "phase": state.controller.phase().label(),
            "endpoint_configured": state.controller.endpoint().is_some(),
        });
        println!("{summary}");
    }
    Ok(())
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let tick_rate = Duration::from_millis(TICK_MS);
    let mut last_tick = Instant::now();
    loop {
        let day = today();
        terminal.draw(|f| ui(f, state, day))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(state, key, day) {
                    info!("quit");
                    return Ok(());
                }
            }
        }
        pump(state);
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldName, FieldValue};
    use crate::services::submitter::submitter_tests::StubTransport;
    use ratatui::backend::TestBackend;

    const ENDPOINT: &str = "http://localhost:5000/api/onboard";

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn state_with(transport: Arc<StubTransport>, endpoint: Option<&str>) -> AppState {
        let cfg = AppConfig {
            endpoint: endpoint.map(str::to_string),
            ..AppConfig::default()
        };
        AppState::new(cfg, transport)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn fill_valid(state: &mut AppState) {
        let edits = [
            (FieldName::FullName, FieldValue::Text("Jane Doe".into())),
            (FieldName::Email, FieldValue::Text("jane@acme.com".into())),
            (FieldName::CompanyName, FieldValue::Text("Acme".into())),
            (FieldName::Services, FieldValue::Tags(vec!["Branding".into()])),
            (FieldName::ProjectStartDate, FieldValue::Text("2026-11-01".into())),
            (FieldName::AcceptTerms, FieldValue::Bool(true)),
        ];
        for (field, value) in edits {
            dispatch(state, AppMsg::UpdateField { field, value });
        }
    }

    fn wait_for(state: &mut AppState, phase: FormPhase) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while state.controller.phase() != phase && Instant::now() < deadline {
            pump(state);
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(state.controller.phase(), phase);
    }

    fn render(state: &mut AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|f| ui(f, state, day())).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn ctrl_s_submits_and_success_resets_with_enter() {
        let stub = StubTransport::replying(200, r#"{"message":"Welcome aboard"}"#);
        let mut state = state_with(stub.clone(), Some(ENDPOINT));
        fill_valid(&mut state);
        assert!(!handle_key(&mut state, ctrl('s'), day()));
        assert_eq!(state.controller.phase(), FormPhase::Submitting);
        assert_eq!(state.status_text.as_deref(), Some(SENDING_STATUS));

        wait_for(&mut state, FormPhase::Succeeded);
        assert_eq!(stub.call_count(), 1);
        assert!(state.status_text.is_none());
        let toast = state.toast.as_ref().unwrap();
        assert_eq!(toast.level, ToastLevel::Success);
        assert_eq!(toast.text, "Welcome aboard");
        let screen = render(&mut state);
        assert!(screen.contains("Welcome aboard"));
        assert!(screen.contains("Submit Another Form"));

        handle_key(&mut state, key(KeyCode::Enter), day());
        assert_eq!(state.controller.phase(), FormPhase::Idle);
        assert!(state.controller.draft().is_untouched());
        assert_eq!(state.widget.form.selected, 0);
    }

    #[test]
    fn transport_failure_shows_error_toast_and_banner() {
        let stub = StubTransport::failing();
        let mut state = state_with(stub, Some(ENDPOINT));
        fill_valid(&mut state);
        handle_key(&mut state, ctrl('s'), day());
        wait_for(&mut state, FormPhase::Failed);
        assert_eq!(state.toast.as_ref().unwrap().level, ToastLevel::Error);
        let screen = render(&mut state);
        assert!(screen.contains("Submission Error"));
        assert!(screen.contains("Network error occurred"));
    }

    #[test]
    fn q_quits_only_outside_edit_mode() {
        let mut state = state_with(StubTransport::replying(200, "{}"), None);
        handle_key(&mut state, key(KeyCode::Enter), day());
        assert!(state.widget.form.editing);
        assert!(!handle_key(&mut state, key(KeyCode::Char('q')), day()));
        assert_eq!(state.controller.draft().full_name, "q");
        handle_key(&mut state, key(KeyCode::Esc), day());
        assert!(handle_key(&mut state, key(KeyCode::Char('q')), day()));
    }

    #[test]
    fn toast_expires_after_its_ticks() {
        let mut state = state_with(StubTransport::replying(200, "{}"), None);
        state.show_toast("hi", ToastLevel::Info, 1);
        render(&mut state);
        assert!(state.toast.is_some());
        state.tick += TICKS_PER_SEC;
        render(&mut state);
        assert!(state.toast.is_none());
    }

    #[test]
    fn idle_screen_shows_header_and_form() {
        let mut state = state_with(StubTransport::replying(200, "{}"), None);
        let screen = render(&mut state);
        assert!(screen.contains("Client Onboarding Form"));
        assert!(screen.contains("Full Name *"));
        assert!(screen.contains("idle"));
    }
}

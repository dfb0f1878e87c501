use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::ListState;
use tokio::sync::mpsc;

use crate::api::GeminiClient;
use crate::categories::{ALL, Category};
use crate::commands::tui::thinking_status;
use crate::controller::SubmitRejected;
use crate::errors::CliError;
use crate::tui::handlers::async_ops::spawn_analysis;
use crate::tui::types::{App, Mode, TuiMsg};

const PAGE: u16 = 10;
const BUSY_STATUS: &str = "An analysis is already running.";

pub fn handle_event(
    api: &GeminiClient,
    tx: &mpsc::UnboundedSender<TuiMsg>,
    app: &mut App,
    event: Event,
) -> Result<(), CliError> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            handle_key(api, tx, app, key)?;
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_key(
    api: &GeminiClient,
    tx: &mpsc::UnboundedSender<TuiMsg>,
    app: &mut App,
    key: KeyEvent,
) -> Result<(), CliError> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    if key.code == KeyCode::F(1) {
        open_popup(app, Mode::Help);
        return Ok(());
    }

    if key.code == KeyCode::F(3) || (ctrl && key.code == KeyCode::Char('h')) {
        open_history(app);
        return Ok(());
    }

    match app.mode {
        Mode::Help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.mode = app.return_mode;
            }
        }
        Mode::History => {
            let len = app.controller.history().len();
            match key.code {
                KeyCode::Esc => app.mode = app.return_mode,
                KeyCode::Up => move_selection(&mut app.history_state, -1, len),
                KeyCode::Down => move_selection(&mut app.history_state, 1, len),
                KeyCode::Enter => {
                    if let Some(idx) = app.history_state.selected() {
                        select_history(app, idx);
                    }
                }
                _ => {}
            }
        }
        Mode::Report => match key.code {
            KeyCode::Esc | KeyCode::Char('n') => reset(app),
            KeyCode::Char('r') if ctrl => reset(app),
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                app.report_scroll = app.report_scroll.saturating_sub(1)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.report_scroll = app.report_scroll.saturating_add(1)
            }
            KeyCode::PageUp => app.report_scroll = app.report_scroll.saturating_sub(PAGE),
            KeyCode::PageDown => app.report_scroll = app.report_scroll.saturating_add(PAGE),
            KeyCode::Home => app.report_scroll = 0,
            _ => {}
        },
        Mode::Form => handle_form_key(api, tx, app, key, ctrl),
    }

    Ok(())
}

fn handle_form_key(
    api: &GeminiClient,
    tx: &mpsc::UnboundedSender<TuiMsg>,
    app: &mut App,
    key: KeyEvent,
    ctrl: bool,
) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => submit(api, tx, app),
        KeyCode::Tab => cycle_category(app, 1),
        KeyCode::BackTab => cycle_category(app, -1),
        KeyCode::Char('r') if ctrl => reset(app),
        KeyCode::Char('u') if ctrl => {
            app.input.clear();
            app.cursor = 0;
            app.sync_idea();
        }
        KeyCode::Left => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Right => app.cursor = (app.cursor + 1).min(app.input.len()),
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => app.cursor = app.input.len(),
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                app.input.remove(app.cursor);
                app.sync_idea();
            }
        }
        KeyCode::Delete => {
            if app.cursor < app.input.len() {
                app.input.remove(app.cursor);
                app.sync_idea();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            app.input.insert(app.cursor, c);
            app.cursor += 1;
            app.sync_idea();
        }
        _ => {}
    }
}

fn submit(api: &GeminiClient, tx: &mpsc::UnboundedSender<TuiMsg>, app: &mut App) {
    app.sync_idea();
    match app.controller.begin_submit() {
        Ok(request) => {
            app.status = thinking_status(&request.category_label());
            spawn_analysis(api.clone(), tx.clone(), request);
        }
        Err(SubmitRejected::IdeaRequired) => {
            app.status = app.controller.error().unwrap_or_default().to_string();
        }
        Err(SubmitRejected::Busy) => {
            app.status = BUSY_STATUS.to_string();
        }
    }
}

fn reset(app: &mut App) {
    if !app.controller.reset() {
        app.status = BUSY_STATUS.to_string();
        return;
    }
    app.load_idea_from_controller();
    app.report_scroll = 0;
    app.mode = Mode::Form;
    app.return_mode = Mode::Form;
    app.status = "Ready.".to_string();
}

fn cycle_category(app: &mut App, delta: isize) {
    let current = Category::from_id(app.controller.category_id());
    let next = match current {
        Some(cat) => {
            let len = ALL.len() as isize;
            let idx = (cat.position() as isize + delta).rem_euclid(len) as usize;
            ALL[idx]
        }
        None => ALL[0],
    };
    app.controller.set_category(next.id());
}

fn open_popup(app: &mut App, mode: Mode) {
    if !matches!(app.mode, Mode::Help | Mode::History) {
        app.return_mode = app.mode;
    }
    app.mode = mode;
}

fn open_history(app: &mut App) {
    if app.controller.history().is_empty() {
        app.status = "No analyses yet.".to_string();
        return;
    }
    if app.history_state.selected().is_none() {
        app.history_state.select(Some(0));
    }
    open_popup(app, Mode::History);
}

fn select_history(app: &mut App, idx: usize) {
    if app.controller.is_loading() {
        app.mode = app.return_mode;
        app.status = BUSY_STATUS.to_string();
        return;
    }
    if !app.controller.select_history_entry(idx) {
        return;
    }
    app.load_idea_from_controller();
    app.report_scroll = 0;
    app.mode = Mode::Report;
    app.return_mode = Mode::Report;
    if let Some(entry) = app.controller.history().get(idx) {
        app.status = format!(
            "History: {} ({})",
            entry.category_label,
            entry.created_at_display()
        );
    }
}

fn move_selection(state: &mut ListState, delta: isize, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).clamp(0, len as isize - 1) as usize;
    state.select(Some(next));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::sample_result;
    use crate::api::{DEFAULT_API_URL, DEFAULT_MODEL};
    use crate::controller::{IDEA_REQUIRED_MESSAGE, Phase, ViewController};

    type Fixture = (
        GeminiClient,
        mpsc::UnboundedSender<TuiMsg>,
        mpsc::UnboundedReceiver<TuiMsg>,
        App,
    );

    fn fixture() -> Fixture {
        let api = GeminiClient::new(
            DEFAULT_API_URL.to_string(),
            DEFAULT_MODEL.to_string(),
            None,
            None,
            false,
        )
        .unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(
            ViewController::default(),
            DEFAULT_API_URL.to_string(),
            DEFAULT_MODEL.to_string(),
            "default".to_string(),
            false,
        );
        (api, tx, rx, app)
    }

    fn press(
        api: &GeminiClient,
        tx: &mpsc::UnboundedSender<TuiMsg>,
        app: &mut App,
        code: KeyCode,
    ) {
        handle_key(api, tx, app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn ctrl(api: &GeminiClient, tx: &mpsc::UnboundedSender<TuiMsg>, app: &mut App, c: char) {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        handle_key(api, tx, app, key).unwrap();
    }

    fn seed_history(app: &mut App, ideas: &[&str]) {
        for idea in ideas {
            app.controller.set_idea(*idea);
            let request = app.controller.begin_submit().unwrap();
            app.controller.complete(&request, Ok(sample_result(6.0)));
        }
        app.controller.reset();
        app.load_idea_from_controller();
    }

    #[test]
    fn typing_edits_the_controller_idea() {
        let (api, tx, _rx, mut app) = fixture();
        for c in "гутал".chars() {
            press(&api, &tx, &mut app, KeyCode::Char(c));
        }
        press(&api, &tx, &mut app, KeyCode::Left);
        press(&api, &tx, &mut app, KeyCode::Backspace);
        assert_eq!(app.controller.idea(), "гутл");
        assert_eq!(app.cursor, 3);

        ctrl(&api, &tx, &mut app, 'u');
        assert_eq!(app.controller.idea(), "");
    }

    #[test]
    fn tab_cycles_categories_and_wraps() {
        let (api, tx, _rx, mut app) = fixture();
        assert_eq!(app.controller.category_id(), "fashion");
        press(&api, &tx, &mut app, KeyCode::Tab);
        assert_eq!(app.controller.category_id(), "household");
        press(&api, &tx, &mut app, KeyCode::BackTab);
        press(&api, &tx, &mut app, KeyCode::BackTab);
        assert_eq!(app.controller.category_id(), "other");
    }

    #[test]
    fn blank_submit_shows_validation_and_sends_nothing() {
        let (api, tx, mut rx, mut app) = fixture();
        press(&api, &tx, &mut app, KeyCode::Char(' '));
        press(&api, &tx, &mut app, KeyCode::Enter);
        assert_eq!(app.controller.phase(), Phase::Failed);
        assert_eq!(app.status, IDEA_REQUIRED_MESSAGE);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn history_popup_selects_entry_into_report() {
        let (api, tx, _rx, mut app) = fixture();
        seed_history(&mut app, &["эхний", "сүүлийн"]);

        press(&api, &tx, &mut app, KeyCode::F(3));
        assert_eq!(app.mode, Mode::History);
        press(&api, &tx, &mut app, KeyCode::Down);
        press(&api, &tx, &mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Report);
        assert_eq!(app.input_text(), "эхний");
        assert_eq!(app.controller.phase(), Phase::Success);
    }

    #[test]
    fn empty_history_does_not_open_popup() {
        let (api, tx, _rx, mut app) = fixture();
        press(&api, &tx, &mut app, KeyCode::F(3));
        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.status, "No analyses yet.");
    }

    #[test]
    fn report_escape_resets_to_empty_form() {
        let (api, tx, _rx, mut app) = fixture();
        seed_history(&mut app, &["санаа"]);
        press(&api, &tx, &mut app, KeyCode::F(3));
        press(&api, &tx, &mut app, KeyCode::Enter);
        press(&api, &tx, &mut app, KeyCode::PageDown);
        assert_eq!(app.report_scroll, PAGE);

        press(&api, &tx, &mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.controller.phase(), Phase::Idle);
        assert!(app.input.is_empty());
        assert_eq!(app.report_scroll, 0);
    }

    #[test]
    fn reset_keys_are_ignored_while_loading() {
        let (api, tx, _rx, mut app) = fixture();
        seed_history(&mut app, &["хуучин"]);
        app.controller.set_idea("эхний");
        let first = app.controller.begin_submit().unwrap();
        app.load_idea_from_controller();

        ctrl(&api, &tx, &mut app, 'r');
        assert_eq!(app.controller.phase(), Phase::Loading);
        assert_eq!(app.input_text(), "эхний");
        assert_eq!(app.status, "An analysis is already running.");

        app.controller.set_idea("хоёр дахь");
        assert_eq!(app.controller.begin_submit(), Err(SubmitRejected::Busy));

        press(&api, &tx, &mut app, KeyCode::F(3));
        press(&api, &tx, &mut app, KeyCode::Enter);
        assert_eq!(app.controller.phase(), Phase::Loading);
        assert_eq!(app.mode, Mode::Form);

        app.controller.complete(&first, Ok(sample_result(7.0)));
        assert_eq!(app.controller.history().len(), 2);
        assert_eq!(app.controller.history().get(0).unwrap().idea_text, "эхний");
    }

    #[test]
    fn help_returns_to_previous_mode() {
        let (api, tx, _rx, mut app) = fixture();
        press(&api, &tx, &mut app, KeyCode::F(1));
        assert_eq!(app.mode, Mode::Help);
        press(&api, &tx, &mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Form);
    }
}

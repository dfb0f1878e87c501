use std::io;
use std::time::{Duration, Instant};

use clap::Args;
use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::analysis::{AnalysisResult, ScoreBand};
use crate::app::Runtime;
use crate::categories::{ALL, Category, DEFAULT_CATEGORY_ID, category_label};
use crate::config::{env_api_key, stored_api_key};
use crate::controller::ViewController;
use crate::errors::CliError;
use crate::report::{
    IDEA_TITLE, SCORE_TITLE, SectionBody, score_bar, score_label, sections, wrap_line,
};
use crate::tui::handlers::{handle_event, handle_tui_msg};
use crate::tui::types::*;

#[derive(Debug, Args)]
pub struct TuiArgs {
    /// Initial sector: fashion, household, tech, retail or other
    #[arg(short = 'c', long = "category", default_value = DEFAULT_CATEGORY_ID)]
    pub category: String,
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self, CliError> {
        enable_raw_mode()
            .map_err(|e| CliError::Generic(format!("Failed to enable raw mode: {e}")))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| CliError::Generic(format!("Failed to enter alternate screen: {e}")))?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
    }
}

pub async fn handle(runtime: &Runtime, args: TuiArgs) -> Result<(), CliError> {
    if runtime.output.json {
        return Err(CliError::Usage(
            "`--json` is not supported for `bizlens tui`.".to_string(),
        ));
    }

    let api = runtime.gemini_client()?;
    let api_url = runtime.resolved_api_url()?;
    let profile = runtime.active_profile();
    let key_present =
        env_api_key().is_some() || stored_api_key(&runtime.config, &profile).is_some();

    let category = match Category::from_id(&args.category) {
        Some(cat) => cat.id().to_string(),
        None => {
            tracing::info!(category = %args.category, "unknown category for tui; using default");
            DEFAULT_CATEGORY_ID.to_string()
        }
    };

    let mut app = App::new(
        ViewController::new(&category),
        api_url,
        api.model().to_string(),
        profile,
        key_present,
    );
    if !key_present {
        app.status =
            "No API key. Set GEMINI_API_KEY or run `bizlens config set apiKey ...`.".to_string();
    }

    let guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| CliError::Generic(format!("Failed to init terminal: {e}")))?;
    terminal
        .clear()
        .map_err(|e| CliError::Generic(format!("Failed to clear terminal: {e}")))?;

    let (tx, mut rx) = mpsc::unbounded_channel::<TuiMsg>();
    tracing::debug!(model = %app.model, api = %app.api_url, "tui started");

    loop {
        update_spinner(&mut app);
        terminal
            .draw(|f| ui(f, &mut app))
            .map_err(|e| CliError::Generic(format!("Failed to draw: {e}")))?;

        if app.should_quit {
            break;
        }

        while let Ok(msg) = rx.try_recv() {
            handle_tui_msg(&mut app, msg);
        }

        let poll_ms = if app.controller.is_loading() { 50 } else { 120 };
        if crossterm::event::poll(Duration::from_millis(poll_ms))
            .map_err(|e| CliError::Generic(format!("Event poll failed: {e}")))?
        {
            let event = crossterm::event::read()
                .map_err(|e| CliError::Generic(format!("Event read failed: {e}")))?;
            if let Err(err) = handle_event(&api, &tx, &mut app, event) {
                tracing::error!(error = %err, "tui event failed");
                app.status = format!("error: {err}");
            }
        }
    }

    terminal
        .show_cursor()
        .map_err(|e| CliError::Generic(format!("Failed to restore cursor: {e}")))?;
    drop(guard);
    Ok(())
}

fn ui(f: &mut Frame<'_>, app: &mut App) {
    let size = f.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // category tabs
            Constraint::Length(5), // idea input
            Constraint::Min(1),    // report or intro
            Constraint::Length(3), // info panel
        ])
        .split(size);

    render_header(f, app, layout[0]);
    f.render_widget(render_categories(app), layout[1]);

    let input_area = layout[2];
    let input_width = input_area.width.saturating_sub(2).max(1) as usize;
    let (line, col) = cursor_position(&app.input, app.cursor, input_width);
    let offset = (line + 1).saturating_sub(input_area.height.saturating_sub(2));
    f.render_widget(render_input(app, input_width, offset), input_area);
    if app.mode == Mode::Form {
        let x = input_area.x.saturating_add(1).saturating_add(col);
        let y = input_area.y.saturating_add(1).saturating_add(line.saturating_sub(offset));
        f.set_cursor_position((x, y));
    }

    let main_area = layout[3];
    match app.base_mode() {
        Mode::Report => {
            let report = render_report(app, main_area);
            f.render_widget(report, main_area);
        }
        _ => f.render_widget(render_intro(app), main_area),
    }

    render_info_panel(f, app, layout[4]);

    match app.mode {
        Mode::History => {
            let area = centered_rect(80, 70, size);
            f.render_widget(Clear, area);
            render_history_popup(f, app, area);
        }
        Mode::Help => {
            let area = centered_rect(70, 60, size);
            f.render_widget(Clear, area);
            f.render_widget(render_help(), area);
        }
        Mode::Form | Mode::Report => {}
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let base = Style::default().fg(Color::Black).bg(Color::White);
    let left = Paragraph::new(Line::from(vec![
        Span::styled(" bizlens ", base.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {}", app.controller.phase().as_str()), base),
    ]))
    .style(base);

    let key = if app.key_present { "key=yes" } else { "key=no" };
    let right = Paragraph::new(Line::from(format!(
        "model={}  profile={}  {key} ",
        app.model, app.profile
    )))
    .style(base)
    .alignment(Alignment::Right);

    f.render_widget(left, cols[0]);
    f.render_widget(right, cols[1]);
}

fn render_categories(app: &App) -> Paragraph<'static> {
    let selected = Category::from_id(app.controller.category_id());
    let mut spans = vec![Span::raw(" ")];
    for cat in ALL {
        let style = if Some(cat) == selected {
            Style::default()
                .fg(Color::Black)
                .bg(c_accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(c_muted())
        };
        spans.push(Span::styled(format!(" {} ", cat.label()), style));
        spans.push(Span::raw(" "));
    }
    if selected.is_none() {
        spans.push(Span::styled(
            category_label(app.controller.category_id()),
            Style::default().fg(c_warn()),
        ));
    }
    Paragraph::new(Line::from(spans))
}

fn render_input(app: &App, width: usize, offset: u16) -> Paragraph<'static> {
    let lines: Vec<Line<'static>> = char_wrap(&app.input, width)
        .into_iter()
        .map(Line::from)
        .collect();

    let border = if app.controller.is_loading() {
        c_accent()
    } else if app.mode == Mode::Form {
        Color::White
    } else {
        c_muted()
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .title(format!(" {IDEA_TITLE} "));
    if let Some(err) = app.controller.error() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {err} "),
            Style::default().fg(c_err()),
        )));
    }

    Paragraph::new(Text::from(lines)).block(block).scroll((offset, 0))
}

fn render_intro(app: &App) -> Paragraph<'static> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Бизнесийн санаагаа бичээд Enter дарна уу.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Tab: салбар солих   F3: түүх   F1: тусламж   Esc: гарах",
            Style::default().fg(c_muted()),
        )),
    ];
    if app.controller.is_loading() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} {}", spinner_frame(app.spinner_step), app.status),
            Style::default().fg(c_accent()),
        )));
    }
    Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
        .wrap(Wrap { trim: false })
}

fn render_report(app: &App, area: Rect) -> Paragraph<'static> {
    let width = area.width.saturating_sub(4).max(8) as usize;
    let Some(result) = app.controller.result() else {
        return Paragraph::new("");
    };

    let score_style = Style::default()
        .fg(score_color(result.score_band()))
        .add_modifier(Modifier::BOLD);
    let title_style = Style::default().fg(c_accent()).add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled(format!("{SCORE_TITLE}: "), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(score_label(result.feasibility_score), score_style),
            Span::raw("  "),
            Span::styled(score_bar(result.feasibility_score, 20), score_style),
        ]),
    ];

    for section in sections(result) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(section.title, title_style)));
        match section.body {
            SectionBody::Text(text) => {
                for line in wrap_line(&text, width) {
                    lines.push(Line::from(line));
                }
            }
            SectionBody::Bullets(items) => {
                for item in items {
                    let wrapped = wrap_line(&item, width.saturating_sub(4));
                    for (idx, line) in wrapped.into_iter().enumerate() {
                        let prefix = if idx == 0 { "  • " } else { "    " };
                        lines.push(Line::from(format!("{prefix}{line}")));
                    }
                }
            }
            SectionBody::Solutions(items) => {
                for (n, sol) in items.iter().enumerate() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}. {}", n + 1, sol.title),
                        Style::default().add_modifier(Modifier::BOLD),
                    )));
                    for line in wrap_line(&sol.description, width.saturating_sub(5)) {
                        lines.push(Line::from(format!("     {line}")));
                    }
                }
            }
        }
    }

    let title = format!(
        " {} ({}) ",
        truncate_to_width(app.controller.idea(), width.saturating_sub(20)),
        category_label(app.controller.category_id())
    );
    Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(title),
        )
        .scroll((app.report_scroll, 0))
}

fn render_info_panel(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut status_spans = Vec::new();
    if app.controller.is_loading() {
        status_spans.push(Span::styled(
            format!("{} ", spinner_frame(app.spinner_step)),
            Style::default().fg(c_accent()),
        ));
    }
    status_spans.push(Span::raw(app.status.clone()));

    let model = app.last_model.as_deref().unwrap_or(app.model.as_str());
    let usage = app.last_usage.as_deref().unwrap_or("usage(unknown)");
    let meta = format!(
        "{model}  |  {usage}  |  history {}/{}",
        app.controller.history().len(),
        crate::history::HISTORY_CAPACITY
    );

    let lines = vec![
        Line::from(status_spans),
        Line::from(Span::styled(meta, Style::default().fg(c_muted()))),
    ];
    let panel = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(c_muted())),
    );
    f.render_widget(panel, area);
}

fn render_history_popup(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem<'static>> = app
        .controller
        .history()
        .entries()
        .iter()
        .map(|entry| {
            let head = format!(
                "{}  {:>6}  {}  ",
                entry.created_at_display(),
                score_label(entry.result.feasibility_score),
                entry.category_label
            );
            let idea = truncate_to_width(&entry.idea_text, width.saturating_sub(head.width()));
            ListItem::new(Line::from(vec![
                Span::styled(head, Style::default().fg(score_color(entry.result.score_band()))),
                Span::raw(idea),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title("History (Enter open, Esc close)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.history_state);
}

fn render_help() -> Paragraph<'static> {
    let lines = vec![
        Line::from(vec![Span::styled(
            "bizlens",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Enter: analyze the idea"),
        Line::from("Tab / Shift+Tab: change sector"),
        Line::from("Ctrl+R: new analysis (clears idea and report)"),
        Line::from("Ctrl+U: clear the idea"),
        Line::from("F3 / Ctrl+H: history of the last 10 analyses"),
        Line::from("↑↓ / PgUp / PgDn: scroll the report"),
        Line::from("n / Esc (report): start over"),
        Line::from("Esc: quit (or close popup)"),
        Line::from(""),
        Line::from("Needs GEMINI_API_KEY or `bizlens config set apiKey ...`."),
    ];

    Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help (Esc to close)"),
        )
        .wrap(Wrap { trim: false })
}

pub fn thinking_status(category_label: &str) -> String {
    format!("Analyzing ({category_label})...")
}

pub fn format_success_status(result: &AnalysisResult, elapsed_ms: Option<u128>) -> String {
    let score = score_label(result.feasibility_score);
    match elapsed_ms {
        Some(ms) => format!("ok: {score} in {:.1}s", ms as f64 / 1000.0),
        None => format!("ok: {score}"),
    }
}

/// Only the user-facing message is shown; provider details go to the log.
pub fn format_error_status(message: &str) -> String {
    format!("error: {message}")
}

fn score_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Strong => c_ok(),
        ScoreBand::Moderate => c_accent(),
        ScoreBand::Weak => c_err(),
    }
}

fn c_accent() -> Color {
    Color::Rgb(59, 130, 246)
}

fn c_ok() -> Color {
    Color::Rgb(22, 163, 74)
}

fn c_warn() -> Color {
    Color::Rgb(245, 158, 11)
}

fn c_err() -> Color {
    Color::Rgb(220, 38, 38)
}

fn c_muted() -> Color {
    Color::Rgb(100, 116, 139)
}

const SPINNER_INTERVAL_MS: u64 = 120;
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

fn update_spinner(app: &mut App) {
    if !app.controller.is_loading() {
        return;
    }
    let now = Instant::now();
    if now.duration_since(app.spinner_last) >= Duration::from_millis(SPINNER_INTERVAL_MS) {
        app.spinner_last = now;
        app.spinner_step = app.spinner_step.wrapping_add(1);
    }
}

fn spinner_frame(step: u64) -> &'static str {
    SPINNER_FRAMES[(step % SPINNER_FRAMES.len() as u64) as usize]
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    let vertical = popup_layout[1];
    let popup_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical);

    popup_layout[1]
}

/// Break the editor buffer into rows of at most `width` display columns.
pub fn char_wrap(input: &[char], width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut col = 0usize;
    for &ch in input {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if col + cw > width && !cur.is_empty() {
            out.push(std::mem::take(&mut cur));
            col = 0;
        }
        cur.push(ch);
        col += cw;
    }
    out.push(cur);
    out
}

/// Row and column of `cursor` inside the layout produced by [`char_wrap`].
pub fn cursor_position(input: &[char], cursor: usize, width: usize) -> (u16, u16) {
    let width = width.max(1);
    let mut line = 0usize;
    let mut col = 0usize;
    for &ch in input.iter().take(cursor) {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if col + cw > width && col > 0 {
            line += 1;
            col = 0;
        }
        col += cw;
    }
    if col >= width {
        line += 1;
        col = 0;
    }
    (line as u16, col as u16)
}

fn truncate_to_width(input: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if input.width() <= max_width {
        return input.to_string();
    }

    const ELLIPSIS: &str = "…";
    let ell_w = ELLIPSIS.width();
    if max_width <= ell_w {
        return ELLIPSIS.to_string();
    }

    let mut out = String::new();
    let mut w = 0usize;
    for ch in input.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw + ell_w > max_width {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::sample_result;
    use crate::controller::ANALYSIS_FAILED_MESSAGE;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn success_status_carries_score_and_time() {
        assert_eq!(
            format_success_status(&sample_result(6.5), Some(2340)),
            "ok: 6.5/10 in 2.3s"
        );
        assert_eq!(format_success_status(&sample_result(9.0), None), "ok: 9/10");
    }

    #[test]
    fn error_status_is_the_user_message() {
        assert_eq!(
            format_error_status(ANALYSIS_FAILED_MESSAGE),
            format!("error: {ANALYSIS_FAILED_MESSAGE}")
        );
    }

    #[test]
    fn char_wrap_splits_on_width() {
        assert_eq!(char_wrap(&chars("абвгде"), 4), vec!["абвг", "де"]);
        assert_eq!(char_wrap(&[], 4), vec![String::new()]);
    }

    #[test]
    fn cursor_follows_wrapped_rows() {
        let input = chars("абвгде");
        assert_eq!(cursor_position(&input, 0, 4), (0, 0));
        assert_eq!(cursor_position(&input, 3, 4), (0, 3));
        assert_eq!(cursor_position(&input, 4, 4), (1, 0));
        assert_eq!(cursor_position(&input, 6, 4), (1, 2));
    }

    #[test]
    fn wide_chars_wrap_early() {
        let input = chars("日本語");
        assert_eq!(char_wrap(&input, 5), vec!["日本", "語"]);
        assert_eq!(cursor_position(&input, 2, 5), (0, 4));
        assert_eq!(cursor_position(&input, 3, 5), (1, 2));
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate_to_width("Ноолууран цамц", 6), "Ноолу…");
        assert_eq!(truncate_to_width("гутал", 10), "гутал");
    }

    #[test]
    fn spinner_frames_cycle() {
        assert_eq!(spinner_frame(0), spinner_frame(SPINNER_FRAMES.len() as u64));
    }
}

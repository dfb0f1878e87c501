// TUI state. All analysis state lives in the ViewController; the App only adds
// editor, navigation and status bookkeeping around it.

use std::time::Instant;

use ratatui::widgets::ListState;

use crate::analysis::{Analysis, AnalysisRequest};
use crate::controller::ViewController;
use crate::errors::AnalysisError;

// ============================================================================
// UI mode enum
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Form,
    Report,
    History,
    Help,
}

// ============================================================================
// Main App state
// ============================================================================

#[derive(Debug)]
pub struct App {
    pub mode: Mode,
    /// Mode to return to when a popup closes.
    pub return_mode: Mode,
    pub should_quit: bool,

    pub controller: ViewController,

    pub api_url: String,
    pub model: String,
    pub profile: String,
    pub key_present: bool,

    pub input: Vec<char>,
    pub cursor: usize,

    pub status: String,
    pub last_elapsed_ms: Option<u128>,
    pub last_model: Option<String>,
    pub last_usage: Option<String>,

    pub history_state: ListState,
    pub report_scroll: u16,

    pub spinner_step: u64,
    pub spinner_last: Instant,
}

impl App {
    pub fn new(
        controller: ViewController,
        api_url: String,
        model: String,
        profile: String,
        key_present: bool,
    ) -> Self {
        let input: Vec<char> = controller.idea().chars().collect();
        let cursor = input.len();
        Self {
            mode: Mode::Form,
            return_mode: Mode::Form,
            should_quit: false,
            controller,
            api_url,
            model,
            profile,
            key_present,
            input,
            cursor,
            status: "Ready.".to_string(),
            last_elapsed_ms: None,
            last_model: None,
            last_usage: None,
            history_state: ListState::default(),
            report_scroll: 0,
            spinner_step: 0,
            spinner_last: Instant::now(),
        }
    }

    pub fn input_text(&self) -> String {
        self.input.iter().collect()
    }

    /// Push the editor buffer into the controller.
    pub fn sync_idea(&mut self) {
        let text = self.input_text();
        self.controller.set_idea(text);
    }

    /// Pull the controller's idea back into the editor.
    pub fn load_idea_from_controller(&mut self) {
        self.input = self.controller.idea().chars().collect();
        self.cursor = self.input.len();
    }

    /// Mode shown when no popup is open.
    pub fn base_mode(&self) -> Mode {
        if self.controller.result().is_some() {
            Mode::Report
        } else {
            Mode::Form
        }
    }
}

// ============================================================================
// Async message enum
// ============================================================================

#[derive(Debug)]
pub enum TuiMsg {
    Analysis(AnalysisRequest, Result<Analysis, AnalysisError>),
}

// Applies async results to the App.

use crate::commands::tui::{format_error_status, format_success_status};
use crate::controller::SubmitOutcome;
use crate::tui::types::{App, Mode, TuiMsg};

pub fn handle_tui_msg(app: &mut App, msg: TuiMsg) {
    match msg {
        TuiMsg::Analysis(request, res) => {
            let (outcome, meta) = match res {
                Ok(analysis) => (
                    app.controller.complete(&request, Ok(analysis.result)),
                    Some((analysis.elapsed_ms, analysis.model, analysis.usage)),
                ),
                Err(err) => (app.controller.complete(&request, Err(err)), None),
            };
            if matches!(outcome, SubmitOutcome::Stale) {
                return;
            }
            match meta {
                Some((elapsed_ms, model, usage)) => {
                    app.last_elapsed_ms = Some(elapsed_ms);
                    app.last_model = model;
                    app.last_usage = usage;
                }
                None => {
                    app.last_elapsed_ms = None;
                    app.last_usage = None;
                }
            }

            match outcome {
                SubmitOutcome::Completed(result) => {
                    app.status = format_success_status(&result, app.last_elapsed_ms);
                    app.report_scroll = 0;
                    app.history_state.select(Some(0));
                    if !matches!(app.mode, Mode::History | Mode::Help) {
                        app.mode = Mode::Report;
                    }
                    app.return_mode = Mode::Report;
                }
                SubmitOutcome::Failed(message) => {
                    app.status = format_error_status(&message);
                    if !matches!(app.mode, Mode::History | Mode::Help) {
                        app.mode = Mode::Form;
                    }
                    app.return_mode = Mode::Form;
                }
                SubmitOutcome::Rejected(_) | SubmitOutcome::Stale => {}
            }
        }
    }
}

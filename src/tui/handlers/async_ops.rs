use tokio::sync::mpsc;

use crate::analysis::{AnalysisRequest, run_request};
use crate::provider::AnalysisProvider;
use crate::tui::types::TuiMsg;

/// Run one analysis off the UI loop and post the outcome back.
pub fn spawn_analysis<P>(provider: P, tx: mpsc::UnboundedSender<TuiMsg>, request: AnalysisRequest)
where
    P: AnalysisProvider + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let res = run_request(&provider, &request).await;
        let _ = tx.send(TuiMsg::Analysis(request, res));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::result::sample_result;
    use crate::provider::stub::StubProvider;

    #[tokio::test]
    async fn outcome_is_posted_with_its_request() {
        let body = serde_json::to_string(&sample_result(8.0)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let request = AnalysisRequest::new("Ноолууран цамц", "fashion").unwrap();

        spawn_analysis(StubProvider::new().reply_text(body), tx, request.clone());

        match rx.recv().await {
            Some(TuiMsg::Analysis(req, Ok(analysis))) => {
                assert_eq!(req, request);
                assert_eq!(analysis.result, sample_result(8.0));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}

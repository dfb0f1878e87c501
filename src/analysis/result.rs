use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::schema::{response_schema, validate};
use crate::errors::AnalysisError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub market_fit: String,
    pub feasibility_score: f64,
    pub economic_reality: String,
    pub tech_solutions: Vec<TechSolution>,
    pub category_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechSolution {
    pub title: String,
    pub description: String,
}

/// How the score reads at a glance; thresholds follow the report colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl AnalysisResult {
    pub fn score_band(&self) -> ScoreBand {
        if self.feasibility_score >= 8.0 {
            ScoreBand::Strong
        } else if self.feasibility_score >= 5.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

/// Parse provider text into a result, rejecting anything that does not match
/// the declared response schema.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let value: Value = serde_json::from_str(text.trim())?;
    validate(&response_schema(), &value).map_err(AnalysisError::MalformedResponse)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
pub(crate) fn sample_result(score: f64) -> AnalysisResult {
    AnalysisResult {
        summary: "Үндэсний хээтэй гутал дотоодын зах зээлд сонирхол татна.".to_string(),
        strengths: vec!["Соёлын өвөрмөц байдал".to_string()],
        weaknesses: vec!["Импортын түүхий эд".to_string(), "Жижиг зах зээл".to_string()],
        market_fit: "Залуу хот суурин хэрэглэгчид".to_string(),
        feasibility_score: score,
        economic_reality: "Инфляци өндөр үед үнэ мэдрэмтгий.".to_string(),
        tech_solutions: vec![TechSolution {
            title: "Онлайн захиалга".to_string(),
            description: "Хэмжээгээр захиалах веб платформ".to_string(),
        }],
        category_context: "Хувцасны салбар импортоос хамааралтай.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_then_parse_is_identical() {
        let original = sample_result(7.0);
        let text = serde_json::to_string(&original).unwrap();
        assert!(text.contains("\"feasibilityScore\":7.0"));
        assert!(text.contains("\"techSolutions\""));
        let parsed = parse_analysis(&text).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn integer_scores_are_accepted() {
        let mut value = serde_json::to_value(sample_result(1.0)).unwrap();
        value["feasibilityScore"] = serde_json::json!(9);
        let parsed = parse_analysis(&value.to_string()).unwrap();
        assert_eq!(parsed.feasibility_score, 9.0);
    }

    #[test]
    fn non_json_text_is_malformed() {
        let err = parse_analysis("Уучлаарай, би хариулж чадахгүй.").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut value = serde_json::to_value(sample_result(5.0)).unwrap();
        value.as_object_mut().unwrap().remove("categoryContext");
        let err = parse_analysis(&value.to_string()).unwrap_err();
        match err {
            AnalysisError::MalformedResponse(msg) => assert!(msg.contains("categoryContext")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn score_bands_follow_thresholds() {
        assert_eq!(sample_result(8.0).score_band(), ScoreBand::Strong);
        assert_eq!(sample_result(5.0).score_band(), ScoreBand::Moderate);
        assert_eq!(sample_result(4.9).score_band(), ScoreBand::Weak);
    }
}

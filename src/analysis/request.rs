use serde_json::{Value, json};

use crate::analysis::schema::response_schema;
use crate::categories::category_label;
use crate::errors::AnalysisError;

pub const SYSTEM_INSTRUCTION: &str = "\
Role: Та бол Монголын зах зээл, эдийн засгийн чиглэлээр мэргэшсэн, шилдэг бизнес зөвлөх бөгөөд шинжээч юм.
Task: Хэрэглэгчийн ирүүлсэн бизнесийн санааг (хувцас, гэр ахуй, технологи гэх мэт) Монгол улсын өнөөгийн эдийн засгийн нөхцөл байдалд (инфляци, ложистик, зах зээлийн багтаамж, хэрэглэгчийн зан төлөв) тулгуурлан бодит бөгөөд үнэн зөвөөр үнэлж дүгнэлт өгөх.

Guidelines for Analysis:
* Үнэн бодит бай: Санаа бүрийг магтах биш, харин Монголын хөрсөнд буух эсэхийг хатуу боловч үнэнээр хэл.
* Салбарын онцлог: Хувцас бол импортын хамаарал, технологи бол хүний нөөц ба дэд бүтэц, гэр ахуй бол дотоодын үйлдвэрлэл эсвэл ложистикийн зардлыг заавал тооц.
* Эдийн засгийн үзүүлэлт: 2026 оны Монголын эдийн засгийн төлөв байдал, худалдан авах чадварыг бодолц.
* Технологийн зөвлөгөө: Санааг илүү амжилттай болгохын тулд Монголд хэрэгжүүлэх боломжтой AI, блокчэйн эсвэл автоматжуулалтын шийдэл санал болго.

ХАРИУЛТЫГ ЗААВАЛ МОНГОЛ ХЭЛ ДЭЭР ӨГӨХ ЁСТОЙ.
Output must be in JSON format matching the provided schema.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub idea_text: String,
    pub category_id: String,
    /// Stamped by the controller that issued the request; 0 when built directly.
    pub ticket: u64,
}

impl AnalysisRequest {
    pub fn new(idea_text: &str, category_id: &str) -> Result<Self, AnalysisError> {
        let idea = idea_text.trim();
        if idea.is_empty() {
            return Err(AnalysisError::idea_required());
        }
        Ok(Self {
            idea_text: idea.to_string(),
            category_id: category_id.trim().to_string(),
            ticket: 0,
        })
    }

    pub fn category_label(&self) -> String {
        category_label(&self.category_id)
    }

    /// Sector line of the prompt: the raw id, with its label when the id is known.
    pub fn sector(&self) -> String {
        let label = self.category_label();
        if label == self.category_id {
            label
        } else {
            format!("{} ({label})", self.category_id)
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "Салбар: {}\nБизнесийн санаа: {}\n\nЭнэхүү бизнесийн санааг Монголын эдийн засагт тулгуурлан шинжилж, хэрэгжих боломж, давуу болон сул талыг тодорхойлно уу.",
            self.sector(),
            self.idea_text
        )
    }

    /// Body for the provider's `generateContent` call.
    pub fn to_payload(&self) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": self.prompt() }]
                }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_idea_is_rejected() {
        for idea in ["", "   ", "\n\t"] {
            let err = AnalysisRequest::new(idea, "tech").unwrap_err();
            assert!(err.is_validation());
            assert_eq!(err.to_string(), "idea required");
        }
    }

    #[test]
    fn prompt_embeds_category_and_idea() {
        let req = AnalysisRequest::new("  Монгол хээтэй гутал ", "fashion").unwrap();
        assert_eq!(req.idea_text, "Монгол хээтэй гутал");
        let prompt = req.prompt();
        assert!(prompt.starts_with("Салбар: fashion (Хувцас загвар)\n"));
        assert!(prompt.contains("fashion"));
        assert!(prompt.contains("Бизнесийн санаа: Монгол хээтэй гутал"));
    }

    #[test]
    fn unknown_category_is_passed_through() {
        let req = AnalysisRequest::new("Ноолууран бээлий", "agri").unwrap();
        assert!(req.prompt().starts_with("Салбар: agri\n"));
    }

    #[test]
    fn instruction_targets_2026_economy() {
        assert!(SYSTEM_INSTRUCTION.contains("2026 оны Монголын эдийн засгийн төлөв байдал"));
        assert!(SYSTEM_INSTRUCTION.contains("ХАРИУЛТЫГ ЗААВАЛ МОНГОЛ ХЭЛ ДЭЭР ӨГӨХ ЁСТОЙ."));
    }

    #[test]
    fn payload_carries_instruction_prompt_and_schema() {
        let req = AnalysisRequest::new("Хүнс хүргэлт", "retail").unwrap();
        let payload = req.to_payload();
        assert_eq!(
            payload["systemInstruction"]["parts"][0]["text"].as_str(),
            Some(SYSTEM_INSTRUCTION)
        );
        assert_eq!(
            payload["contents"][0]["parts"][0]["text"].as_str(),
            Some(req.prompt().as_str())
        );
        let config = &payload["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"], response_schema());
    }
}

// Response schema declared to the provider, plus the local check that the
// returned JSON actually has that shape.

use serde_json::{Value, json};

pub const REQUIRED_FIELDS: [&str; 8] = [
    "summary",
    "strengths",
    "weaknesses",
    "marketFit",
    "feasibilityScore",
    "economicReality",
    "techSolutions",
    "categoryContext",
];

pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "Бизнесийн санааны ерөнхий үнэлгээ."
            },
            "strengths": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Санааны давуу талууд."
            },
            "weaknesses": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Монголын зах зээл дээрх эрсдэл болон сул талууд."
            },
            "marketFit": {
                "type": "STRING",
                "description": "Зах зээлд нийцэх байдал болон зорилтот хэрэглэгчид."
            },
            "feasibilityScore": {
                "type": "NUMBER",
                "description": "Хэрэгжих боломжийн оноо (1-10)."
            },
            "economicReality": {
                "type": "STRING",
                "description": "Эдийн засгийн бодит нөхцөл байдалтай хэрхэн уялдаж байгаа тайлбар."
            },
            "techSolutions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["title", "description"]
                },
                "description": "Бизнесийг дэмжих технологийн шийдлүүд."
            },
            "categoryContext": {
                "type": "STRING",
                "description": "Сонгосон салбарын Монгол дахь өнөөгийн байдал."
            }
        },
        "required": REQUIRED_FIELDS
    })
}

/// Check `value` against a schema in the provider's OBJECT/ARRAY/STRING/NUMBER dialect.
/// Returns the path of the first mismatch.
pub fn validate(schema: &Value, value: &Value) -> Result<(), String> {
    validate_at(schema, value, "$")
}

fn validate_at(schema: &Value, value: &Value, path: &str) -> Result<(), String> {
    let kind = schema.get("type").and_then(|v| v.as_str()).unwrap_or("");
    match kind {
        "OBJECT" => {
            let obj = value
                .as_object()
                .ok_or_else(|| format!("{path}: expected object"))?;

            if let Some(required) = schema.get("required").and_then(|v| v.as_array()) {
                for name in required.iter().filter_map(|v| v.as_str()) {
                    if !obj.contains_key(name) {
                        return Err(format!("{path}.{name}: missing required field"));
                    }
                }
            }

            if let Some(props) = schema.get("properties").and_then(|v| v.as_object()) {
                for (name, prop_schema) in props {
                    if let Some(child) = obj.get(name) {
                        validate_at(prop_schema, child, &format!("{path}.{name}"))?;
                    }
                }
            }
            Ok(())
        }
        "ARRAY" => {
            let items = value
                .as_array()
                .ok_or_else(|| format!("{path}: expected array"))?;
            if let Some(item_schema) = schema.get("items") {
                for (idx, item) in items.iter().enumerate() {
                    validate_at(item_schema, item, &format!("{path}[{idx}]"))?;
                }
            }
            Ok(())
        }
        "STRING" if !value.is_string() => Err(format!("{path}: expected string")),
        "NUMBER" if !value.is_number() => Err(format!("{path}: expected number")),
        _ => Ok(()),
    }
}

// Parse-then-validate boundary for the vision service's replies
//
// The service is prompted to answer with one canonical JSON object, but it
// is not trusted to comply: replies arrive wrapped in markdown fences,
// padded with prose, or with units glued onto numbers. Everything here
// assumes the worst and keeps the raw text around for error messages.
use serde_json::Value;

use crate::client::AnalysisError;
use crate::Result;

/// Product identification extracted from a photo
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAnalysis {
    pub name: String,
    pub description: String,
}

/// Nutrition facts as the service reports them, after unit cleanup.
/// A field the reply omitted or that would not coerce stays `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionFacts {
    pub serving_size: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub sugar: Option<f64>,
    pub fat: Option<f64>,
}

/// Parse a product-analysis reply. Both `name` and `description` must be
/// present as strings or the whole reply is rejected.
pub fn parse_product(content: &str) -> Result<ProductAnalysis> {
    let payload = extract_json(content).ok_or_else(|| malformed(content))?;

    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(content))?;
    let description = payload
        .get("description")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(content))?;

    Ok(ProductAnalysis {
        name: name.to_string(),
        description: description.to_string(),
    })
}

/// Parse a nutrition-label reply. Numeric fields are coerced even if the
/// service returned them as unit-suffixed strings; a field that will not
/// coerce is dropped rather than failing the whole call.
pub fn parse_nutrition(content: &str) -> Result<NutritionFacts> {
    let payload = extract_json(content).ok_or_else(|| malformed(content))?;

    Ok(NutritionFacts {
        serving_size: payload
            .get("servingSize")
            .and_then(Value::as_str)
            .map(str::to_string),
        calories: payload.get("calories").and_then(coerce_number),
        protein: payload.get("protein").and_then(coerce_number),
        carbohydrates: payload.get("carbohydrates").and_then(coerce_number),
        sugar: payload.get("sugar").and_then(coerce_number),
        fat: payload.get("fat").and_then(coerce_number),
    })
}

fn malformed(content: &str) -> AnalysisError {
    AnalysisError::Malformed(format!(
        "Failed to parse reply as JSON. Raw response: {content}"
    ))
}

/// Pull the JSON object out of a reply, tolerating markdown fences and
/// surrounding prose. Returns None when no object can be recovered.
fn extract_json(content: &str) -> Option<Value> {
    let stripped = content.replace("```json", "").replace("```", "");
    let trimmed = stripped.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Fall back to the outermost brace pair
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(value) if value.is_object() => Some(value),
        _ => None,
    }
}

/// Coerce a JSON value to a plain number. Strings get their trailing unit
/// stripped first ("6g" -> 6, "2.5 g" -> 2.5). Anything else is absent.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let numeric = s
                .trim()
                .trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
            numeric.parse().ok()
        }
        _ => None,
    }
}

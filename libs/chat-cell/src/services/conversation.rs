use serde_json::Value;

use shared_ai::ChatContent;
use shared_models::error::AppError;

pub const INVALID_CONTENTS: &str = "Missing or invalid contents.";

/// Validate a client-supplied conversation: a non-empty array of
/// `{ role: "user" | "model", parts: [{ text }] }`.
pub fn parse_contents(contents: &Value) -> Result<Vec<ChatContent>, AppError> {
    let items = match contents.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(AppError::BadRequest(INVALID_CONTENTS.to_string())),
    };

    let turns: Vec<ChatContent> = items
        .iter()
        .map(|item| serde_json::from_value(item.clone()))
        .collect::<Result<_, _>>()
        .map_err(|_| AppError::BadRequest(INVALID_CONTENTS.to_string()))?;

    if let Some(bad) = turns.iter().find(|t| t.role != "user" && t.role != "model") {
        return Err(AppError::BadRequest(format!("Invalid role in contents: {}", bad.role)));
    }

    Ok(turns)
}

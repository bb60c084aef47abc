use serde::Serialize;
use serde_json::{json, Value};

/// `{"success": true, "data": ...}`
pub fn success<T: Serialize>(data: T) -> Value {
    json!({
        "success": true,
        "data": data,
    })
}

/// `{"success": true, "message": ..., "data": ...}`
pub fn success_with_message<T: Serialize>(message: &str, data: T) -> Value {
    json!({
        "success": true,
        "message": message,
        "data": data,
    })
}

use crate::errors::CoreError;

/// Decode the persisted pin set.
///
/// Layout: a JSON array of coin ids, e.g. `["bitcoin","ethereum"]`.
/// - absent value or `null` → empty set
/// - duplicate ids are dropped, first occurrence wins
/// - anything else that is not an array of strings is an error
pub fn decode_pin_set(raw: Option<&str>) -> Result<Vec<String>, CoreError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let ids: Option<Vec<String>> = serde_json::from_str(raw).map_err(|e| {
        CoreError::Deserialization(format!("Pinned coins are not a JSON array of ids: {e}"))
    })?;

    let mut unique: Vec<String> = Vec::new();
    for id in ids.unwrap_or_default() {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    Ok(unique)
}

/// Encode the pin set as a JSON array, preserving order.
pub fn encode_pin_set(ids: &[String]) -> Result<String, CoreError> {
    serde_json::to_string(ids)
        .map_err(|e| CoreError::Serialization(format!("Failed to encode pinned coins: {e}")))
}

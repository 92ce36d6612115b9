use tracing::warn;

use super::types::GenerateContentResponse;

/// Joins the text parts of the first candidate. `None` when the model
/// returned nothing usable (safety filter, empty candidate list).
pub fn extract_answer(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.as_ref().and_then(|c| c.first());

    let answer = candidate
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<String>()
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    if answer.is_none() {
        let reason = candidate
            .and_then(|c| c.finish_reason.as_deref())
            .unwrap_or("none");
        warn!(finish_reason = reason, "Gemini returned empty answer");
    }

    answer
}

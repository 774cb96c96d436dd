/// Separator used when a list of insight messages is stored as one text column.
pub const INSIGHT_DELIMITER: char = '|';

/// Join messages into their storage form, `"first|second|third"`.
pub fn join_insights(messages: &[String]) -> String {
    messages.join(&INSIGHT_DELIMITER.to_string())
}

/// Split a stored column back into messages, trimming each piece and
/// skipping empty ones.
pub fn split_insights(stored: &str) -> Vec<String> {
    stored
        .split(INSIGHT_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

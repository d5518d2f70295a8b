use crate::error::FormatError;

/// Locate the JSON object inside model output that may be wrapped in a
/// markdown code fence or surrounded by prose.
///
/// Text that already is a JSON object is returned as is. Otherwise the body
/// of a fence opening before the object is used (with or without a language
/// tag), or the whole text when there is none. The result spans the first `{`
/// to the last `}` of that region.
pub fn extract_json_object(text: &str) -> Result<&str, FormatError> {
    let trimmed = text.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok_and(|v| v.is_object()) {
        return Ok(trimmed);
    }

    let region = fenced_body(text).unwrap_or(text);

    let start = region.find('{');
    let end = region.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&region[start..=end]),
        _ => Err(FormatError::MalformedResponse(
            "no JSON object found in response".to_string(),
        )),
    }
}

fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    // Backticks after the first brace belong to a string value.
    if text.find('{').is_some_and(|brace| brace < open) {
        return None;
    }
    let after_open = &text[open + 3..];

    // The info string (e.g. `json`) runs to the end of the opening line.
    let body_start = match after_open.find('\n') {
        Some(newline) => newline + 1,
        None => after_open
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphanumeric())
            .map(|(i, _)| i)
            .unwrap_or(after_open.len()),
    };
    let body = &after_open[body_start..];

    // Only the last fence can close; earlier ones may sit inside values.
    match body.rfind("```") {
        Some(close) => Some(&body[..close]),
        None => Some(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::bare(r#"{"a":1}"#, r#"{"a":1}"#)]
    #[case::json_fence("```json\n{\"a\":1}\n```", r#"{"a":1}"#)]
    #[case::plain_fence("```\n{\"a\":1}\n```", r#"{"a":1}"#)]
    #[case::single_line_fence("```json {\"a\":1} ```", r#"{"a":1}"#)]
    #[case::unterminated_fence("```json\n{\"a\":1}\n", r#"{"a":1}"#)]
    #[case::prose_around("Here you go: {\"a\":{\"b\":2}} enjoy", r#"{"a":{"b":2}}"#)]
    #[case::prose_before_fence(
        "Sure!\n```json\n{\"a\":1}\n```\nAnything else?",
        r#"{"a":1}"#
    )]
    #[case::backticks_in_bare_value(
        r#"{"whatsapp":"use ```code``` here"}"#,
        r#"{"whatsapp":"use ```code``` here"}"#
    )]
    #[case::backticks_in_fenced_value(
        "```json\n{\"whatsapp\":\"use ```code``` here\"}\n```",
        r#"{"whatsapp":"use ```code``` here"}"#
    )]
    #[case::backticks_in_value_after_prose(
        "Here: {\"sms\":\"```x```\"} done",
        r#"{"sms":"```x```"}"#
    )]
    fn test_extracts_object(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(extract_json_object(input).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::prose("I cannot help with that.")]
    #[case::empty_fence("```json\n```")]
    #[case::reversed("} oops {")]
    fn test_no_object_is_malformed(#[case] input: &str) {
        assert!(matches!(
            extract_json_object(input),
            Err(FormatError::MalformedResponse(_))
        ));
    }
}

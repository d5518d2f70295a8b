pub mod extract;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::FormatError;
use crate::variant::Variant;

pub use extract::extract_json_object;

/// The three rewritten versions of one input. Always replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteResult {
    pub email: String,
    pub sms: String,
    pub whatsapp: String,
}

impl RewriteResult {
    pub fn get(&self, variant: Variant) -> &str {
        match variant {
            Variant::Email => &self.email,
            Variant::Sms => &self.sms,
            Variant::WhatsApp => &self.whatsapp,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, &str)> {
        Variant::all().iter().map(move |v| (*v, self.get(*v)))
    }
}

pub fn build_prompt(text: &str) -> String {
    let mut versions = String::new();
    for (i, variant) in Variant::all().iter().enumerate() {
        versions.push_str(&format!(
            "{}. {}: {}\n",
            i + 1,
            variant.title(),
            variant.style()
        ));
    }

    format!(
        "Rewrite the following text into 3 distinct formats based on the context provided below.\n\
         \n\
         IMPORTANT: Do NOT translate the text. Keep it in the original language of the input.\n\
         \n\
         Input text: \"{text}\"\n\
         \n\
         Provide 3 versions:\n\
         {versions}\n\
         Ensure the output is valid JSON."
    )
}

/// Response schema handed to the model alongside the prompt.
pub fn response_schema() -> Value {
    let mut properties = serde_json::Map::new();
    for variant in Variant::all() {
        properties.insert(
            variant.key().to_string(),
            json!({ "type": "STRING", "description": variant.schema_description() }),
        );
    }
    let required: Vec<&str> = Variant::all().iter().map(|v| v.key()).collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

/// Turn raw model output into a [`RewriteResult`].
pub fn parse_rewrite(text: &str) -> Result<RewriteResult, FormatError> {
    if text.trim().is_empty() {
        return Err(FormatError::UpstreamEmpty);
    }

    let object = extract_json_object(text)?;
    let value: Value = serde_json::from_str(object)?;

    let field = |variant: Variant| -> Result<String, FormatError> {
        match value.get(variant.key()) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(FormatError::MalformedResponse(format!(
                "field '{}' is not a string",
                variant.key()
            ))),
            None => Err(FormatError::MalformedResponse(format!(
                "missing field '{}'",
                variant.key()
            ))),
        }
    };

    Ok(RewriteResult {
        email: field(Variant::Email)?,
        sms: field(Variant::Sms)?,
        whatsapp: field(Variant::WhatsApp)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_input_and_styles() {
        let prompt = build_prompt("running late, start without me");
        assert!(prompt.contains("Input text: \"running late, start without me\""));
        assert!(prompt.contains("Do NOT translate"));
        assert!(prompt.contains("1. Email: Professional"));
        assert!(prompt.contains("2. SMS: Concise"));
        assert!(prompt.contains("3. WhatsApp: Casual"));
    }

    #[test]
    fn test_schema_requires_all_variants() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["email", "sms", "whatsapp"]));
        assert_eq!(schema["properties"]["sms"]["type"], "STRING");
    }

    #[test]
    fn test_parse_plain_json() {
        let result =
            parse_rewrite(r#"{"email":"Dear team","sms":"late","whatsapp":"late 🏃"}"#).unwrap();
        assert_eq!(result.get(Variant::Email), "Dear team");
        assert_eq!(result.get(Variant::Sms), "late");
        assert_eq!(result.get(Variant::WhatsApp), "late 🏃");
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"email\":\"a\",\"sms\":\"b\",\"whatsapp\":\"c\"}\n```";
        let result = parse_rewrite(text).unwrap();
        assert_eq!(result.sms, "b");
    }

    #[test]
    fn test_parse_json_with_monospace_markup() {
        let result =
            parse_rewrite(r#"{"email":"Dear all","sms":"hi","whatsapp":"use ```code``` here"}"#)
                .unwrap();
        assert_eq!(result.whatsapp, "use ```code``` here");
    }

    #[test]
    fn test_missing_sms_is_malformed() {
        let err = parse_rewrite(r#"{"email":"a","whatsapp":"c"}"#).unwrap_err();
        assert_eq!(
            err,
            FormatError::MalformedResponse("missing field 'sms'".to_string())
        );
    }

    #[test]
    fn test_non_string_field_is_malformed() {
        let err = parse_rewrite(r#"{"email":"a","sms":3,"whatsapp":"c"}"#).unwrap_err();
        assert!(matches!(err, FormatError::MalformedResponse(_)));
    }

    #[test]
    fn test_empty_text_is_upstream_empty() {
        assert_eq!(parse_rewrite("  \n").unwrap_err(), FormatError::UpstreamEmpty);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_rewrite("{email: nope}").unwrap_err();
        assert!(matches!(err, FormatError::MalformedResponse(_)));
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::VariantArray;

/// One of the three target communication tones produced per rewrite.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Email,
    Sms,
    WhatsApp,
}

impl Variant {
    pub fn all() -> &'static [Variant] {
        Self::VARIANTS
    }

    /// Field name in the rewrite JSON.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::Sms => "SMS",
            Self::WhatsApp => "WhatsApp",
        }
    }

    /// Instruction given to the model for this tone.
    pub fn style(&self) -> &'static str {
        match self {
            Self::Email => "Professional, polite, and suitable for formal communication.",
            Self::Sms => "Concise, direct, and short.",
            Self::WhatsApp => "Casual, friendly, and using appropriate emojis.",
        }
    }

    pub fn schema_description(&self) -> &'static str {
        match self {
            Self::Email => "Formal email version",
            Self::Sms => "Short SMS version",
            Self::WhatsApp => "Casual WhatsApp version with emojis",
        }
    }

    /// File name offered when saving this variant's audio.
    pub fn audio_file_name(&self) -> String {
        format!("{}-audio.wav", self.title().to_lowercase())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.key() == wanted)
            .ok_or_else(|| format!("unknown variant '{s}' (expected email, sms or whatsapp)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Email".parse::<Variant>().unwrap(), Variant::Email);
        assert_eq!(" SMS ".parse::<Variant>().unwrap(), Variant::Sms);
        assert_eq!("whatsapp".parse::<Variant>().unwrap(), Variant::WhatsApp);
        assert!("fax".parse::<Variant>().is_err());
    }

    #[test]
    fn test_audio_file_names() {
        assert_eq!(Variant::Email.audio_file_name(), "email-audio.wav");
        assert_eq!(Variant::Sms.audio_file_name(), "sms-audio.wav");
        assert_eq!(Variant::WhatsApp.audio_file_name(), "whatsapp-audio.wav");
    }
}

use fastformat_core::Variant;

/// A line typed at the interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    Speak(Variant),
    Play(Variant),
    Save(Variant),
    Copy(Variant),
    Share(Variant),
    Clear,
    Help,
    Exit,

    /// Not a command; rewrite the line.
    Rewrite(String),

    /// A command that could not be understood
    Invalid(String),
}

pub const HELP: &str = "\
Type a message to rewrite it. Commands:
  :speak <variant>   generate speech for a variant
  :play <variant>    play or stop a variant's speech
  :save <variant>    save a variant's speech as a WAV file
  :copy <variant>    copy a variant's text to the clipboard
  :share <variant>   share a variant's text
  :clear             clear the input and all results
  :help              show this help
  :quit              exit
Variants: email, sms, whatsapp";

pub fn parse_command(input: &str) -> LocalCommand {
    let trimmed = input.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return LocalCommand::Rewrite(input.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let argument = parts.next();
    if parts.next().is_some() {
        return LocalCommand::Invalid(format!("Too many arguments to :{name}"));
    }

    let with_variant = |make: fn(Variant) -> LocalCommand| match argument {
        Some(arg) => match arg.parse::<Variant>() {
            Ok(variant) => make(variant),
            Err(e) => LocalCommand::Invalid(e),
        },
        None => LocalCommand::Invalid(format!("Usage: :{name} <email|sms|whatsapp>")),
    };

    match name {
        "speak" => with_variant(LocalCommand::Speak),
        "play" => with_variant(LocalCommand::Play),
        "save" => with_variant(LocalCommand::Save),
        "copy" => with_variant(LocalCommand::Copy),
        "share" => with_variant(LocalCommand::Share),
        "clear" if argument.is_none() => LocalCommand::Clear,
        "help" if argument.is_none() => LocalCommand::Help,
        "exit" | "quit" | "q" if argument.is_none() => LocalCommand::Exit,
        _ => LocalCommand::Invalid(format!("Unknown command: {trimmed} (try :help)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_rewritten() {
        assert_eq!(
            parse_command("running late, start without me"),
            LocalCommand::Rewrite("running late, start without me".to_string())
        );
    }

    #[test]
    fn test_variant_commands() {
        assert_eq!(parse_command(":speak sms"), LocalCommand::Speak(Variant::Sms));
        assert_eq!(
            parse_command("  :play WhatsApp "),
            LocalCommand::Play(Variant::WhatsApp)
        );
        assert_eq!(parse_command(":save email"), LocalCommand::Save(Variant::Email));
        assert_eq!(parse_command(":copy sms"), LocalCommand::Copy(Variant::Sms));
        assert_eq!(parse_command(":share email"), LocalCommand::Share(Variant::Email));
    }

    #[test]
    fn test_bare_commands() {
        assert_eq!(parse_command(":clear"), LocalCommand::Clear);
        assert_eq!(parse_command(":help"), LocalCommand::Help);
        assert_eq!(parse_command(":quit"), LocalCommand::Exit);
        assert_eq!(parse_command(":exit"), LocalCommand::Exit);
    }

    #[test]
    fn test_invalid_commands() {
        assert!(matches!(parse_command(":speak"), LocalCommand::Invalid(_)));
        assert!(matches!(parse_command(":speak fax"), LocalCommand::Invalid(_)));
        assert!(matches!(parse_command(":play sms now"), LocalCommand::Invalid(_)));
        assert!(matches!(parse_command(":dance"), LocalCommand::Invalid(_)));
        assert!(matches!(parse_command(":clear all"), LocalCommand::Invalid(_)));
    }
}

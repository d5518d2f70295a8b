use fastformat_core::session::VariantCard;
use std::io::IsTerminal;

#[derive(Clone)]
pub struct Formatter {
    use_colors: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            use_colors: std::io::stdout().is_terminal(),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    pub fn print_system(&self, msg: &str) {
        if self.use_colors {
            println!("\x1b[33m[System]\x1b[0m {msg}");
        } else {
            println!("[System] {msg}");
        }
    }

    pub fn print_error(&self, msg: &str) {
        if self.use_colors {
            eprintln!("\x1b[31m[Error]\x1b[0m {msg}");
        } else {
            eprintln!("[Error] {msg}");
        }
    }

    pub fn print_prompt(&self) -> String {
        if self.use_colors {
            "\x1b[35m>\x1b[0m ".to_string()
        } else {
            "> ".to_string()
        }
    }

    pub fn print_card(&self, card: &VariantCard) {
        println!("{}", self.render_card(card));
    }

    pub fn print_cards(&self, cards: &[VariantCard]) {
        for card in cards.iter().filter(|c| c.has_content()) {
            self.print_card(card);
        }
    }

    /// Title line plus the card text, with the audio state appended to the title.
    pub fn render_card(&self, card: &VariantCard) -> String {
        let status = if card.is_busy() {
            " (generating audio...)"
        } else if card.is_playing() {
            " (playing)"
        } else if card.audio_handle().is_some() {
            " (audio ready)"
        } else {
            ""
        };

        let title = card.variant().title();
        let mut out = if self.use_colors {
            format!("\x1b[1;32m[{title}]\x1b[0m\x1b[90m{status}\x1b[0m\n")
        } else {
            format!("[{title}]{status}\n")
        };
        out.push_str(card.content());
        out.push('\n');

        if let Some(error) = card.error() {
            out.push_str(&format!("audio error: {error}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastformat_core::{AudioStore, Variant};

    #[test]
    fn test_render_plain_card() {
        let mut card = VariantCard::new(Variant::Sms, AudioStore::new());
        card.set_content("omw");

        assert_eq!(Formatter::plain().render_card(&card), "[SMS]\nomw\n");
    }

    #[test]
    fn test_render_busy_card() {
        let mut card = VariantCard::new(Variant::WhatsApp, AudioStore::new());
        card.set_content("hey");
        let _request = card.begin_audio().unwrap();

        let rendered = Formatter::plain().render_card(&card);
        assert!(rendered.starts_with("[WhatsApp] (generating audio...)"));
    }
}

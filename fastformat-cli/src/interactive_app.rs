use anyhow::Result;
use fastformat_core::session::PlayState;
use fastformat_core::share::ShareOutcome;
use fastformat_core::{RewriteProvider, SpeechProvider, Variant};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;

use crate::app::App;
use crate::commands::{parse_command, LocalCommand, HELP};

pub struct InteractiveApp<P> {
    app: App<P>,
}

impl<P> InteractiveApp<P>
where
    P: RewriteProvider + SpeechProvider + 'static,
{
    pub fn new(app: App<P>) -> Self {
        Self { app }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        self.app
            .formatter()
            .print_system("Type a message to rewrite it, or :help for commands.");

        loop {
            let prompt = self.app.formatter().print_prompt();
            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(err) => match err {
                    ReadlineError::Interrupted => {
                        continue;
                    }
                    _ => break,
                },
            };

            if line.trim().is_empty() {
                continue;
            }
            rl.add_history_entry(&line)?;

            let command = parse_command(&line);
            if command == LocalCommand::Exit {
                break;
            }
            self.handle(command).await;
        }

        println!("\nGoodbye!");
        Ok(())
    }

    async fn handle(&mut self, command: LocalCommand) {
        info!(?command, "Interactive command");
        match command {
            LocalCommand::Rewrite(text) => {
                self.app.rewrite(&text).await;
            }
            LocalCommand::Speak(variant) => self.speak(variant).await,
            LocalCommand::Play(variant) => self.play(variant).await,
            LocalCommand::Save(variant) => match self.app.save(variant) {
                Ok(path) => self
                    .app
                    .formatter()
                    .print_system(&format!("Saved {variant} audio to {}", path.display())),
                Err(e) => self.app.formatter().print_error(&format!("{e:#}")),
            },
            LocalCommand::Copy(variant) => match self.app.copy(variant) {
                Ok(true) => self
                    .app
                    .formatter()
                    .print_system(&format!("Copied {variant} to the clipboard")),
                Ok(false) => self.nothing_yet(variant),
                Err(e) => self.app.formatter().print_error(&format!("{e:#}")),
            },
            LocalCommand::Share(variant) => match self.app.share(variant) {
                Ok(ShareOutcome::Shared) => self
                    .app
                    .formatter()
                    .print_system(&format!("Shared {variant}")),
                Ok(ShareOutcome::Copied) => self.app.formatter().print_system(&format!(
                    "No share target here; copied {variant} to the clipboard"
                )),
                Ok(ShareOutcome::Skipped) => {}
                Ok(ShareOutcome::Empty) => self.nothing_yet(variant),
                Err(e) => self.app.formatter().print_error(&format!("{e:#}")),
            },
            LocalCommand::Clear => {
                self.app.clear();
                self.app.formatter().print_system("Cleared");
            }
            LocalCommand::Help => println!("{HELP}"),
            LocalCommand::Invalid(msg) => self.app.formatter().print_error(&msg),
            LocalCommand::Exit => {}
        }
    }

    async fn speak(&mut self, variant: Variant) {
        self.app
            .formatter()
            .print_system(&format!("Generating {variant} audio..."));
        for (variant, result) in self.app.speak(&[variant]).await {
            match result {
                Ok(Some(_)) => self.app.formatter().print_system(&format!(
                    "{variant} audio ready (:play {0} or :save {0})",
                    variant.key()
                )),
                Ok(None) => {}
                Err(e) => self.app.formatter().print_error(&format!("{variant}: {e}")),
            }
        }
    }

    async fn play(&mut self, variant: Variant) {
        match self.app.toggle_play(variant).await {
            Ok(PlayState::Playing) => self
                .app
                .formatter()
                .print_system(&format!("Playing {variant} (:play {} to stop)", variant.key())),
            Ok(PlayState::Stopped) => self
                .app
                .formatter()
                .print_system(&format!("Stopped {variant}")),
            Err(e) => self.app.formatter().print_error(&format!("{variant}: {e}")),
        }
    }

    fn nothing_yet(&self, variant: Variant) {
        self.app
            .formatter()
            .print_system(&format!("Nothing to use for {variant} yet; type a message first"));
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use fastformat_core::Variant;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod encode;
mod formatter;
mod interactive_app;

use crate::app::{App, AppOptions};
use crate::interactive_app::InteractiveApp;

#[derive(Parser, Debug)]
#[command(name = "fastformat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "FastFormat - rewrite a message as an email, an SMS and a WhatsApp note")]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Text to rewrite. Starts an interactive session when omitted
    text: Option<String>,

    /// Generate speech for these variants (email, sms, whatsapp)
    #[arg(long, value_delimiter = ',', value_name = "VARIANTS")]
    speak: Vec<Variant>,

    /// Play the generated speech once it is ready
    #[arg(long)]
    play: bool,

    /// Directory for saved audio files
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Prebuilt voice used for speech
    #[arg(long, value_name = "NAME")]
    voice: Option<String>,

    /// Load settings from a specific file
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wrap a raw 24 kHz mono 16-bit PCM file in a WAV header
    Encode {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    setup_tracing()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let local = tokio::task::LocalSet::new();
        local.run_until(async_main()).await
    })
}

async fn async_main() -> Result<()> {
    let args = Args::parse();

    info!(
        "CLI startup: text={}, speak={:?}, play={}, voice={:?}, settings={:?}",
        args.text.is_some(),
        args.speak,
        args.play,
        args.voice,
        args.settings
    );

    if let Some(Command::Encode { input, output }) = args.command {
        let written = encode::encode_file(&input, &output)?;
        println!("Wrote {written} bytes to {}", output.display());
        return Ok(());
    }

    let options = AppOptions {
        settings_path: args.settings,
        voice: args.voice,
        out_dir: args.out_dir,
    };
    let mut app = App::new(options)?;

    match args.text {
        Some(text) => app.run_once(&text, &args.speak, args.play).await,
        None => {
            let mut interactive = InteractiveApp::new(app);
            interactive.run().await
        }
    }
}

fn setup_tracing() -> Result<()> {
    use std::fs;
    use tracing_subscriber::fmt;

    // Create trace directory in user's home
    let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    let trace_dir = home.join(".fastformat").join("trace");
    fs::create_dir_all(&trace_dir)?;

    let log_file = trace_dir.join("fastformat.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tracing initialized to {:?}", log_file);
    Ok(())
}

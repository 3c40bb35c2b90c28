// lyricpad - terminal songwriting pad
// Lyrics on the left, sticky notes on the right, rhymes whenever you hit Enter

use anyhow::Result;
use clap::Parser;
use lyricpad::rhyme::{GeminiClient, RhymeProvider};
use lyricpad::ui::{App, EventHandler, TerminalManager};
use lyricpad::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lyricpad")]
#[command(about = "A terminal songwriting pad with rhyme suggestions")]
struct Args {
    /// Enable developer logging (prints where the log file goes)
    #[arg(long)]
    dev: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print rhymes for WORD and exit without opening the editor
    #[arg(long, value_name = "WORD")]
    rhyme: Option<String>,
}

fn init_logging(log_dir: &Path, dev: bool) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    // Daily rotating file appender - the terminal belongs to the UI
    let file_appender = tracing_appender::rolling::daily(log_dir, "lyricpad.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lyricpad=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if dev {
        eprintln!("🔧 Dev mode: logging to {}", log_dir.display());
    }

    // Keep the writer alive for the whole process
    std::mem::forget(guard);

    Ok(())
}

async fn print_rhymes(provider: &dyn RhymeProvider, word: &str) {
    let rhymes = provider.fetch_rhymes(word).await;

    println!("🎵 Rhymes for '{}'", word);
    println!("Perfect:  {}", format_list(&rhymes.perfect));
    println!("Phonetic: {}", format_list(&rhymes.phonetic));
}

fn format_list(words: &[String]) -> String {
    if words.is_empty() {
        "none found".to_string()
    } else {
        words.join(", ")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    init_logging(&config.log_dir, args.dev)?;
    info!("🎵 lyricpad starting up");

    let provider: Arc<dyn RhymeProvider> = Arc::new(GeminiClient::new(&config.rhymes)?);

    if let Some(word) = args.rhyme.as_deref() {
        print_rhymes(provider.as_ref(), word).await;
        return Ok(());
    }

    let mut events = EventHandler::new();
    let _reader = events.spawn_terminal_reader();
    let _ticker = events.spawn_ticker(Duration::from_millis(100));

    let mut terminal = TerminalManager::new()?;
    let mut app = App::new(config, provider, events.sender());
    app.run(&mut terminal, &mut events).await?;

    info!("👋 lyricpad shut down cleanly");
    Ok(())
}

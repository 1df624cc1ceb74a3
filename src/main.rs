use affix::{
    app::App,
    config::{Config, ConfigStore, FileConfigStore},
    deck,
    dataset::LoadedDeck,
    runtime::{CrosstermEventSource, QuizEvent, Runner},
    speech,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 250;

/// terminal word-building quiz
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal vocabulary quiz: each deck row decomposes a word into \
prefix, root, and suffix; you are shown the meaning and must rebuild the spelling \
from three pickers."
)]
pub struct Cli {
    /// deck file to play (CSV with Word, Meaning, Prefix, Root, Suffix, Story columns)
    deck: Option<PathBuf>,

    /// play a built-in sample deck instead of a file
    #[clap(short, long, value_enum)]
    sample: Option<BuiltinDeck>,

    /// parse the deck, print what loaded, and exit without starting the quiz
    #[clap(long)]
    check: bool,

    /// do not speak solved words aloud
    #[clap(short, long)]
    mute: bool,

    /// remember this deck and sound choice as the default for future runs
    #[clap(long)]
    remember: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum BuiltinDeck {
    Starter,
    Latin,
}

impl BuiltinDeck {
    fn file_name(&self) -> String {
        self.to_string().to_lowercase()
    }
}

/// Where the deck text comes from for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeckSource {
    File(PathBuf),
    Builtin(String),
}

impl DeckSource {
    fn label(&self) -> String {
        match self {
            DeckSource::File(path) => path.display().to_string(),
            DeckSource::Builtin(name) => format!("built-in '{name}'"),
        }
    }

    fn load(&self) -> Result<LoadedDeck, deck::DeckError> {
        match self {
            DeckSource::File(path) => deck::load_path(path),
            DeckSource::Builtin(name) => deck::load_builtin(name),
        }
    }
}

/// CLI flags win over remembered preferences.
fn resolve_source(cli: &Cli, config: &Config) -> Option<DeckSource> {
    if let Some(sample) = cli.sample {
        return Some(DeckSource::Builtin(sample.file_name()));
    }
    if let Some(path) = &cli.deck {
        return Some(DeckSource::File(path.clone()));
    }
    if let Some(name) = &config.sample {
        return Some(DeckSource::Builtin(name.clone()));
    }
    config.deck.as_ref().map(|p| DeckSource::File(p.clone()))
}

fn print_check_report(source: &DeckSource, loaded: &LoadedDeck) {
    println!("deck: {}", source.label());
    println!("words: {}", loaded.dataset.len());
    println!(
        "components: {} prefixes, {} roots, {} suffixes",
        loaded.dataset.prefix_options.len(),
        loaded.dataset.root_options.len(),
        loaded.dataset.suffix_options.len()
    );
    for warning in &loaded.warnings {
        println!("warning: {warning}");
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();
    let config = store.load();

    let Some(source) = resolve_source(&cli, &config) else {
        let mut cmd = Cli::command();
        cmd.error(
            ErrorKind::MissingRequiredArgument,
            "no deck given; pass a CSV deck file or --sample starter",
        )
        .exit();
    };

    let loaded = match source.load() {
        Ok(loaded) => loaded,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, format!("{}: {e}", source.label()))
                .exit();
        }
    };

    if cli.check {
        print_check_report(&source, &loaded);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mute = cli.mute || config.mute;
    let mut app = App::new(loaded, source.label(), speech::for_mute_flag(mute));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = run_quiz(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    run_result?;

    if cli.remember {
        let remembered = match &source {
            DeckSource::File(path) => Config {
                deck: Some(path.clone()),
                sample: None,
                mute,
            },
            DeckSource::Builtin(name) => Config {
                deck: None,
                sample: Some(name.clone()),
                mute,
            },
        };
        store.save(&remembered)?;
    }

    Ok(())
}

fn run_quiz<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            QuizEvent::Key(key) => {
                if app.handle_key(key) {
                    return Ok(());
                }
            }
            // Ticks and resizes just fall through to the redraw.
            QuizEvent::Resize | QuizEvent::Tick => {}
        }
    }
}

use std::env;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// Renders a solved word as audio. Implementations must never block
/// the quiz or influence its outcome; pronunciation is fire-and-forget.
pub trait Pronouncer {
    fn pronounce(&self, word: &str);
}

/// Does nothing. Used when muted or when no synthesizer is installed.
#[derive(Debug, Default)]
pub struct SilentPronouncer;

impl Pronouncer for SilentPronouncer {
    fn pronounce(&self, _word: &str) {}
}

/// Speaks through an external synthesizer command with all standard
/// streams suppressed, so the synthesizer can never touch the terminal
/// the quiz is drawing on.
#[derive(Debug, Clone)]
pub struct CommandPronouncer {
    program: String,
}

// Probed in order; `say` ships with macOS, espeak variants are the
// common Linux install.
const SYNTHESIZERS: [&str; 3] = ["say", "espeak-ng", "espeak"];

impl CommandPronouncer {
    /// Picks the first synthesizer present on this system, if any.
    pub fn detect() -> Option<Self> {
        SYNTHESIZERS
            .iter()
            .find(|program| find_in_path(program).is_some())
            .map(|program| Self {
                program: program.to_string(),
            })
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Pronouncer for CommandPronouncer {
    fn pronounce(&self, word: &str) {
        let spawned = Command::new(&self.program)
            .arg(word)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        // Reap the child off-thread; a missing or failing synthesizer
        // is not our problem.
        if let Ok(mut child) = spawned {
            thread::spawn(move || {
                let _ = child.wait();
            });
        }
    }
}

/// The pronouncer the app should use: silent when muted, otherwise the
/// best synthesizer found on this system, otherwise silent.
pub fn for_mute_flag(mute: bool) -> Box<dyn Pronouncer> {
    if mute {
        return Box::new(SilentPronouncer);
    }
    match CommandPronouncer::detect() {
        Some(pronouncer) => Box::new(pronouncer),
        None => Box::new(SilentPronouncer),
    }
}

fn find_in_path(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

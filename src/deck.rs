use crate::dataset::{self, FormatError, LoadedDeck};
use include_dir::{include_dir, Dir};
use std::fs;
use std::path::Path;
use thiserror::Error;

static DECK_DIR: Dir = include_dir!("src/decks");

/// Failure to produce a dataset from a deck source.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("could not read deck file: {0}")]
    Io(#[from] std::io::Error),

    #[error("no built-in deck named '{0}'")]
    UnknownBuiltin(String),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Load a deck from a file on disk. The surrounding tool expects a
/// `.csv` extension, but only the content matters here.
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<LoadedDeck, DeckError> {
    let raw = fs::read_to_string(path)?;
    Ok(dataset::load(&raw)?)
}

/// Load one of the decks embedded in the binary, by lowercase name.
pub fn load_builtin(name: &str) -> Result<LoadedDeck, DeckError> {
    let raw = builtin_text(name).ok_or_else(|| DeckError::UnknownBuiltin(name.to_string()))?;
    Ok(dataset::load(raw)?)
}

/// Names of the embedded decks, in embedding order.
pub fn builtin_names() -> Vec<&'static str> {
    DECK_DIR
        .files()
        .filter_map(|f| f.path().file_stem())
        .filter_map(|s| s.to_str())
        .collect()
}

fn builtin_text(name: &str) -> Option<&'static str> {
    DECK_DIR
        .get_file(format!("{name}.csv"))
        .and_then(|f| f.contents_utf8())
}

use itertools::Itertools;
use std::fmt;
use thiserror::Error;

/// Marker standing in for "no prefix" / "no suffix" in the pickers.
/// Always the first entry of the prefix and suffix option lists, and
/// equivalent to the empty string when a word is assembled.
pub const EMPTY_COMPONENT_PLACEHOLDER: &str = "[none]";

const REQUIRED_COLUMNS: [&str; 6] = ["Word", "Meaning", "Prefix", "Root", "Suffix", "Story"];

/// Fatal outcome of a single [`load`] call. Row-level problems are not
/// fatal; they accumulate as [`RowWarning`]s instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The deck needs at least a header row and one data row.
    #[error("deck must contain a header row and at least one data row")]
    InsufficientLines,

    /// One or more of the six required columns is absent from the header.
    #[error("deck header is missing required columns: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    /// Every data row was skipped.
    #[error("deck contains no usable word rows")]
    NoValidRows,
}

/// One vocabulary entry: the assembled spelling, its meaning, the
/// decomposition it must be rebuilt from, and an explanatory story.
/// `word`, `meaning` and `root` are never empty; `prefix`, `suffix`
/// and `story` may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordRecord {
    pub word: String,
    pub meaning: String,
    pub prefix: String,
    pub root: String,
    pub suffix: String,
    pub story: String,
}

/// Why a data row was dropped during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The row's field count disagrees with the header's.
    FieldCount { expected: usize, found: usize },
    /// Word, Meaning or Root came out empty.
    MissingCoreField,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            SkipReason::MissingCoreField => write!(f, "Word, Meaning or Root is empty"),
        }
    }
}

/// A skipped data row: where it was, why, and what it said.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWarning {
    /// 1-based line number within the deck text.
    pub line: usize,
    pub reason: SkipReason,
    pub content: String,
}

impl fmt::Display for RowWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} skipped ({}): {}", self.line, self.reason, self.content)
    }
}

/// The validated corpus for one deck: records in file order plus the
/// three derived picker option lists. Rebuilt wholesale on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub records: Vec<WordRecord>,
    /// Placeholder first, then every distinct non-empty prefix, sorted.
    pub prefix_options: Vec<String>,
    /// Every distinct root, sorted. No placeholder: roots are mandatory.
    pub root_options: Vec<String>,
    /// Placeholder first, then every distinct non-empty suffix, sorted.
    pub suffix_options: Vec<String>,
}

impl Dataset {
    fn from_records(records: Vec<WordRecord>) -> Self {
        let prefix_options = component_options(records.iter().map(|r| r.prefix.as_str()));
        let suffix_options = component_options(records.iter().map(|r| r.suffix.as_str()));
        let root_options = records
            .iter()
            .map(|r| r.root.clone())
            .unique()
            .sorted()
            .collect();

        Self {
            records,
            prefix_options,
            root_options,
            suffix_options,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A successful load: the dataset plus any rows that were skipped on
/// the way in.
#[derive(Debug, Clone)]
pub struct LoadedDeck {
    pub dataset: Dataset,
    pub warnings: Vec<RowWarning>,
}

/// The picker value a raw prefix/suffix maps to: the part itself, or
/// the placeholder when the word has none.
pub fn component_label(part: &str) -> String {
    if part.is_empty() {
        EMPTY_COMPONENT_PLACEHOLDER.to_string()
    } else {
        part.to_string()
    }
}

/// The spelling fragment a picker selection contributes: the selection
/// itself, or nothing for the placeholder.
pub fn component_value(selection: &str) -> &str {
    if selection == EMPTY_COMPONENT_PLACEHOLDER {
        ""
    } else {
        selection
    }
}

/// Parse raw deck text into a validated [`Dataset`].
///
/// The first line is the header; its comma-separated fields are matched
/// case-insensitively against the six required columns, in any order,
/// with unrecognized extras ignored. Each later non-empty line becomes
/// one candidate record. Bad rows (wrong field count, empty core
/// fields) are skipped with a warning rather than failing the load.
///
/// Either returns a dataset holding at least one record, or a
/// [`FormatError`]; a half-built dataset is never observable.
pub fn load(raw_text: &str) -> Result<LoadedDeck, FormatError> {
    let lines: Vec<&str> = raw_text.trim().lines().collect();
    if lines.len() < 2 {
        return Err(FormatError::InsufficientLines);
    }

    let headers: Vec<&str> = lines[0].split(',').map(str::trim).collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut records = Vec::new();
    let mut warnings = Vec::new();

    for (idx, raw_line) in lines.iter().enumerate().skip(1) {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line);
        if fields.len() != headers.len() {
            warnings.push(RowWarning {
                line: idx + 1,
                reason: SkipReason::FieldCount {
                    expected: headers.len(),
                    found: fields.len(),
                },
                content: line.to_string(),
            });
            continue;
        }

        let record = columns.extract(&fields);
        if record.word.is_empty() || record.meaning.is_empty() || record.root.is_empty() {
            warnings.push(RowWarning {
                line: idx + 1,
                reason: SkipReason::MissingCoreField,
                content: line.to_string(),
            });
            continue;
        }

        records.push(record);
    }

    if records.is_empty() {
        return Err(FormatError::NoValidRows);
    }

    Ok(LoadedDeck {
        dataset: Dataset::from_records(records),
        warnings,
    })
}

/// Header positions of the six required columns.
struct ColumnMap {
    word: usize,
    meaning: usize,
    prefix: usize,
    root: usize,
    suffix: usize,
    story: usize,
}

impl ColumnMap {
    fn resolve(headers: &[&str]) -> Result<Self, FormatError> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let positions: Vec<Option<usize>> = REQUIRED_COLUMNS.iter().map(|c| find(c)).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(FormatError::MissingHeaders(missing));
        }

        Ok(Self {
            word: positions[0].unwrap(),
            meaning: positions[1].unwrap(),
            prefix: positions[2].unwrap(),
            root: positions[3].unwrap(),
            suffix: positions[4].unwrap(),
            story: positions[5].unwrap(),
        })
    }

    fn extract(&self, fields: &[String]) -> WordRecord {
        WordRecord {
            word: fields[self.word].clone(),
            meaning: fields[self.meaning].clone(),
            prefix: fields[self.prefix].clone(),
            root: fields[self.root].clone(),
            suffix: fields[self.suffix].clone(),
            story: fields[self.story].clone(),
        }
    }
}

/// Split one data line into trimmed fields, honoring double-quoted
/// fields (embedded commas, doubled-quote escapes). Best-effort: a
/// line the reader cannot parse at all collapses to a single field,
/// which the caller then skips as a field-count mismatch.
fn split_fields(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_owned).collect(),
        _ => vec![line.to_string()],
    }
}

fn component_options<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut options = vec![EMPTY_COMPONENT_PLACEHOLDER.to_string()];
    options.extend(
        parts
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .unique()
            .sorted(),
    );
    options
}

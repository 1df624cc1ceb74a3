use crate::dataset::{component_value, LoadedDeck, RowWarning};
use crate::session::{Advance, BuildOutcome, QuizSession};
use crate::speech::Pronouncer;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which screen the terminal is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Deck is loaded; waiting for the player to start.
    Welcome,
    /// A word is active; its meaning is the prompt.
    Question { meaning: String },
    /// The quiz ended; final tally.
    Summary { score: usize, total: usize },
}

/// The three component pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Prefix,
    Root,
    Suffix,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Prefix, Column::Root, Column::Suffix];

    fn index(self) -> usize {
        match self {
            Column::Prefix => 0,
            Column::Root => 1,
            Column::Suffix => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Column::Prefix => Column::Root,
            Column::Root => Column::Suffix,
            Column::Suffix => Column::Prefix,
        }
    }

    fn prev(self) -> Self {
        match self {
            Column::Prefix => Column::Suffix,
            Column::Root => Column::Prefix,
            Column::Suffix => Column::Root,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::Prefix => "PREFIX",
            Column::Root => "ROOT",
            Column::Suffix => "SUFFIX",
        }
    }
}

/// Cursor state over the three option lists. Rebuilt on every advance
/// so each word starts from the placeholder defaults.
#[derive(Debug, Clone)]
pub struct Picker {
    pub column: Column,
    options: [Vec<String>; 3],
    cursors: [usize; 3],
}

impl Picker {
    pub fn new(prefixes: Vec<String>, roots: Vec<String>, suffixes: Vec<String>) -> Self {
        Self {
            column: Column::Prefix,
            options: [prefixes, roots, suffixes],
            // Index 0 is the placeholder for prefix/suffix, and the
            // first root otherwise; both are the intended defaults.
            cursors: [0, 0, 0],
        }
    }

    pub fn options(&self, column: Column) -> &[String] {
        &self.options[column.index()]
    }

    pub fn cursor(&self, column: Column) -> usize {
        self.cursors[column.index()]
    }

    pub fn selected(&self, column: Column) -> &str {
        &self.options[column.index()][self.cursors[column.index()]]
    }

    /// The current (prefix, root, suffix) picker values.
    pub fn selection(&self) -> (&str, &str, &str) {
        (
            self.selected(Column::Prefix),
            self.selected(Column::Root),
            self.selected(Column::Suffix),
        )
    }

    /// The word the current selection would assemble into.
    pub fn built_preview(&self) -> String {
        let (prefix, root, suffix) = self.selection();
        format!(
            "{}{}{}",
            component_value(prefix),
            root,
            component_value(suffix)
        )
    }

    pub fn focus_next_column(&mut self) {
        self.column = self.column.next();
    }

    pub fn focus_prev_column(&mut self) {
        self.column = self.column.prev();
    }

    pub fn move_up(&mut self) {
        let cursor = &mut self.cursors[self.column.index()];
        *cursor = cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        let idx = self.column.index();
        let last = self.options[idx].len() - 1;
        let cursor = &mut self.cursors[idx];
        *cursor = (*cursor + 1).min(last);
    }
}

/// Feedback shown under the pickers after a build attempt. The correct
/// word is only ever present after it has been solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct {
        word: String,
        story: String,
    },
    Incorrect {
        story: String,
        expected_prefix: String,
        expected_root: String,
        expected_suffix: String,
    },
}

/// Everything the terminal shows, plus the session it projects.
pub struct App {
    pub session: QuizSession,
    pub warnings: Vec<RowWarning>,
    pub deck_name: String,
    pub screen: Screen,
    pub picker: Picker,
    pub feedback: Option<Feedback>,
    pronouncer: Box<dyn Pronouncer>,
}

impl App {
    pub fn new(loaded: LoadedDeck, deck_name: String, pronouncer: Box<dyn Pronouncer>) -> Self {
        let session = QuizSession::start(loaded.dataset);
        let picker = Picker::new(
            session.dataset().prefix_options.clone(),
            session.dataset().root_options.clone(),
            session.dataset().suffix_options.clone(),
        );

        Self {
            session,
            warnings: loaded.warnings,
            deck_name,
            screen: Screen::Welcome,
            picker,
            feedback: None,
            pronouncer,
        }
    }

    /// Apply one keypress. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return true;
        }

        match &self.screen {
            Screen::Welcome => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.advance(),
                KeyCode::Char('q') => return true,
                _ => {}
            },
            Screen::Question { .. } => match key.code {
                KeyCode::Left => self.picker.focus_prev_column(),
                KeyCode::Right | KeyCode::Tab => self.picker.focus_next_column(),
                KeyCode::Up => self.picker.move_up(),
                KeyCode::Down => self.picker.move_down(),
                KeyCode::Enter => {
                    if self.session.attempt_locked() {
                        self.advance();
                    } else {
                        self.build();
                    }
                }
                KeyCode::Char(' ') | KeyCode::Char('n') => {
                    if self.session.attempt_locked() {
                        self.advance();
                    }
                }
                KeyCode::Char('q') => return true,
                _ => {}
            },
            Screen::Summary { .. } => match key.code {
                KeyCode::Char('r') => {
                    self.session.reset();
                    self.feedback = None;
                    self.screen = Screen::Welcome;
                }
                KeyCode::Char('q') | KeyCode::Enter => return true,
                _ => {}
            },
        }

        false
    }

    fn advance(&mut self) {
        // The screen gates which calls are legal; a session error here
        // means a stale screen and is dropped.
        match self.session.advance() {
            Ok(Advance::NextWord {
                meaning,
                prefix_options,
                root_options,
                suffix_options,
            }) => {
                self.picker = Picker::new(prefix_options, root_options, suffix_options);
                self.feedback = None;
                self.screen = Screen::Question { meaning };
            }
            Ok(Advance::GameOver { score, total }) => {
                self.feedback = None;
                self.screen = Screen::Summary { score, total };
            }
            Err(_) => {}
        }
    }

    fn build(&mut self) {
        let (prefix, root, suffix) = self.picker.selection();
        let (prefix, root, suffix) = (prefix.to_owned(), root.to_owned(), suffix.to_owned());

        match self.session.attempt_build(&prefix, &root, &suffix) {
            Ok(BuildOutcome::Correct { story, .. }) => {
                let word = self.session.solved_word().unwrap_or_default().to_owned();
                self.pronouncer.pronounce(&word);
                self.feedback = Some(Feedback::Correct { word, story });
            }
            Ok(BuildOutcome::Incorrect {
                story,
                expected_prefix,
                expected_root,
                expected_suffix,
            }) => {
                self.feedback = Some(Feedback::Incorrect {
                    story,
                    expected_prefix,
                    expected_root,
                    expected_suffix,
                });
            }
            Err(_) => {}
        }
    }
}

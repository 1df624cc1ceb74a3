use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use affix::app::{App, Screen};
use affix::dataset::{component_label, load};
use affix::runtime::{QuizEvent, Runner, TestEventSource};
use affix::session::{Advance, BuildOutcome, QuizSession};
use affix::speech::SilentPronouncer;

fn key(code: KeyCode) -> QuizEvent {
    QuizEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Headless integration using the internal runtime + App without a TTY.
// Verifies that a minimal quiz flow completes via Runner/TestEventSource.
#[test]
fn headless_quiz_flow_completes() {
    // One-word deck keeps the key script deterministic: the only
    // word is un + happy + [none].
    let text = "Word,Meaning,Prefix,Root,Suffix,Story\n\
                unhappy,not happy,un,happy,,un- negates";
    let mut app = App::new(
        load(text).unwrap(),
        "headless deck".to_string(),
        Box::new(SilentPronouncer),
    );

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(5));

    tx.send(key(KeyCode::Enter)).unwrap(); // start
    tx.send(key(KeyCode::Down)).unwrap(); // prefix -> "un"
    tx.send(key(KeyCode::Enter)).unwrap(); // build: correct
    tx.send(key(KeyCode::Enter)).unwrap(); // advance: game over
    tx.send(key(KeyCode::Enter)).unwrap(); // leave the summary

    let mut exited = false;
    for _ in 0..100u32 {
        match runner.step() {
            QuizEvent::Key(k) => {
                if app.handle_key(k) {
                    exited = true;
                    break;
                }
            }
            QuizEvent::Resize | QuizEvent::Tick => {}
        }
    }

    assert!(exited, "the key script should exit from the summary screen");
    assert_eq!(app.session.score(), 1);
    assert!(app.session.is_finished());
}

#[test]
fn headless_full_game_over_builtin_deck() {
    // Play the whole embedded starter deck through the session API,
    // missing once per word before solving it.
    let loaded = affix::deck::load_builtin("starter").expect("starter deck is embedded");
    assert!(loaded.warnings.is_empty());

    let total = loaded.dataset.len();
    let mut session = QuizSession::start(loaded.dataset);

    for _ in 0..total {
        let meaning = match session.advance().unwrap() {
            Advance::NextWord { meaning, .. } => meaning,
            other => panic!("expected a word, got {other:?}"),
        };
        let record = session
            .dataset()
            .records
            .iter()
            .find(|r| r.meaning == meaning)
            .expect("meaning belongs to the deck")
            .clone();

        let miss = session
            .attempt_build("un", &record.root, "ment")
            .expect("unsolved words accept attempts");
        if let BuildOutcome::Correct { .. } = miss {
            // "un" + root + "ment" happened to be the word itself;
            // nothing else to do for this item.
        } else {
            let outcome = session
                .attempt_build(
                    &component_label(&record.prefix),
                    &record.root,
                    &component_label(&record.suffix),
                )
                .unwrap();
            assert!(matches!(outcome, BuildOutcome::Correct { .. }));
        }
    }

    match session.advance().unwrap() {
        Advance::GameOver { score, total: t } => {
            assert_eq!(score, total);
            assert_eq!(t, total);
        }
        other => panic!("expected game over, got {other:?}"),
    }
}

#[test]
fn load_warnings_surface_in_the_app() {
    let text = "Word,Meaning,Prefix,Root,Suffix,Story\n\
                unhappy,not happy,un,happy,,story\n\
                only,five,fields,in,here\n\
                ,missing word,un,happy,,story";
    let loaded = load(text).unwrap();
    let app = App::new(
        loaded,
        "warning deck".to_string(),
        Box::new(SilentPronouncer),
    );

    assert_eq!(app.session.total(), 1);
    assert_eq!(app.warnings.len(), 2);
    assert_eq!(app.screen, Screen::Welcome);
}

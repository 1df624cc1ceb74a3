use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Column, Feedback, Screen};

const HORIZONTAL_MARGIN: u16 = 4;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen.clone() {
            Screen::Welcome => render_welcome(self, area, buf),
            Screen::Question { meaning } => render_question(self, &meaning, area, buf),
            Screen::Summary { score, total } => render_summary(score, total, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn render_welcome(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = vec![
        Line::from(Span::styled("affix", bold().fg(Color::Magenta))),
        Line::from(Span::styled(
            "rebuild each word from its parts",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        Line::from(format!(
            "deck: {} ({} words)",
            app.deck_name,
            app.session.total()
        )),
    ];

    if !app.warnings.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{} row(s) skipped while loading:", app.warnings.len()),
            Style::default().fg(Color::Yellow),
        )));
        for warning in app.warnings.iter().take(5) {
            lines.push(Line::from(Span::styled(
                format!("  row {}: {}", warning.line, warning.reason),
                dim(),
            )));
        }
        if app.warnings.len() > 5 {
            lines.push(Line::from(Span::styled(
                format!("  ... and {} more", app.warnings.len() - 5),
                dim(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter: start quiz   Esc: quit",
        dim(),
    )));

    centered_paragraph(lines, area, buf);
}

fn render_question(app: &App, meaning: &str, area: Rect, buf: &mut Buffer) {
    let usable_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let meaning_lines = ((meaning.width() as f64 / usable_width as f64).ceil() as u16).max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints(
            [
                Constraint::Length(1),                 // status
                Constraint::Length(1),                 // padding
                Constraint::Length(meaning_lines),     // meaning prompt
                Constraint::Length(1),                 // selection preview
                Constraint::Length(1),                 // padding
                Constraint::Min(5),                    // pickers
                Constraint::Length(4),                 // feedback + keys
            ]
            .as_ref(),
        )
        .split(area);

    render_status(app, chunks[0], buf);

    let meaning_widget = Paragraph::new(Span::styled(meaning.to_string(), bold()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    meaning_widget.render(chunks[2], buf);

    render_selection(app, chunks[3], buf);
    render_pickers(app, chunks[5], buf);
    render_feedback(app, chunks[6], buf);
}

fn render_status(app: &App, area: Rect, buf: &mut Buffer) {
    let progress = app
        .session
        .progress()
        .map_or_else(String::new, |p| format!("word {} / {}", p, app.session.total()));
    let status = Paragraph::new(Line::from(vec![
        Span::styled(progress, dim()),
        Span::raw("   "),
        Span::styled(format!("score {}", app.session.score()), dim()),
    ]))
    .alignment(Alignment::Center);
    status.render(area, buf);
}

fn render_selection(app: &App, area: Rect, buf: &mut Buffer) {
    let (prefix, root, suffix) = app.picker.selection();
    let line = Line::from(vec![
        Span::styled(format!("{prefix} + {root} + {suffix}"), dim()),
        Span::raw("  →  "),
        Span::styled(app.picker.built_preview(), bold().fg(Color::Cyan)),
    ]);
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_pickers(app: &App, area: Rect, buf: &mut Buffer) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(33),
                Constraint::Percentage(34),
                Constraint::Percentage(33),
            ]
            .as_ref(),
        )
        .split(area);

    for (column, slot) in Column::ALL.into_iter().zip(columns.iter()) {
        render_picker_column(app, column, *slot, buf);
    }
}

fn render_picker_column(app: &App, column: Column, area: Rect, buf: &mut Buffer) {
    let active = app.picker.column == column;
    let title_style = if active {
        bold().fg(Color::Magenta)
    } else {
        dim()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(column.title(), title_style));
    let inner = block.inner(area);
    block.render(area, buf);

    let options = app.picker.options(column);
    let cursor = app.picker.cursor(column);
    let height = inner.height as usize;
    if height == 0 {
        return;
    }

    let start = visible_window_start(options.len(), cursor, height);
    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(idx, option)| {
            let style = if idx == cursor && active {
                bold().add_modifier(Modifier::REVERSED)
            } else if idx == cursor {
                bold()
            } else {
                Style::default()
            };
            Line::from(Span::styled(option.clone(), style))
        })
        .collect();

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inner, buf);
}

/// First visible option index: keeps the cursor centered where
/// possible, pinned at the edges otherwise.
fn visible_window_start(len: usize, cursor: usize, height: usize) -> usize {
    if len <= height {
        return 0;
    }
    cursor
        .saturating_sub(height / 2)
        .min(len - height)
}

fn render_feedback(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines = Vec::new();

    match &app.feedback {
        Some(Feedback::Correct { word, story }) => {
            lines.push(Line::from(Span::styled(
                format!("✓ {word}"),
                bold().fg(Color::Green),
            )));
            if !story.is_empty() {
                lines.push(Line::from(Span::styled(story.clone(), dim())));
            }
        }
        Some(Feedback::Incorrect {
            story,
            expected_prefix,
            expected_root,
            expected_suffix,
        }) => {
            lines.push(Line::from(Span::styled(
                "✗ not quite, try again",
                bold().fg(Color::Red),
            )));
            lines.push(Line::from(Span::styled(
                format!("hint: {expected_prefix} + {expected_root} + {expected_suffix}"),
                Style::default().fg(Color::Yellow),
            )));
            if !story.is_empty() {
                lines.push(Line::from(Span::styled(story.clone(), dim())));
            }
        }
        None => {}
    }

    let keys = if app.session.attempt_locked() {
        "Enter: next word   Esc: quit"
    } else {
        "←/→: column   ↑/↓: pick   Enter: build   Esc: quit"
    };
    lines.push(Line::from(Span::styled(keys, dim())));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_summary(score: usize, total: usize, area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled("quiz complete", bold().fg(Color::Magenta))),
        Line::from(""),
        Line::from(Span::styled(
            format!("final score: {score} / {total}"),
            bold().fg(if score == total {
                Color::Green
            } else {
                Color::Cyan
            }),
        )),
        Line::from(""),
        Line::from(Span::styled("r: play again   Esc: quit", dim())),
    ];
    centered_paragraph(lines, area, buf);
}

/// Vertically center a short block of lines within `area`.
fn centered_paragraph(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let content_height = lines.len() as u16;
    let top_pad = area.height.saturating_sub(content_height) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top_pad), Constraint::Min(content_height)].as_ref())
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::load;
    use crate::speech::SilentPronouncer;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn test_app() -> App {
        let text = "Word,Meaning,Prefix,Root,Suffix,Story\n\
                    unhappy,not happy,un,happy,,un- negates\n\
                    player,one who plays,,play,er,-er marks the doer";
        App::new(
            load(text).unwrap(),
            "test deck".to_string(),
            Box::new(SilentPronouncer),
        )
    }

    fn render_to_text(app: &App, width: u16, height: u16) -> String {
        use ratatui::{backend::TestBackend, Terminal};

        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| f.render_widget(app, f.area())).unwrap();

        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn welcome_screen_names_the_deck() {
        let app = test_app();
        let text = render_to_text(&app, 60, 20);

        assert!(text.contains("affix"));
        assert!(text.contains("test deck"));
        assert!(text.contains("2 words"));
    }

    #[test]
    fn question_screen_shows_meaning_and_columns() {
        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let text = render_to_text(&app, 72, 24);
        assert!(text.contains("PREFIX"));
        assert!(text.contains("ROOT"));
        assert!(text.contains("SUFFIX"));
        assert!(text.contains("word 1 / 2"));
        assert!(text.contains("score 0"));
    }

    #[test]
    fn incorrect_feedback_shows_hint_line() {
        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        // Whatever the shuffled first word is, an impossible pick
        // ("unplayer"/"unhappyer"-shaped) stays wrong.
        app.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        let text = render_to_text(&app, 72, 24);
        assert!(text.contains("hint:"), "feedback should include the hint line\n{text}");
    }

    #[test]
    fn summary_screen_shows_final_score() {
        let mut app = test_app();
        app.screen = Screen::Summary { score: 1, total: 2 };

        let text = render_to_text(&app, 60, 12);
        assert!(text.contains("quiz complete"));
        assert!(text.contains("1 / 2"));
    }

    #[test]
    fn window_start_keeps_cursor_visible() {
        assert_eq!(visible_window_start(3, 2, 10), 0);
        assert_eq!(visible_window_start(20, 0, 5), 0);
        assert_eq!(visible_window_start(20, 10, 5), 8);
        assert_eq!(visible_window_start(20, 19, 5), 15);
    }
}

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Widget, Wrap},
};

use watr::runner::Phase;

use crate::{App, Screen};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen() {
            Screen::Welcome => render_welcome(self, area, buf),
            Screen::Word => render_word(self, area, buf),
            Screen::Complete => render_complete(self, area, buf),
            Screen::NoWords => render_no_words(self, area, buf),
        }

        if let Some(status) = &self.status {
            render_status(status, area, buf);
        }
    }
}

/// Renders `lines` vertically centered in `area`.
fn render_centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let body = lines.len() as u16;
    let top = area.height.saturating_sub(body) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(top),
            Constraint::Length(body),
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn render_welcome(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let heading = Style::default().fg(Color::Blue);

    let duration = app.runner.word_duration().as_secs();
    let session_len = app.runner.queue().len();
    let (shown, total) = (app.store.count_shown(), app.store.count_total());

    let lines = vec![
        Line::styled("Word Association Test", bold.fg(Color::Green)),
        Line::default(),
        Line::from(format!(
            "You will see {session_len} words, each displayed for {duration} seconds."
        )),
        Line::from("Write one sentence on each word."),
        Line::default(),
        Line::styled("CONTROLS", heading),
        Line::from("ENTER  start the session"),
        Line::from("SPACE  pause / resume"),
        Line::from("ESC    quit"),
        Line::default(),
        Line::styled("Press ENTER to start", bold.fg(Color::Green)),
        Line::default(),
        Line::styled(
            format!("Progress: {shown}/{total} words completed"),
            dim,
        ),
    ];

    render_centered(lines, area, buf);
}

fn render_word(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let remaining = app.runner.remaining_secs(app.now);
    let timer_style = if remaining <= 3 {
        bold.fg(Color::Red)
    } else {
        bold.fg(Color::Green)
    };
    let (index, total) = app.runner.position();
    let word = app.runner.current_word().unwrap_or_default().to_string();

    let mut lines = vec![
        Line::styled(remaining.to_string(), timer_style),
        Line::default(),
        Line::default(),
        Line::styled(word, bold),
        Line::default(),
        Line::default(),
        Line::styled(format!("{index} / {total}"), Style::default().fg(Color::Blue)),
    ];

    if app.runner.phase() == Phase::Paused {
        lines.push(Line::default());
        lines.push(Line::styled("PAUSED", bold.fg(Color::Green)));
        lines.push(Line::styled("Press SPACE to resume", dim));
    }

    render_centered(lines, area, buf);
}

fn render_complete(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let completed = app.runner.last_completed().unwrap_or(0);
    let (shown, total) = (app.store.count_shown(), app.store.count_total());

    let mut lines = vec![
        Line::styled("Session Complete!", bold.fg(Color::Green)),
        Line::default(),
        Line::from(format!("You completed {completed} words")),
        Line::default(),
    ];

    // A fresh cycle means completion exhausted the whole set and the planner
    // reset every flag.
    if shown == 0 && total > 0 {
        lines.push(Line::styled("All words completed!", bold.fg(Color::Green)));
        lines.push(Line::from("Press ENTER to restart from the beginning"));
    } else {
        lines.push(Line::styled(
            format!("{} words remaining", total - shown),
            Style::default().fg(Color::Blue),
        ));
        lines.push(Line::from("Press ENTER for the next session"));
    }

    lines.push(Line::default());
    lines.push(Line::styled("Press ESC to quit", dim));

    render_centered(lines, area, buf);
}

fn render_no_words(app: &App, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);

    let lines = vec![
        Line::styled("No words available", bold.fg(Color::Red)),
        Line::default(),
        Line::from(format!(
            "The word table at {} has no usable rows.",
            app.store.path().display()
        )),
        Line::default(),
        Line::styled("Press ESC to quit", dim),
    ];

    render_centered(lines, area, buf);
}

fn render_status(status: &str, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let bottom = Rect {
        x: area.x,
        y: area.y + area.height - 1,
        width: area.width,
        height: 1,
    };
    Paragraph::new(Line::styled(
        status.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(bottom, buf);
}

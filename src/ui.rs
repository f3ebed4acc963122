//! Ratatui rendering of the two-pane layout.

use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::app::{App, Focus};
use crate::models::{MovieDetail, MAX_USER_RATING};
use crate::watched::WatchedSummary;

const ACCENT: Color = Color::Rgb(250, 176, 5);
const MUTED: Color = Color::Rgb(134, 142, 150);
const ERROR: Color = Color::Rgb(250, 82, 82);

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // nav bar
            Constraint::Min(0),    // boxes
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    draw_nav(f, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_results_box(f, app, panes[0]);
    draw_side_box(f, app, panes[1]);

    f.render_widget(footer(app), chunks[2]);
}

fn boxed(title: &str, open: bool, focused: bool) -> Block<'_> {
    let toggle = if open { "–" } else { "+" };
    let border = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" [{toggle}] {title} "))
}

fn draw_nav(f: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16),
            Constraint::Min(10),
            Constraint::Length(22),
        ])
        .split(area);

    let logo = Paragraph::new(Line::from(vec![
        Span::raw("🍿 "),
        Span::styled("usePopcorn", Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(logo, cols[0]);

    let focused = app.focus() == Focus::Search;
    let input = if app.input().is_empty() {
        Line::from(Span::styled(
            "Search movies...",
            Style::default().fg(MUTED),
        ))
    } else {
        Line::from(app.input().to_string())
    };
    let border = if focused { ACCENT } else { MUTED };
    let search = Paragraph::new(input).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(search, cols[1]);
    if focused {
        let x = input_cursor_x(cols[1], app.input().chars().count());
        f.set_cursor_position((x, cols[1].y + 1));
    }

    let count = Paragraph::new(Line::from(vec![
        Span::raw("Found "),
        Span::styled(
            app.search.results().len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" results"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(count, cols[2]);
}

fn draw_results_box(f: &mut Frame, app: &App, area: Rect) {
    let block = boxed("Results", app.left_open(), app.focus() == Focus::Results);
    if !app.left_open() {
        f.render_widget(block, area);
        return;
    }

    if app.search.is_loading() {
        f.render_widget(loader().block(block), area);
        return;
    }
    if let Some(message) = app.search.error() {
        f.render_widget(error_message(message).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .search
        .results()
        .iter()
        .map(|movie| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    movie.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!("  🗓 {}", movie.year)),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(52, 58, 64)).fg(ACCENT));
    let mut state = ListState::default();
    if !app.search.results().is_empty() {
        state.select(Some(app.result_cursor()));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_side_box(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.detail.is_open() {
        "Details"
    } else {
        "Watched"
    };
    let block = boxed(title, app.right_open(), app.focus() == Focus::Side);
    if !app.right_open() {
        f.render_widget(block, area);
        return;
    }

    if app.detail.is_open() {
        let body = if app.detail.is_loading() {
            loader()
        } else if let Some(message) = app.detail.error() {
            error_message(message)
        } else if let Some(movie) = app.detail.detail() {
            Paragraph::new(detail_lines(app, movie)).wrap(Wrap { trim: true })
        } else {
            loader()
        };
        f.render_widget(body.block(block), area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    f.render_widget(
        Paragraph::new(summary_lines(&app.watched.summary())),
        rows[0],
    );

    let items: Vec<ListItem> = app
        .watched
        .entries()
        .iter()
        .map(|movie| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    movie.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(
                    "  ⭐️ {}  🌟 {}  ⏳ {} min",
                    movie
                        .external_rating
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "N/A".to_string()),
                    movie.user_rating,
                    movie.runtime_minutes.unwrap_or(0)
                )),
            ])
        })
        .collect();
    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::Rgb(52, 58, 64)).fg(ACCENT));
    let mut state = ListState::default();
    if app.focus() == Focus::Side && !app.watched.is_empty() {
        state.select(Some(app.watched_cursor()));
    }
    f.render_stateful_widget(list, rows[1], &mut state);
}

fn loader() -> Paragraph<'static> {
    Paragraph::new("Loading...").style(Style::default().fg(MUTED))
}

fn error_message(message: &str) -> Paragraph<'static> {
    Paragraph::new(format!("🛑 {message}"))
        .style(Style::default().fg(ERROR))
        .wrap(Wrap { trim: true })
}

pub fn summary_lines(summary: &WatchedSummary) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "Movies you watched",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "#️⃣ {} movies  ⭐️ {:.2}  🌟 {:.2}  ⏳ {} min",
            summary.count,
            summary.avg_external_rating,
            summary.avg_user_rating,
            summary.avg_runtime
        )),
    ]
}

/// `★★★☆☆☆☆☆☆☆ 3` style rating control.
pub fn star_line(rating: u8) -> String {
    let filled = rating.min(MAX_USER_RATING) as usize;
    let empty = MAX_USER_RATING as usize - filled;
    let label = if rating == 0 {
        String::new()
    } else {
        format!(" {rating}")
    };
    format!("{}{}{}", "★".repeat(filled), "☆".repeat(empty), label)
}

fn detail_lines(app: &App, movie: &MovieDetail) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let rating = movie
        .external_rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let mut lines = vec![
        Line::from(Span::styled(movie.title.clone(), bold)),
        Line::from(format!("{} • {}", movie.release_date, movie.runtime_label)),
        Line::from(movie.genre.clone()),
        Line::from(format!("⭐ {rating} IMDb rating")),
        Line::from(""),
    ];

    match app.watched.user_rating_for(&movie.id) {
        Some(rated) => lines.push(Line::from(format!("You rated the movie {rated} ⭐"))),
        None => {
            lines.push(Line::from(Span::styled(
                star_line(app.detail.draft_rating()),
                Style::default().fg(ACCENT),
            )));
            if app.can_add() {
                lines.push(Line::from(Span::styled("[a] + Add to list", bold)));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        movie.plot.clone(),
        Style::default().add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(format!("Starring {}", movie.actors)));
    lines.push(Line::from(format!("Directed by {}", movie.director)));
    lines
}

fn footer(app: &App) -> Paragraph<'static> {
    if let Some(status) = app.status() {
        return Paragraph::new(status.to_string()).style(Style::default().fg(ACCENT));
    }
    let hints = match (app.focus(), app.detail.is_open()) {
        (Focus::Search, _) => "type to search | Tab focus | Enter results | Esc quit",
        (Focus::Results, _) => "↑/↓ move | Enter open/close | Tab focus | F2/F3 fold | Esc quit",
        (Focus::Side, true) => "←/→ or 1-9,0 rate | a add | Esc back",
        (Focus::Side, false) => "↑/↓ move | d delete | Tab focus | Esc quit",
    };
    Paragraph::new(hints).style(Style::default().fg(MUTED))
}

/// Column of the text cursor after `typed` characters, kept inside the box border.
fn input_cursor_x(area: Rect, typed: usize) -> u16 {
    let typed = u16::try_from(typed).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(typed);
    x.min(area.right().saturating_sub(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_line_fills_up_to_rating() {
        assert_eq!(star_line(0), "☆☆☆☆☆☆☆☆☆☆");
        assert_eq!(star_line(3), "★★★☆☆☆☆☆☆☆ 3");
        assert_eq!(star_line(10), "★★★★★★★★★★ 10");
    }

    #[test]
    fn summary_formats_averages_to_two_decimals() {
        let lines = summary_lines(&WatchedSummary {
            count: 3,
            avg_external_rating: 7.5,
            avg_user_rating: 8.0,
            avg_runtime: 120.0,
        });
        let text = lines[1].to_string();
        assert!(text.contains("3 movies"));
        assert!(text.contains("7.50"));
        assert!(text.contains("8.00"));
        assert!(text.contains("120 min"));
    }

    #[test]
    fn input_cursor_stays_inside_the_box() {
        let area = Rect::new(20, 0, 40, 3);
        assert_eq!(input_cursor_x(area, 0), 21);
        assert_eq!(input_cursor_x(area, 5), 26);
        assert_eq!(input_cursor_x(area, 500), 58);
        assert_eq!(input_cursor_x(area, usize::MAX), 58);
    }
}

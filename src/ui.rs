//! Terminal UI rendering.
//!
//! All drawing logic lives here; individual rows come from
//! [`JokeItem::render`](crate::joke_item::JokeItem::render).  The layout is a
//! two-row split: the joke list (or a loading indicator while a fetch is in
//! flight) on top and a one-line controls bar at the bottom.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::joke_item::JokeItem;

const HIGHLIGHT_SYMBOL: &str = "▸ ";
const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Draw the complete UI for one frame.
///
/// `tick` advances the loading spinner.
pub fn draw(app: &mut App, frame: &mut Frame, tick: usize) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    if app.is_loading() {
        draw_loading(frame, main_area, tick);
    } else {
        draw_joke_list(app, frame, main_area);
    }
    draw_status_bar(app, frame, status_area);
}

fn draw_loading(frame: &mut Frame, area: Rect, tick: usize) {
    let spinner = SPINNER[tick % SPINNER.len()];
    let block = Block::default().title(" Jokes ").borders(Borders::ALL);
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(block.inner(area));

    let loading = Paragraph::new(Line::from(vec![
        Span::styled(spinner, Style::default().fg(Color::Cyan)),
        Span::raw(" Loading jokes…"),
    ]))
    .alignment(Alignment::Center);

    frame.render_widget(block, area);
    frame.render_widget(loading, middle);
}

/// Render the jokes, highest votes first.
fn draw_joke_list(app: &mut App, frame: &mut Frame, area: Rect) {
    // Inside the borders, less the highlight symbol.
    let row_width = area.width.saturating_sub(2 + HIGHLIGHT_SYMBOL.chars().count() as u16);
    let list_items: Vec<ListItem> = app
        .display_jokes()
        .iter()
        .map(|j| JokeItem::new(j).render(row_width))
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(" Jokes ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let lock_hint = app
        .selected_joke()
        .map(|j| JokeItem::new(&j).lock_label().to_lowercase())
        .unwrap_or_else(|| "lock".into());

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} jokes", app.jokes().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(format!(
            "  n: new jokes  r: reset  +/-: vote  l: {lock_hint}  q: quit"
        )),
    ]));
    frame.render_widget(status, area);
}

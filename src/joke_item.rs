//! A single joke row.
//!
//! [`JokeItem`] is a view over one joke: it renders the vote tally, the text
//! and the lock state, and turns the user's vote/lock controls into calls on
//! a [`JokeIntents`] it is handed.  It owns no state and never mutates a joke
//! itself.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::ListItem,
};
use textwrap::{wrap, Options as WrapOptions};

use crate::source::{Joke, JokeId};

const TEXT_INDENT: &str = "        ";

/// What a joke row may ask of whoever owns the jokes.
pub trait JokeIntents {
    fn request_vote(&mut self, id: &JokeId, delta: i64);
    fn request_lock_toggle(&mut self, id: &JokeId);
}

#[derive(Debug, Clone, Copy)]
pub struct JokeItem<'a> {
    pub id: &'a JokeId,
    pub votes: i64,
    pub text: &'a str,
    pub is_locked: bool,
}

impl<'a> JokeItem<'a> {
    pub fn new(joke: &'a Joke) -> Self {
        Self {
            id: &joke.id,
            votes: joke.votes,
            text: &joke.text,
            is_locked: joke.is_locked,
        }
    }

    pub fn upvote(&self, intents: &mut dyn JokeIntents) {
        intents.request_vote(self.id, 1);
    }

    pub fn downvote(&self, intents: &mut dyn JokeIntents) {
        intents.request_vote(self.id, -1);
    }

    pub fn toggle_lock(&self, intents: &mut dyn JokeIntents) {
        intents.request_lock_toggle(self.id);
    }

    /// Label of the lock control, naming what pressing it will do.
    pub fn lock_label(&self) -> &'static str {
        if self.is_locked {
            "Unlock"
        } else {
            "Lock"
        }
    }

    /// Render the row for a list `width` columns wide.
    ///
    /// The first line holds the fixed-width pieces (lock marker, tally, lock
    /// control) so they never scroll off; the joke text follows, wrapped and
    /// indented, with embedded line breaks kept.
    pub fn render(&self, width: u16) -> ListItem<'static> {
        let tally_color = match self.votes {
            v if v > 0 => Color::Green,
            v if v < 0 => Color::Red,
            _ => Color::DarkGray,
        };

        let text_style = if self.is_locked {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let header = Line::from(vec![
            Span::styled(if self.is_locked { "* " } else { "  " }, text_style),
            Span::styled(format!("{:>4}", self.votes), Style::default().fg(tally_color)),
            Span::raw("  "),
            Span::styled(
                format!("[{}]", self.lock_label()),
                Style::default().fg(Color::Cyan),
            ),
        ]);

        let mut lines = vec![header];
        lines.extend(wrap_text(self.text, width, text_style));
        ListItem::new(Text::from(lines))
    }
}

fn wrap_text(text: &str, width: u16, style: Style) -> Vec<Line<'static>> {
    let wrap_width = usize::from(width).max(TEXT_INDENT.len() + 1);
    let options = WrapOptions::new(wrap_width)
        .break_words(true)
        .initial_indent(TEXT_INDENT)
        .subsequent_indent(TEXT_INDENT);

    // `lines` also strips the `\r` of `\r\n` breaks the API sometimes sends.
    text.lines()
        .flat_map(|paragraph| {
            if paragraph.trim().is_empty() {
                vec![Line::default()]
            } else {
                wrap(paragraph, &options)
                    .into_iter()
                    .map(|cow| Line::from(Span::styled(cow.into_owned(), style)))
                    .collect()
            }
        })
        .collect()
}

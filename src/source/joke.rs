//! The joke records shared by the source, the controller and storage.
//!
//! [`RemoteJoke`] is what one API call yields.  [`Joke`] is the entry kept in
//! the list, carrying the user's vote tally and lock flag on top of the text.
//!
//! The serialized form of [`Joke`] keeps the API's field names (`id`, `joke`)
//! so stored lists stay readable next to raw API responses.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque identifier assigned by the joke API.
///
/// The API hands out strings, but a number is accepted as well and stored as
/// its decimal text, so both shapes de-duplicate against each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JokeId(String);

impl JokeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JokeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => JokeId(s),
            Raw::Number(n) => JokeId(n.to_string()),
        })
    }
}

/// One joke as returned by a single API call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteJoke {
    pub id: JokeId,
    pub joke: String,
}

/// A joke held in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joke {
    pub id: JokeId,

    /// Display text.
    #[serde(rename = "joke")]
    pub text: String,

    /// Net votes; no floor or ceiling beyond the integer range.
    pub votes: i64,

    /// Locked jokes survive the next fetch cycle.
    #[serde(rename = "isLocked")]
    pub is_locked: bool,
}

impl From<RemoteJoke> for Joke {
    fn from(remote: RemoteJoke) -> Self {
        Self {
            id: remote.id,
            text: remote.joke,
            votes: 0,
            is_locked: false,
        }
    }
}

/// Display order: a copy sorted by descending votes.
///
/// The sort is stable, so jokes with equal votes keep their relative order.
pub fn sorted_by_votes(jokes: &[Joke]) -> Vec<Joke> {
    let mut sorted = jokes.to_vec();
    sorted.sort_by(|a, b| b.votes.cmp(&a.votes));
    sorted
}

//! Joke source abstraction layer.
//!
//! This module defines the [`JokeSource`] trait and the joke records.  The
//! only concrete source is [`IcanhazSource`]; tests drive the fetch cycle with
//! scripted sources instead.

mod icanhaz;
mod joke;

pub use icanhaz::IcanhazSource;
pub use joke::{sorted_by_votes, Joke, JokeId, RemoteJoke};

use crate::error::FetchError;

/// Anything that yields one joke per call.
///
/// A fetch cycle calls [`fetch_one`](JokeSource::fetch_one) repeatedly on a
/// background thread, so implementations must be [`Send`] and [`Sync`].
pub trait JokeSource: Send + Sync {
    /// Label used in log lines.
    fn name(&self) -> &str;

    /// Fetch a single joke.
    fn fetch_one(&self) -> Result<RemoteJoke, FetchError>;
}

//! The fetch cycle.
//!
//! A cycle asks the [`JokeSource`] for one joke at a time until it holds
//! `target` jokes whose ids were not already known, then hands them back in
//! call order.  Duplicates are dropped and do not count toward the target.
//! Any failure abandons the whole cycle: nothing collected so far is kept.
//!
//! [`spawn`] runs one cycle on a background thread and reports the outcome
//! to the UI thread over an [`mpsc`] channel, so the interface keeps drawing
//! while requests are in flight.

use std::collections::HashSet;
use std::sync::{mpsc, Arc};
use std::thread;

use crate::error::FetchError;
use crate::source::{Joke, JokeId, JokeSource};

/// Message sent from the fetch thread to the UI thread.
#[derive(Debug)]
pub enum FetchMsg {
    /// The cycle completed with these new jokes, in fetch order.
    Done(Vec<Joke>),
    /// The cycle was abandoned.
    Failed(String),
}

/// Collect `target` jokes whose ids are not in `seen`.
///
/// `seen` is extended with every accepted id.  There is no retry limit: a
/// source that only ever returns known jokes keeps the loop going.
pub fn collect_unique(
    source: &dyn JokeSource,
    mut seen: HashSet<JokeId>,
    target: usize,
) -> Result<Vec<Joke>, FetchError> {
    let mut new_jokes = Vec::with_capacity(target);
    let mut calls = 0usize;

    while new_jokes.len() < target {
        let remote = source.fetch_one()?;
        calls += 1;

        if seen.insert(remote.id.clone()) {
            new_jokes.push(Joke::from(remote));
        } else {
            tracing::debug!(id = %remote.id, "Skipping duplicate joke");
        }
    }

    tracing::debug!(source = source.name(), calls, collected = new_jokes.len(), "Fetch cycle complete");
    Ok(new_jokes)
}

/// Spawn one fetch cycle on a background thread.
///
/// The thread sends exactly one [`FetchMsg`] and exits.  If the receiver has
/// been dropped by then the result is discarded.
pub fn spawn(
    source: Arc<dyn JokeSource>,
    seen: HashSet<JokeId>,
    target: usize,
) -> mpsc::Receiver<FetchMsg> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let msg = match collect_unique(source.as_ref(), seen, target) {
            Ok(jokes) => FetchMsg::Done(jokes),
            Err(e) => FetchMsg::Failed(format!("{}: {e}", source.name())),
        };
        let _ = tx.send(msg);
    });

    rx
}

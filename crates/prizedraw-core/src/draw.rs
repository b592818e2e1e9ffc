// Winner selection without replacement.
//
// The engine is stateless: callers own the pool and the exclusion set and
// fold each selection back into the set themselves.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::record::Record;
use crate::rng::DrawRng;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("not enough eligible entries: requested {requested}, {available} available")]
    InsufficientCandidates { requested: usize, available: usize },

    #[error("winner count must be at least 1")]
    ZeroWinners,
}

// ---------------------------------------------------------------------------
// Exclusion identity
// ---------------------------------------------------------------------------

/// How a pool entry is identified for exclusion purposes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExclusionScheme {
    /// No identity: every draw sees the whole pool.
    None,
    /// Identity is the entry's position in the pool.
    #[default]
    Row,
    /// Identity is the raw (trimmed, uncoerced) text of a column, e.g.
    /// `email`. `007` and `7` are different entries.
    Column { name: String, case_insensitive: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EntryKey {
    Row(usize),
    Value(String),
}

/// Keys of entries that may not be drawn again in this session.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    scheme: ExclusionScheme,
    keys: HashSet<EntryKey>,
}

impl ExclusionSet {
    pub fn new(scheme: ExclusionScheme) -> Self {
        ExclusionSet {
            scheme,
            keys: HashSet::new(),
        }
    }

    pub fn scheme(&self) -> &ExclusionScheme {
        &self.scheme
    }

    /// Identity of the pool entry at `index`. `None` when the scheme does not
    /// identify entries, or the keyed column is absent from the record.
    pub fn key_for(&self, index: usize, record: &Record) -> Option<EntryKey> {
        match &self.scheme {
            ExclusionScheme::None => None,
            ExclusionScheme::Row => Some(EntryKey::Row(index)),
            ExclusionScheme::Column {
                name,
                case_insensitive,
            } => record.get_raw(name).map(|text| {
                if *case_insensitive {
                    EntryKey::Value(text.to_ascii_lowercase())
                } else {
                    EntryKey::Value(text.to_string())
                }
            }),
        }
    }

    pub fn is_excluded(&self, index: usize, record: &Record) -> bool {
        self.key_for(index, record)
            .is_some_and(|key| self.keys.contains(&key))
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: EntryKey) -> bool {
        self.keys.insert(key)
    }

    /// Union every keyed winner of `selection` into the set.
    pub fn extend_from(&mut self, selection: &WinnerSelection) {
        self.keys
            .extend(selection.winners().iter().filter_map(|w| w.key.clone()));
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Winner {
    pub pool_index: usize,
    pub key: Option<EntryKey>,
    pub record: Record,
}

/// Ordered winners of one draw. The first entry is the grand prize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinnerSelection {
    winners: Vec<Winner>,
}

impl WinnerSelection {
    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }

    /// Never empty: `select` refuses zero winners.
    pub fn grand_prize(&self) -> &Winner {
        &self.winners[0]
    }

    pub fn runners_up(&self) -> &[Winner] {
        &self.winners[1..]
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.winners.iter().map(|w| &w.record)
    }

    pub fn pool_indices(&self) -> Vec<usize> {
        self.winners.iter().map(|w| w.pool_index).collect()
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }
}

/// Pool indices still eligible under `exclusions`, in pool order.
pub fn available(pool: &[Record], exclusions: &ExclusionSet) -> Vec<usize> {
    pool.iter()
        .enumerate()
        .filter(|(i, record)| !exclusions.is_excluded(*i, record))
        .map(|(i, _)| i)
        .collect()
}

/// Draw `n` distinct winners uniformly at random from the eligible pool.
///
/// Fails rather than returning a short list when fewer than `n` entries are
/// eligible.
pub fn select(
    pool: &[Record],
    exclusions: &ExclusionSet,
    n: usize,
    rng: &mut DrawRng,
) -> Result<WinnerSelection, DrawError> {
    if n == 0 {
        return Err(DrawError::ZeroWinners);
    }

    let mut eligible = available(pool, exclusions);
    if eligible.len() < n {
        return Err(DrawError::InsufficientCandidates {
            requested: n,
            available: eligible.len(),
        });
    }

    let eligible_count = eligible.len();
    let picked = rng.partial_shuffle(&mut eligible, n);
    let winners = picked
        .iter()
        .map(|&i| Winner {
            pool_index: i,
            key: exclusions.key_for(i, &pool[i]),
            record: pool[i].clone(),
        })
        .collect();

    debug!("selected {} of {} eligible entries", n, eligible_count);
    Ok(WinnerSelection { winners })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Draw session: the caller-side state around the stateless draw engine.
//
// Owns the candidate pool from the latest upload, the exclusion set that
// grows with every draw, the current winner selection and a history of
// rounds. A new upload resets all of it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use prizedraw_core::draw::{self, DrawError, ExclusionScheme, ExclusionSet, WinnerSelection};
use prizedraw_core::loader::{self, LoadError, Roster};
use prizedraw_core::{DrawRng, Record};

use crate::config::Config;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no roster loaded; upload a CSV file first")]
    NoRoster,

    #[error("could not read roster: {0}")]
    Load(#[from] LoadError),

    #[error("exclusion column `{column}` is not present in the header")]
    UnknownExclusionColumn { column: String },

    #[error(transparent)]
    Draw(#[from] DrawError),
}

impl SessionError {
    /// True when the only way forward is a fresh upload (as opposed to a
    /// blocking error on the file just given).
    pub fn needs_new_upload(&self) -> bool {
        matches!(
            self,
            SessionError::NoRoster | SessionError::Draw(DrawError::InsufficientCandidates { .. })
        )
    }

    /// Warnings leave the session exactly as it was; the rest block the
    /// action the user just took.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SessionError::Draw(DrawError::InsufficientCandidates { .. })
        )
    }
}

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// The roster currently in play.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub roster: Roster,
    pub uploaded_at: DateTime<Utc>,
}

/// What an upload produced, for the UI to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub file_name: String,
    pub columns: Vec<String>,
    pub entries: usize,
    pub skipped_rows: usize,
    pub duplicates_dropped: usize,
}

/// One completed draw.
#[derive(Debug, Clone, Serialize)]
pub struct DrawRound {
    /// 1-based within the current upload.
    pub round: usize,
    pub drawn_at: DateTime<Utc>,
    pub pool_indices: Vec<usize>,
}

// ---------------------------------------------------------------------------
// DrawSession
// ---------------------------------------------------------------------------

pub struct DrawSession {
    config: Config,
    rng: DrawRng,
    upload: Option<Upload>,
    exclusions: ExclusionSet,
    current: Option<WinnerSelection>,
    history: Vec<DrawRound>,
}

impl DrawSession {
    /// Seeded from `config.draw.seed` when set, else from entropy.
    pub fn new(config: Config) -> Self {
        let rng = match config.draw.seed {
            Some(seed) => DrawRng::from_seed(seed),
            None => DrawRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: Config, rng: DrawRng) -> Self {
        let exclusions = ExclusionSet::new(config.exclusion_scheme());
        DrawSession {
            config,
            rng,
            upload: None,
            exclusions,
            current: None,
            history: Vec::new(),
        }
    }

    /// Parse `text` and make it the candidate pool.
    ///
    /// On success the exclusions, current selection and history are cleared.
    /// On failure the previous upload stays in place.
    pub fn upload(&mut self, file_name: &str, text: &str) -> Result<UploadSummary, SessionError> {
        let roster = loader::parse_with(text, &self.config.loader_options()).map_err(|e| {
            warn!("rejected upload '{}': {}", file_name, e);
            e
        })?;

        if let ExclusionScheme::Column { name, .. } = self.exclusions.scheme() {
            if !roster.columns.contains(name) {
                warn!(
                    "rejected upload '{}': exclusion column '{}' not in header",
                    file_name, name
                );
                return Err(SessionError::UnknownExclusionColumn {
                    column: name.clone(),
                });
            }
        }

        let summary = UploadSummary {
            file_name: file_name.to_string(),
            columns: roster.columns.names().to_vec(),
            entries: roster.len(),
            skipped_rows: roster.skipped_rows.len(),
            duplicates_dropped: roster.duplicates_dropped.len(),
        };
        info!(
            "loaded '{}': {} entries ({} rows skipped, {} duplicates dropped)",
            file_name, summary.entries, summary.skipped_rows, summary.duplicates_dropped
        );

        self.upload = Some(Upload {
            file_name: file_name.to_string(),
            roster,
            uploaded_at: Utc::now(),
        });
        self.exclusions.clear();
        self.current = None;
        self.history.clear();

        Ok(summary)
    }

    /// Draw `draw.winners` entries not yet excluded, then exclude them.
    ///
    /// The first draw after an upload and every "draw again" go through
    /// here. A refused draw leaves the session unchanged.
    pub fn draw(&mut self) -> Result<&WinnerSelection, SessionError> {
        let upload = self.upload.as_ref().ok_or(SessionError::NoRoster)?;
        let n = self.config.draw.winners;

        let selection = draw::select(&upload.roster.records, &self.exclusions, n, &mut self.rng)
            .map_err(|e| {
                warn!("draw refused for '{}': {}", upload.file_name, e);
                e
            })?;

        self.exclusions.extend_from(&selection);
        let round = self.history.len() + 1;
        self.history.push(DrawRound {
            round,
            drawn_at: Utc::now(),
            pool_indices: selection.pool_indices(),
        });
        info!(
            "round {} drew {} winner(s); {} excluded, {} still eligible",
            round,
            selection.len(),
            self.exclusions.len(),
            draw::available(&upload.roster.records, &self.exclusions).len()
        );

        Ok(&*self.current.insert(selection))
    }

    /// Entries still eligible for the next draw.
    pub fn remaining(&self) -> usize {
        self.upload
            .as_ref()
            .map(|u| draw::available(&u.roster.records, &self.exclusions).len())
            .unwrap_or(0)
    }

    /// Whether another draw of the configured size would succeed.
    pub fn can_draw(&self) -> bool {
        self.upload.is_some() && self.remaining() >= self.config.draw.winners
    }

    pub fn current(&self) -> Option<&WinnerSelection> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[DrawRound] {
        &self.history
    }

    pub fn upload_info(&self) -> Option<&Upload> {
        self.upload.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.upload.as_ref().map(|u| u.file_name.as_str())
    }

    pub fn pool(&self) -> &[Record] {
        self.upload
            .as_ref()
            .map(|u| u.roster.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExclusionMode, RowPolicySetting};
    use std::collections::HashSet;

    const SIX: &str = "\
Order,First_Name,Last_Name
1,Ada,Lovelace
2,Grace,Hopper
3,Alan,Turing
4,Edsger,Dijkstra
5,Barbara,Liskov
6,Donald,Knuth
";

    fn seeded(config: Config) -> DrawSession {
        DrawSession::with_rng(config, DrawRng::from_seed(1234))
    }

    #[test]
    fn draw_without_upload_is_no_roster() {
        let mut session = seeded(Config::default());
        let err = session.draw().unwrap_err();
        assert!(matches!(err, SessionError::NoRoster));
        assert!(err.needs_new_upload());
        assert!(!session.can_draw());
    }

    #[test]
    fn upload_reports_counts() {
        let mut session = seeded(Config::default());
        let summary = session
            .upload("friends.csv", "Order,First_Name,Last_Name\n1,Ada,Lovelace\n2,Grace\n")
            .unwrap();
        assert_eq!(
            summary,
            UploadSummary {
                file_name: "friends.csv".into(),
                columns: vec!["Order".into(), "First_Name".into(), "Last_Name".into()],
                entries: 1,
                skipped_rows: 1,
                duplicates_dropped: 0,
            }
        );
        assert_eq!(session.file_name(), Some("friends.csv"));
    }

    #[test]
    fn second_draw_excludes_first_winners() {
        let mut config = Config::default();
        config.draw.winners = 3;
        let mut session = seeded(config);
        session.upload("six.csv", SIX).unwrap();

        let first: HashSet<usize> = session.draw().unwrap().pool_indices().into_iter().collect();
        assert_eq!(session.remaining(), 3);
        let second: HashSet<usize> = session.draw().unwrap().pool_indices().into_iter().collect();

        assert!(first.is_disjoint(&second));
        assert_eq!(session.remaining(), 0);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[1].round, 2);
    }

    #[test]
    fn insufficient_candidates_keeps_session_usable() {
        let mut session = seeded(Config::default());
        session.upload("six.csv", SIX).unwrap();
        let first = session.draw().unwrap().clone();

        let err = session.draw().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Draw(DrawError::InsufficientCandidates {
                requested: 5,
                available: 1
            })
        ));
        assert!(err.is_warning());
        assert!(err.needs_new_upload());

        // Unchanged: same current selection, one round, one entry left.
        assert_eq!(session.current(), Some(&first));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.remaining(), 1);
    }

    #[test]
    fn new_upload_resets_exclusions() {
        let mut session = seeded(Config::default());
        session.upload("six.csv", SIX).unwrap();
        session.draw().unwrap();
        assert_eq!(session.exclusions().len(), 5);

        session.upload("again.csv", SIX).unwrap();
        assert!(session.exclusions().is_empty());
        assert!(session.current().is_none());
        assert!(session.history().is_empty());
        assert!(session.can_draw());
    }

    #[test]
    fn failed_upload_keeps_previous_pool() {
        let mut session = seeded(Config::default());
        session.upload("six.csv", SIX).unwrap();
        session.draw().unwrap();

        let err = session.upload("empty.csv", "Order,First_Name\n").unwrap_err();
        assert!(matches!(err, SessionError::Load(LoadError::MalformedInput { .. })));
        assert!(!err.is_warning());
        assert_eq!(session.file_name(), Some("six.csv"));
        assert_eq!(session.pool().len(), 6);
        assert_eq!(session.exclusions().len(), 5);
    }

    #[test]
    fn exclusion_column_must_be_in_header() {
        let mut config = Config::default();
        config.draw.winners = 3;
        config.draw.exclusion = ExclusionMode::Column;
        config.draw.exclusion_column = Some("Email".into());
        let mut session = seeded(config);
        session
            .upload("good.csv", "Order,Email\n1,a@x.io\n2,b@x.io\n3,c@x.io\n")
            .unwrap();
        session.draw().unwrap();

        let err = session
            .upload(
                "lower.csv",
                "Order,email\n1,a@x.io\n2,b@x.io\n3,c@x.io\n4,d@x.io\n",
            )
            .unwrap_err();
        match &err {
            SessionError::UnknownExclusionColumn { column } => assert_eq!(column, "Email"),
            other => panic!("expected UnknownExclusionColumn, got: {other}"),
        }
        assert!(!err.is_warning());
        assert!(!err.needs_new_upload());

        // Previous pool, exclusions and selection survive.
        assert_eq!(session.file_name(), Some("good.csv"));
        assert_eq!(session.pool().len(), 3);
        assert_eq!(session.exclusions().len(), 3);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn strict_config_rejects_ragged_file() {
        let mut config = Config::default();
        config.roster.row_policy = RowPolicySetting::Strict;
        let mut session = seeded(config);
        let err = session.upload("bad.csv", "a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Load(LoadError::RowShapeMismatch { line: 3, .. })
        ));
    }

    #[test]
    fn no_exclusion_mode_redraws_whole_pool() {
        let mut config = Config::default();
        config.draw.exclusion = ExclusionMode::None;
        let mut session = seeded(config);
        session.upload("six.csv", SIX).unwrap();
        for _ in 0..4 {
            assert_eq!(session.draw().unwrap().len(), 5);
        }
        assert_eq!(session.remaining(), 6);
    }

    #[test]
    fn configured_seed_is_used() {
        let mut config = Config::default();
        config.draw.seed = Some(77);
        let session = DrawSession::new(config);
        assert_eq!(session.seed(), 77);
    }
}

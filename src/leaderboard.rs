//! Leaderboard aggregation
//!
//! The leaderboard is a pure projection of the stored submissions. It is
//! recomputed on every read and has no state of its own.
//!
//! Ordering: best score descending; on equal best scores the participant who
//! reached that score first ranks higher, then name ascending.

use crate::record::SubmissionRecord;
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How self-reported names are grouped into participants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamePolicy {
    /// Byte-exact names
    Exact,
    /// Surrounding whitespace removed, inner runs collapsed to one space
    #[default]
    Trimmed,
    /// As `Trimmed`, compared case-insensitively
    CaseInsensitive,
}

impl NamePolicy {
    fn normalize(name: &str) -> String {
        name.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Key two names must share to count as the same participant
    pub fn group_key(self, name: &str) -> String {
        match self {
            NamePolicy::Exact => name.to_string(),
            NamePolicy::Trimmed => Self::normalize(name),
            NamePolicy::CaseInsensitive => Self::normalize(name).to_lowercase(),
        }
    }

    /// Name shown for a group, taken from one of its submissions
    pub fn display_name(self, name: &str) -> String {
        match self {
            NamePolicy::Exact => name.to_string(),
            NamePolicy::Trimmed | NamePolicy::CaseInsensitive => Self::normalize(name),
        }
    }
}

/// One participant's standing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub name: String,
    pub best_score: f64,
    /// Number of submissions
    pub entries: usize,
    /// Most recent submission, not necessarily the best one
    pub latest_submitted_at: DateTime<FixedOffset>,
    /// Earliest submission that reached `best_score`
    pub best_submitted_at: DateTime<FixedOffset>,
}

/// Headline numbers for a leaderboard
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSummary {
    pub participants: usize,
    pub submissions: usize,
    pub best_score: Option<f64>,
    pub median_best_score: Option<f64>,
}

struct GroupStats {
    name: String,
    best_score: f64,
    best_submitted_at: DateTime<FixedOffset>,
    entries: usize,
    latest_submitted_at: DateTime<FixedOffset>,
}

/// Ranked view over all submissions
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    policy: NamePolicy,
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Group, aggregate and rank `records`
    pub fn compute(records: &[SubmissionRecord], policy: NamePolicy) -> Self {
        let mut groups: IndexMap<String, GroupStats> = IndexMap::new();

        for record in records {
            let at = record.submitted_at;
            let stats = groups
                .entry(policy.group_key(&record.name))
                .or_insert_with(|| GroupStats {
                    name: policy.display_name(&record.name),
                    best_score: record.score,
                    best_submitted_at: at,
                    entries: 0,
                    latest_submitted_at: at,
                });

            stats.entries += 1;

            if record.score > stats.best_score
                || (record.score == stats.best_score && at < stats.best_submitted_at)
            {
                stats.best_score = record.score;
                stats.best_submitted_at = at;
            }

            if at > stats.latest_submitted_at {
                stats.latest_submitted_at = at;
                stats.name = policy.display_name(&record.name);
            }
        }

        let mut entries: Vec<LeaderboardEntry> = groups
            .into_values()
            .map(|g| LeaderboardEntry {
                rank: 0,
                name: g.name,
                best_score: g.best_score,
                entries: g.entries,
                latest_submitted_at: g.latest_submitted_at,
                best_submitted_at: g.best_submitted_at,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.best_score
                .total_cmp(&a.best_score)
                .then_with(|| a.best_submitted_at.cmp(&b.best_submitted_at))
                .then_with(|| a.name.cmp(&b.name))
        });

        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }

        Self { policy, entries }
    }

    /// An empty board
    pub fn empty(policy: NamePolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Rank 1, if anyone has submitted
    pub fn top_scorer(&self) -> Option<&LeaderboardEntry> {
        self.entries.first()
    }

    /// Get top N entries
    pub fn top(&self, n: usize) -> &[LeaderboardEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Get entry for a participant, matched under the board's name policy
    pub fn get(&self, name: &str) -> Option<&LeaderboardEntry> {
        let key = self.policy.group_key(name);
        self.entries
            .iter()
            .find(|e| self.policy.group_key(&e.name) == key)
    }

    /// Get rank for a participant
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.get(name).map(|e| e.rank)
    }

    pub fn summary(&self) -> LeaderboardSummary {
        let mut best: Vec<f64> = self.entries.iter().map(|e| e.best_score).collect();
        best.sort_by(f64::total_cmp);
        let median_best_score = match best.len() {
            0 => None,
            n if n % 2 == 1 => Some(best[n / 2]),
            n => Some((best[n / 2 - 1] + best[n / 2]) / 2.0),
        };
        LeaderboardSummary {
            participants: self.entries.len(),
            submissions: self.entries.iter().map(|e| e.entries).sum(),
            best_score: best.last().copied(),
            median_best_score,
        }
    }
}

/// Compute the ranked leaderboard for `records`
pub fn compute_leaderboard(records: &[SubmissionRecord], policy: NamePolicy) -> Leaderboard {
    Leaderboard::compute(records, policy)
}

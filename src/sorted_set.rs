use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SortedSetEntry {
    pub member: String,
    pub score: f64,
}

/// Members kept unique and ordered by `(score, member)`.
///
/// `entries` holds the ordering, `scores` gives constant-time lookups by member.
#[derive(Debug, Clone, Default)]
pub struct SortedSet {
    entries: Vec<SortedSetEntry>,
    scores: HashMap<String, f64>,
}

fn compare(score: f64, member: &str, other_score: f64, other_member: &str) -> Ordering {
    score
        .total_cmp(&other_score)
        .then_with(|| member.cmp(other_member))
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `member` or moves it to its new score. Returns `true` if it was not present.
    pub fn insert(&mut self, member: String, score: f64) -> bool {
        let is_new = match self.scores.insert(member.clone(), score) {
            Some(previous_score) => {
                if let Some(position) = self.position(&member, previous_score) {
                    self.entries.remove(position);
                }
                false
            }
            None => true,
        };

        let position = self.entries.partition_point(|entry| {
            compare(entry.score, &entry.member, score, &member) == Ordering::Less
        });
        self.entries.insert(position, SortedSetEntry { member, score });

        is_new
    }

    pub fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                if let Some(position) = self.position(member, score) {
                    self.entries.remove(position);
                }
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &str) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Zero-based position of `member` in ascending order.
    pub fn rank(&self, member: &str) -> Option<usize> {
        let score = self.score(member)?;
        self.position(member, score)
    }

    pub fn entries(&self) -> &[SortedSetEntry] {
        &self.entries
    }

    fn position(&self, member: &str, score: f64) -> Option<usize> {
        self.entries
            .binary_search_by(|entry| compare(entry.score, &entry.member, score, member))
            .ok()
    }
}

//! Search keyword extraction and popularity ranking.
//!
//! Every submitted search is split into keywords; the keywords are counted
//! and the most frequent ones are offered as "popular searches". A searcher
//! repeating a keyword within [`DEFAULT_REPEAT_WINDOW`] counts once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Particles and conjunctions removed from inside each word, in removal order
pub const STOP_WORDS: [&str; 11] = [
    "이", "그", "저", "그리고", "또한", "하지만", "에게", "있는", "있고", "과", "와",
];

/// Shortest keyword kept after stop word removal, in characters
pub const MIN_KEYWORD_CHARS: usize = 2;

/// Default number of keywords shown as popular searches
pub const DEFAULT_TOP_KEYWORDS: usize = 5;

/// How long a searcher's keyword is remembered before it counts again
pub const DEFAULT_REPEAT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Split a search query into keywords.
///
/// Each whitespace-separated word has every stop word removed wherever it
/// occurs inside the word. Words shorter than [`MIN_KEYWORD_CHARS`]
/// afterwards are dropped.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter_map(|word| {
            let stripped = STOP_WORDS
                .iter()
                .fold(word.to_string(), |acc, stop| acc.replace(stop, ""));
            (stripped.chars().count() >= MIN_KEYWORD_CHARS).then_some(stripped)
        })
        .collect()
}

/// A keyword and how often it was searched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
}

/// Most searched first; ties broken by keyword so the ranking is stable
pub fn rank_keywords<I>(counts: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = (String, u64)>,
{
    let mut ranked: Vec<KeywordCount> = counts
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
    ranked.truncate(limit);
    ranked
}

/// Running keyword counts for a stream of search queries
#[derive(Debug, Clone)]
pub struct KeywordTally {
    counts: HashMap<String, u64>,
    window: Duration,
    /// When each (searcher, keyword) pair was last counted
    last_counted: HashMap<(String, String), Instant>,
}

impl Default for KeywordTally {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            window: DEFAULT_REPEAT_WINDOW,
            last_counted: HashMap::new(),
        }
    }
}

impl KeywordTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Count the keywords of one anonymous query; returns the extracted
    /// keywords. Nothing is deduplicated.
    pub fn record(&mut self, query: &str) -> Vec<String> {
        let keywords = extract_keywords(query);
        for keyword in &keywords {
            self.bump(keyword);
        }
        keywords
    }

    /// Count the keywords of a query from `searcher` (a user id, or an
    /// address for guests).
    ///
    /// A keyword this searcher already had counted less than the window
    /// ago is skipped, and skipping does not extend the window. Returns the
    /// keywords that were counted.
    pub fn record_from(&mut self, searcher: &str, query: &str, now: Instant) -> Vec<String> {
        let window = self.window;
        self.last_counted
            .retain(|_, counted_at| now.saturating_duration_since(*counted_at) < window);

        let (fresh, repeated): (Vec<String>, Vec<String>) = extract_keywords(query)
            .into_iter()
            .partition(|keyword| {
                !self
                    .last_counted
                    .contains_key(&(searcher.to_string(), keyword.clone()))
            });
        if !repeated.is_empty() {
            debug!(searcher, ?repeated, "Skipping keywords searched within the window");
        }

        for keyword in &fresh {
            self.bump(keyword);
            self.last_counted
                .insert((searcher.to_string(), keyword.clone()), now);
        }
        fresh
    }

    fn bump(&mut self, keyword: &str) {
        *self.counts.entry(keyword.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, keyword: &str) -> u64 {
        self.counts.get(keyword).copied().unwrap_or(0)
    }

    pub fn top(&self, limit: usize) -> Vec<KeywordCount> {
        rank_keywords(
            self.counts.iter().map(|(k, &c)| (k.clone(), c)),
            limit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_removed_inside_words() {
        assert_eq!(extract_keywords("몬스테라와 화분"), vec!["몬스테라", "화분"]);
        // "그리고" loses its "그" first, leaving "리고"
        assert_eq!(extract_keywords("그리고"), vec!["리고"]);
        assert!(extract_keywords("이 저 과").is_empty());
    }

    #[test]
    fn test_short_words_dropped() {
        assert_eq!(extract_keywords("a  fern  s pot"), vec!["fern", "pot"]);
        assert!(extract_keywords("   ").is_empty());
    }

    #[test]
    fn test_rank_by_count_then_keyword() {
        let counts = vec![
            ("화분".to_string(), 3),
            ("monstera".to_string(), 5),
            ("가위".to_string(), 3),
            ("흙".to_string(), 1),
        ];
        let ranked = rank_keywords(counts, 3);
        let keywords: Vec<&str> = ranked.iter().map(|k| k.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["monstera", "가위", "화분"]);
    }

    #[test]
    fn test_tally() {
        let mut tally = KeywordTally::new();
        tally.record("몬스테라 화분");
        tally.record("화분 받침");
        tally.record("화분");

        assert_eq!(tally.count("화분"), 3);
        assert_eq!(tally.count("받침"), 1);
        let top = tally.top(DEFAULT_TOP_KEYWORDS);
        assert_eq!(top[0], KeywordCount { keyword: "화분".to_string(), count: 3 });
        assert_eq!(top.len(), 3);
    }

    #[test]
    fn test_repeat_within_window_counts_once() {
        let start = Instant::now();
        let mut tally = KeywordTally::new();

        assert_eq!(tally.record_from("u1", "몬스테라 화분", start), vec!["몬스테라", "화분"]);
        let again = tally.record_from("u1", "화분 받침", start + Duration::from_secs(60));

        assert_eq!(again, vec!["받침"]);
        assert_eq!(tally.count("화분"), 1);
        assert_eq!(tally.count("받침"), 1);
    }

    #[test]
    fn test_repeat_after_window_counts_again() {
        let start = Instant::now();
        let mut tally = KeywordTally::new().with_window(Duration::from_secs(10));

        tally.record_from("u1", "화분", start);
        // skipped, and the skip does not push the window out
        assert!(tally.record_from("u1", "화분", start + Duration::from_secs(9)).is_empty());
        assert_eq!(
            tally.record_from("u1", "화분", start + Duration::from_secs(10)),
            vec!["화분"]
        );
        assert_eq!(tally.count("화분"), 2);
    }

    #[test]
    fn test_window_is_per_searcher() {
        let now = Instant::now();
        let mut tally = KeywordTally::new();

        tally.record_from("u1", "화분", now);
        tally.record_from("10.0.0.7", "화분", now);
        assert_eq!(tally.count("화분"), 2);
        assert_eq!(tally.top(1)[0].count, 2);
    }
}

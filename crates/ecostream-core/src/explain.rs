//! Keyword-matched explanation of the current state.
//!
//! Matching is deliberately simple: a news item is relevant when its
//! lowercased title contains any whitespace-separated word of the
//! lowercased query. At most [`MAX_CONTEXT_ITEMS`] items are returned,
//! in snapshot order.

use ecostream_types::{Explanation, NewsItem, Snapshot};

/// Maximum number of news items attached to an explanation.
pub const MAX_CONTEXT_ITEMS: usize = 3;

/// Select the news items whose titles mention any word of `query`.
pub fn retrieve_relevant(query: &str, documents: &[NewsItem]) -> Vec<NewsItem> {
    let query = query.to_lowercase();
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    documents
        .iter()
        .filter(|doc| {
            let title = doc.title.to_lowercase();
            words.iter().any(|word| title.contains(word))
        })
        .take(MAX_CONTEXT_ITEMS)
        .cloned()
        .collect()
}

/// One of two fixed summaries, chosen by the alert flag.
pub fn build_summary(snapshot: &Snapshot) -> String {
    if snapshot.alert {
        format!(
            "Environmental stress is high in {}. Immediate attention recommended.",
            snapshot.location
        )
    } else {
        format!(
            "Environmental conditions in {} are currently stable.",
            snapshot.location
        )
    }
}

/// Answer `query` against `snapshot`.
pub fn explain(query: &str, snapshot: &Snapshot) -> Explanation {
    Explanation {
        location: snapshot.location.clone(),
        aqi: snapshot.aqi,
        stress: snapshot.stress,
        alert: snapshot.alert,
        news_context: retrieve_relevant(query, &snapshot.news),
        summary: build_summary(snapshot),
    }
}

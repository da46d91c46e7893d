//! dedup.rs — drop candidates already notified in earlier runs, then collapse
//! same-title items within the current batch.

use metrics::counter;
use std::collections::HashSet;

use crate::ingest::title_key;
use crate::ingest::types::CandidateItem;

/// Remove items whose identifier is in `seen`. Returns (kept, dropped).
pub fn drop_seen(items: Vec<CandidateItem>, seen: &[String]) -> (Vec<CandidateItem>, usize) {
    let seen: HashSet<&str> = seen.iter().map(String::as_str).collect();
    let before = items.len();
    let kept: Vec<_> = items
        .into_iter()
        .filter(|it| !seen.contains(it.identifier.as_str()))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Keep the first item per normalized title; order is preserved. Returns (kept, dropped).
pub fn dedupe_titles(items: Vec<CandidateItem>) -> (Vec<CandidateItem>, usize) {
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;

    for it in items {
        if !seen_titles.insert(title_key(&it.title)) {
            dropped += 1;
            continue;
        }
        keep.push(it);
    }

    (keep, dropped)
}

/// Both stages, history first.
pub fn dedupe(items: Vec<CandidateItem>, seen: &[String]) -> Vec<CandidateItem> {
    let (fresh, seen_cnt) = drop_seen(items, seen);
    let (unique, title_cnt) = dedupe_titles(fresh);

    counter!("dedup_seen_total").increment(seen_cnt as u64);
    counter!("dedup_title_total").increment(title_cnt as u64);
    tracing::debug!(target: "pipeline", seen = seen_cnt, titles = title_cnt, kept = unique.len(), "dedup");

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::identifier;
    use chrono::Utc;

    fn item(source: &str, title: &str, link: &str) -> CandidateItem {
        CandidateItem {
            identifier: identifier(title, link),
            source_name: source.into(),
            title: title.into(),
            link: link.into(),
            published_at: Utc::now(),
            snippet: String::new(),
        }
    }

    #[test]
    fn seen_identifiers_are_dropped() {
        let a = item("AP", "Clash at pass", "l1");
        let b = item("AP", "Troops withdraw", "l2");
        let seen = vec![a.identifier.clone()];
        let (kept, dropped) = drop_seen(vec![a, b.clone()], &seen);
        assert_eq!(kept, vec![b]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn same_title_first_occurrence_wins() {
        let a = item("Reuters", "Border clash", "l1");
        let b = item("BBC", "border  CLASH", "l2");
        let c = item("BBC", "Shelling resumes", "l3");
        let (kept, dropped) = dedupe_titles(vec![a.clone(), b, c.clone()]);
        assert_eq!(kept, vec![a, c]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn seen_filter_runs_before_title_collapse() {
        // the already-notified copy must not shadow a fresh same-title item
        let old = item("Reuters", "Border clash", "l1");
        let fresh = item("BBC", "Border clash", "l2");
        let seen = vec![old.identifier.clone()];
        let out = dedupe(vec![old, fresh.clone()], &seen);
        assert_eq!(out, vec![fresh]);
    }
}

// src/ingest/mod.rs
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use once_cell::sync::OnceCell;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::ingest::types::{CandidateItem, FeedEntry, FeedSource};

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Snippet length cap; Telegram messages top out at 4096 chars.
pub const SNIPPET_MAX_CHARS: usize = 1500;

/// Normalized description, clipped to `SNIPPET_MAX_CHARS`. Titles are never
/// clipped so the identifier stays a function of the feed's own title.
pub fn snippet_text(s: &str) -> String {
    let out = normalize_text(s);
    if out.chars().count() > SNIPPET_MAX_CHARS {
        out.chars().take(SNIPPET_MAX_CHARS).collect()
    } else {
        out
    }
}

/// RFC 2822 (RSS `pubDate`) or RFC 3339 (Atom / our own documents).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for (i, p) in parts.iter().enumerate() {
        if i > 0 {
            // unit separator keeps ("ab","c") and ("a","bc") apart
            hasher.update([0x1f]);
        }
        hasher.update(p);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Long-term dedupe key: a pure function of (title, link).
pub fn identifier(title: &str, link: &str) -> String {
    sha256_hex(&[title.as_bytes(), link.as_bytes()])
}

/// Hash of the lowercased, whitespace-collapsed title.
pub fn title_key(title: &str) -> String {
    let normalized = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    sha256_hex(&[normalized.as_bytes()])
}

/// Case-insensitive substring match against any keyword.
/// `keywords` are expected lowercase (the catalog normalizes them).
pub fn is_relevant(title: &str, snippet: &str, keywords: &[String]) -> bool {
    let text = format!("{title} {snippet}").to_lowercase();
    keywords.iter().any(|k| text.contains(k.as_str()))
}

/// Filter one source's entries by keyword and tag them as candidates.
pub fn candidates_from_entries(
    source_name: &str,
    entries: Vec<FeedEntry>,
    keywords: &[String],
    per_source: usize,
    now: DateTime<Utc>,
) -> Vec<CandidateItem> {
    entries
        .into_iter()
        .take(per_source)
        .filter(|e| is_relevant(&e.title, &e.snippet, keywords))
        .map(|e| CandidateItem {
            identifier: identifier(&e.title, &e.link),
            source_name: source_name.to_string(),
            published_at: e.published_at.unwrap_or(now),
            title: e.title,
            link: e.link,
            snippet: e.snippet,
        })
        .collect()
}

/// Query every source in declaration order; a failing source is logged and skipped.
pub async fn collect(
    sources: &[Box<dyn FeedSource>],
    keywords: &[String],
    per_source: usize,
    now: DateTime<Utc>,
) -> Vec<CandidateItem> {
    let mut out = Vec::new();
    for src in sources {
        match src.fetch_latest().await {
            Ok(entries) => {
                counter!("feed_items_total").increment(entries.len() as u64);
                let mut kept = candidates_from_entries(src.name(), entries, keywords, per_source, now);
                tracing::debug!(target: "ingest", source = src.name(), kept = kept.len(), "feed polled");
                out.append(&mut kept);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, source = src.name(), "feed error");
                counter!("feed_errors_total").increment(1);
            }
        }
    }

    counter!("candidates_kept_total").increment(out.len() as u64);
    gauge!("ingest_last_run_ts").set(now.timestamp() as f64);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kw() -> Vec<String> {
        vec!["clash".into(), "shelling".into(), "troop".into()]
    }

    fn entry(title: &str, link: &str) -> FeedEntry {
        FeedEntry {
            title: title.into(),
            link: link.into(),
            published_at: None,
            snippet: String::new(),
        }
    }

    #[test]
    fn normalize_text_strips_tags_and_collapses_ws() {
        let s = "  <p>Troops&nbsp;&nbsp;massed</p><b>near</b>   the line  ";
        assert_eq!(normalize_text(s), "Troops massed near the line");
    }

    #[test]
    fn only_snippets_are_clipped() {
        let long = "shelling ".repeat(400);
        assert_eq!(snippet_text(&long).chars().count(), SNIPPET_MAX_CHARS);
        assert_eq!(normalize_text(&long), long.trim());
    }

    #[test]
    fn identifier_is_stable_and_pair_sensitive() {
        let a = identifier("Border clash", "https://x/1");
        assert_eq!(a, identifier("Border clash", "https://x/1"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, identifier("Border clash", "https://x/2"));
        assert_ne!(identifier("ab", "c"), identifier("a", "bc"));
    }

    #[test]
    fn title_key_ignores_case_and_spacing() {
        assert_eq!(title_key("Border  Clash "), title_key("border clash"));
        assert_ne!(title_key("border clash"), title_key("border clashes"));
    }

    #[test]
    fn relevance_is_case_insensitive_over_title_and_snippet() {
        assert!(is_relevant("SHELLING reported", "", &kw()));
        assert!(is_relevant("Quiet morning", "troop movements seen", &kw()));
        assert!(!is_relevant("Trade talks resume", "tariffs", &kw()));
    }

    #[test]
    fn only_first_n_entries_are_considered() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        let entries = vec![
            entry("calm", "l0"),
            entry("clash one", "l1"),
            entry("clash two", "l2"),
        ];
        let out = candidates_from_entries("AP", entries, &kw(), 2, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "clash one");
        assert_eq!(out[0].source_name, "AP");
        assert_eq!(out[0].published_at, now);
        assert_eq!(out[0].identifier, identifier("clash one", "l1"));
    }

    #[test]
    fn parse_timestamp_accepts_rss_and_iso() {
        let a = parse_timestamp("Mon, 19 Oct 2026 10:00:00 GMT").unwrap();
        let b = parse_timestamp("2026-10-19T10:00:00Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_timestamp("yesterday").is_none());
    }
}

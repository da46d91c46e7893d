// src/notify/mod.rs
pub mod telegram;

use anyhow::Result;
use chrono::{DateTime, Utc};
use html_escape::encode_text;

use crate::ingest::types::CandidateItem;
use crate::sector::Sector;

pub use telegram::TelegramNotifier;

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Channel not configured; nothing left the process.
    Disabled,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<Delivery>;
}

/// RFC 1123 style, e.g. `Mon, 19 Oct 2026 10:00:00 GMT`.
pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Telegram HTML message for one surfaced item.
pub fn format_message(item: &CandidateItem, sector: Option<&Sector>) -> String {
    let mut text = String::from("<b>Borderadar Update</b>\n");
    text.push_str(&format!("<b>Source:</b> {}\n", encode_text(&item.source_name)));
    text.push_str(&format!("<b>Time:</b> {}\n\n", format_time(item.published_at)));
    text.push_str(&format!("<b>{}</b>\n", encode_text(&item.title)));
    if !item.snippet.is_empty() {
        text.push_str(&format!("{}\n", encode_text(&item.snippet)));
    }
    text.push_str(&format!("\n🔗 {}\n", encode_text(&item.link)));
    if let Some(s) = sector {
        text.push_str(&format!("📍 Sector: {}\n", encode_text(&s.name)));
        text.push_str(&format!("{}\n", encode_text(&s.map_url())));
    }
    text
}

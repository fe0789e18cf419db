//! Plain-text rendering of transcript entries and statistics.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::net::types::{Citation, QueryClassification, Stats};
use crate::state::chat::{Message, MessageKind};

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::System => "system",
        MessageKind::User => "you",
        MessageKind::Bot => "samarth",
        MessageKind::Error => "error",
    }
}

/// Render one transcript entry, including citations and query tags.
#[must_use]
pub fn message(msg: &Message) -> String {
    let mut out = format!("[{}] {}", label(msg.kind), msg.content);
    if let Some(info) = &msg.query_info {
        let tags = query_tags(info);
        if !tags.is_empty() {
            out.push_str(&format!("\n  ({tags})"));
        }
    }
    if let Some(sources) = &msg.sources {
        for (i, citation) in sources.iter().enumerate() {
            out.push('\n');
            out.push_str(&citation_line(i, citation));
        }
    }
    out
}

/// `[1] data.gov.in (dataset) relevance 92.0%`
#[must_use]
pub fn citation_line(index: usize, citation: &Citation) -> String {
    let kind = if citation.kind.is_empty() { "source" } else { citation.kind.as_str() };
    format!("  [{}] {} ({kind}) relevance {}", index + 1, citation.source, citation.relevance_percent())
}

fn query_tags(info: &QueryClassification) -> String {
    let mut parts = Vec::new();
    if let Some(kind) = info.query_type.as_deref().filter(|k| !k.is_empty()) {
        parts.push(format!("type: {kind}"));
    }
    if !info.states.is_empty() {
        parts.push(format!("states: {}", info.states.join(", ")));
    }
    if !info.crops.is_empty() {
        parts.push(format!("crops: {}", info.crops.join(", ")));
    }
    parts.join(" | ")
}

/// Summary lines for the statistics panel.
#[must_use]
pub fn stats(stats: &Stats) -> String {
    let status = if stats.is_indexed() { "online" } else { "indexing" };
    format!(
        "documents indexed: {}\nvector dimension: {}\ncache size: {}\nsystem status: {status}",
        stats.total_documents(),
        stats.embedding_dimension(),
        stats.cache_size(),
    )
}

#[must_use]
pub fn connectivity(connected: bool) -> &'static str {
    if connected { "connected to data.gov.in" } else { "connecting..." }
}

//! Wire DTOs for the answering service.
//!
//! DESIGN
//! ======
//! Every field the backend may omit is defaulted so a partially populated
//! answer still lands in the transcript. Statistics stay an opaque JSON
//! value; the accessors here only read what the statistics card shows.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// A structured reference to a data source backing a bot answer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Dataset or document name (e.g. `"data.gov.in"`).
    #[serde(default)]
    pub source: String,
    /// Retrieval relevance in `[0, 1]`.
    #[serde(default)]
    pub relevance: f64,
    /// Source category (e.g. `"dataset"`).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Excerpt the answer drew on.
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Citation {
    /// Relevance as a one-decimal percentage, e.g. `"92.0%"`.
    #[must_use]
    pub fn relevance_percent(&self) -> String {
        format!("{:.1}%", self.relevance.clamp(0.0, 1.0) * 100.0)
    }
}

/// Backend classification of a user query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClassification {
    #[serde(default)]
    pub query_type: Option<String>,
    #[serde(default)]
    pub states: Vec<String>,
    #[serde(default)]
    pub crops: Vec<String>,
}

/// Successful `POST /api/query` body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Citation>,
    #[serde(default)]
    pub query_info: Option<QueryClassification>,
}

/// `POST /api/query` and `POST /api/search_datasets` request body.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct QueryRequest<'a> {
    pub query: &'a str,
}

/// Successful `POST /api/search_datasets` body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSearch {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub count: u64,
}

/// Aggregate statistics from `GET /api/stats`, kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stats(pub serde_json::Value);

impl Stats {
    /// Documents in the backend vector store.
    #[must_use]
    pub fn total_documents(&self) -> u64 {
        self.u64_at("/vector_store/total_documents")
    }

    /// Embedding width of the vector store.
    #[must_use]
    pub fn embedding_dimension(&self) -> u64 {
        self.u64_at("/vector_store/embedding_dimension")
    }

    /// Entries in the backend response cache.
    #[must_use]
    pub fn cache_size(&self) -> u64 {
        self.u64_at("/cache/size")
    }

    /// Whether the backend finished indexing.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.0.pointer("/is_indexed").and_then(serde_json::Value::as_bool).unwrap_or(false)
    }

    fn u64_at(&self, pointer: &str) -> u64 {
        self.0.pointer(pointer).and_then(serde_json::Value::as_u64).unwrap_or(0)
    }
}

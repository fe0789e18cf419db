//! Shared fixtures for unit tests: a scripted `AnswerService`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::Notify;

use crate::net::api::AnswerService;
use crate::net::error::ApiError;
use crate::net::types::{Citation, DatasetSearch, QueryClassification, QueryResponse, Stats};

/// Answering service that replays queued results and records what it saw.
#[derive(Default)]
pub struct ScriptedService {
    answers: Mutex<VecDeque<Result<QueryResponse, ApiError>>>,
    stats: Mutex<VecDeque<Result<Stats, ApiError>>>,
    pub healthy: AtomicBool,
    pub queries: Mutex<Vec<String>>,
    pub stats_calls: AtomicUsize,
    pub index_calls: AtomicUsize,
    /// When set, `submit_query` parks until `release()` is called.
    gate: Option<Notify>,
    pub started: Notify,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service whose `submit_query` blocks until `release()`.
    pub fn gated() -> Self {
        Self { gate: Some(Notify::new()), ..Self::default() }
    }

    pub fn online(self) -> Self {
        self.healthy.store(true, Ordering::SeqCst);
        self
    }

    pub fn answer(self, response: QueryResponse) -> Self {
        self.answers.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fail(self, error: ApiError) -> Self {
        self.answers.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn stats(self, result: Result<Stats, ApiError>) -> Self {
        self.stats.lock().unwrap().push_back(result);
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl AnswerService for ScriptedService {
    async fn health_check(&self) -> Result<serde_json::Value, ApiError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(json!({ "status": "online" }))
        } else {
            Err(ApiError::Connectivity("Failed to connect to server".into()))
        }
    }

    async fn submit_query(&self, text: &str) -> Result<QueryResponse, ApiError> {
        self.queries.lock().unwrap().push(text.to_owned());
        self.started.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.answers.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(answer("default answer")))
    }

    async fn get_stats(&self) -> Result<Stats, ApiError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.stats.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(stats(1)))
    }

    async fn trigger_indexing(&self) -> Result<serde_json::Value, ApiError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "status": "success" }))
    }

    async fn search_datasets(&self, _text: &str) -> Result<DatasetSearch, ApiError> {
        Ok(DatasetSearch::default())
    }
}

pub fn answer(text: &str) -> QueryResponse {
    QueryResponse { answer: text.to_owned(), sources: Vec::new(), query_info: None }
}

/// The "top crops in Maharashtra" answer with one citation.
pub fn ranking_answer() -> QueryResponse {
    QueryResponse {
        answer: "Sugarcane, cotton, soybean, wheat and rice lead production.".to_owned(),
        sources: vec![Citation {
            source: "data.gov.in".to_owned(),
            relevance: 0.92,
            kind: "dataset".to_owned(),
            text: "District-wise crop production statistics".to_owned(),
            metadata: None,
        }],
        query_info: Some(QueryClassification {
            query_type: Some("ranking".to_owned()),
            states: vec!["Maharashtra".to_owned()],
            crops: vec!["wheat".to_owned(), "rice".to_owned()],
        }),
    }
}

pub fn stats(total_documents: u64) -> Stats {
    Stats(json!({
        "vector_store": { "total_documents": total_documents, "embedding_dimension": 384 },
        "cache": { "size": 3 },
        "is_indexed": true
    }))
}

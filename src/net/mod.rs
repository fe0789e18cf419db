//! Network layer for the answering service.
//!
//! DESIGN
//! ======
//! `types` holds the wire DTOs, `error` the normalized error taxonomy, and
//! `api` the `AnswerService` seam plus its reqwest client.

pub mod api;
pub mod error;
pub mod types;

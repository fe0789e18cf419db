//! # agri-chat
//!
//! Terminal chat client for the Project Samarth agricultural & climate data
//! Q&A service. Owns the conversation transcript, submits questions to the
//! answering service, and merges answers with their citations and query
//! classification back into the transcript.
//!
//! Leaf to root: `net` (answering service client), `state` (conversation
//! store and session indicators), `events` (example-query relay),
//! `bootstrap` (startup health check and statistics load). `render` turns
//! state into plain text for the binary.

pub mod bootstrap;
pub mod config;
pub mod events;
pub mod net;
pub mod render;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Client-side session state.
//!
//! DESIGN
//! ======
//! `chat` owns the transcript and the send state machine; `session` holds the
//! connectivity and statistics indicators the bootstrap writes.

pub mod chat;
pub mod session;

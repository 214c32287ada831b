//! Client-side chat session reconciliation for a document chat assistant.
//!
//! Invariant: the transcript only changes through [`ChatController`]; results
//! of network calls that are no longer current are discarded, never applied.
//!
//! # Public API Overview
//! - [`Conversation`] drives selects and sends against [`chat_service`] seams.
//! - [`ChatController`] is the synchronous state machine behind it.
//! - [`SessionList`] caches the user's sessions, newest first.
//! - [`AuthContext`] restores, creates, and clears the signed-in session.
//! - [`render`] formats transcripts and listings for a text terminal.

pub mod auth;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod logging;
pub mod render;
pub mod session_list;
pub mod text;

pub use crate::auth::AuthContext;
pub use crate::config::{EnvConfig, ServiceKind};
pub use crate::controller::{
    session_title_for, ChatController, ChatState, Completion, Delivery, HistoryRequest,
    RequestId, SendTicket, TranscriptEntry,
};
pub use crate::conversation::Conversation;
pub use crate::error::{AuthError, ChatError};
pub use crate::session_list::SessionList;

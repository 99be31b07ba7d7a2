//! State management module
//!
//! This module holds everything an editing session owns:
//! - The edit state snapshot and its adjustments (edit.rs)
//! - Text and image overlays (overlay.rs)
//! - Linear undo/redo history (history.rs)
//! - The session itself, tying the above together (session.rs)
//! - Drafts and the draft slot abstraction (draft.rs)
//! - The SQLite-backed draft slot (library.rs)
//! - Shared data structures such as the post record (data.rs)

pub mod data;
pub mod draft;
pub mod edit;
pub mod history;
pub mod library;
pub mod overlay;
pub mod session;

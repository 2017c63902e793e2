//! Storage abstractions for service layer
//!
//! File-backed JSON documents read fresh on every call and replaced
//! atomically on write.

pub mod json_doc_store;

//! Shared types and utilities for Parley components.
//!
//! Holds the wire types exchanged over HTTP plus the pieces of the answer
//! pipeline that need no network: the dataset loader and the overlap matcher.

pub mod chat;
pub mod dataset;
pub mod error;
pub mod matcher;

pub use chat::{ChatRequest, ChatResponse, DatasetListing, HealthResponse, ResponseSource};
pub use dataset::{list_files, load_dataset, parse_line, DatasetEntry};
pub use error::ParleyError;
pub use matcher::{best_match, tokenize, MatchPolicy, MatchResult};

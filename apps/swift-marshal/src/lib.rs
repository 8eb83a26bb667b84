//! swift-marshal core library.
//!
//! This crate exposes programmatic APIs for checking and fixing the order of
//! members inside Swift type declarations.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and lenient loading of `.swift-marshal.yaml`.
//! - `syntax`: Structural parser turning Swift text into a declaration tree.
//! - `classify`: Rule matching; maps each member to an ordering bucket.
//! - `order`: Stable bucket ordering of a member sequence.
//! - `boundary`: Grouping of type bodies and extensions into rewrite units.
//! - `rewrite`: Re-emits source text with members in their target slots.
//! - `pipeline`: Parallel, fail-fast check/fix over many files.
//! - `gateway`: Per-path serialized file reads and writes.
//! - `discover`: Input file collection.
//! - `models`: Declaration tree, configuration and result structs.
//! - `output`: Human/JSON/Xcode printers for check and fix.
//! - `error`: Error types and exit codes.
pub mod boundary;
pub mod classify;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod gateway;
pub mod models;
pub mod order;
pub mod output;
pub mod pipeline;
pub mod rewrite;
pub mod syntax;

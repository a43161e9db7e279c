//! snippet-relay: a small HTTP API in front of a shared Notion database
//! and an n8n snippet webhook.
//!
//! Inbound requests are checked against a shared-secret `Api-Key` header,
//! translated into live upstream calls (no local persistence, no caching)
//! and reshaped into application-friendly JSON or Markdown. The two
//! non-trivial pieces are the block-tree-to-Markdown walk ([`walker`])
//! and the entry/snippet reconciliation ([`reconcile`]).

pub mod blocks;
pub mod config;
pub mod entries;
pub mod error;
pub mod notion;
pub mod reconcile;
pub mod server;
pub mod snippets;
pub mod walker;

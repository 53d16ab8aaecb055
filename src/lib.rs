//! # Gita Advisor
//!
//! Semantic verse retrieval over the Bhagavad Gita, with empathetic
//! explanations produced by a hosted chat-completion model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────┐
//! │ Dataset  │──▶│  Indexer  │──▶│  Collection  │
//! │  (CSV)   │   │ (startup) │   │ SQLite + vec │
//! └──────────┘   └───────────┘   └──────┬───────┘
//!                                       │ query
//!                ┌──────────┐    ┌──────▼───────┐    ┌──────────┐
//!   HTTP ───────▶│  Server  │───▶│   Advisor    │───▶│   Chat   │
//!                └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Verse records and JSON bodies |
//! | [`dataset`] | CSV loading and random sampling |
//! | [`embedding`] | Embedder trait and OpenAI embeddings client |
//! | [`store`] | Vector collection trait, SQLite and in-memory backends |
//! | [`indexer`] | Startup indexing phase |
//! | [`retriever`] | Nearest-passage lookup |
//! | [`prompt`] | Persona and message templates |
//! | [`chat`] | Chat provider trait and OpenAI chat client |
//! | [`advisor`] | Advice and random-shloka flows |
//! | [`server`] | Axum HTTP server |
//! | [`db`] | SQLite connection |
//! | [`migrate`] | Schema migrations |

pub mod advisor;
pub mod chat;
pub mod config;
pub mod dataset;
pub mod db;
pub mod embedding;
pub mod indexer;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod retriever;
pub mod server;
pub mod store;

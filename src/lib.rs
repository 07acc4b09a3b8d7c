//! # Catalog Sync
//!
//! Receives signed product webhooks from a commerce platform and mirrors the
//! products into a multimodal search index.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  POST /webhooks/products/*  ┌───────────┐  upsert/delete  ┌─────────────┐
//! │  Commerce  │────────────────────────────▶│  Gateway  │────────────────▶│ IndexClient │
//! │  platform  │◀────── 200 OK / 401 ────────│ (verify)  │                 │ (transform) │
//! └────────────┘                             └───────────┘                 └──────┬──────┘
//!                                                                                 │ HTTP
//!                                                                                 ▼
//!                                                                          ┌─────────────┐
//!                                                                          │ Index svc   │
//!                                                                          └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export SHOPIFY_WEBHOOK_SECRET=... MARQO_API_KEY=...
//! catalog-sync serve                       # start the webhook server
//! catalog-sync serve --simulate            # log index requests instead of sending them
//! catalog-sync sign payload.json           # signature for a test delivery
//! catalog-sync preview update payload.json # show the index request for a payload
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration + environment overrides |
//! | [`error`] | Sync and dispatch error types |
//! | [`index_client`] | Index requests, transports, and the sync client |
//! | [`logging`] | Tracing subscriber setup |
//! | [`preview`] | `preview` command |
//! | [`server`] | Axum router and server loop |
//! | [`sign`] | `sign` command |
//! | [`traits`] | `ProductSync` and `Transport` seams |
//! | [`webhook`] | Signature check, dispatch, acknowledgment |
//!
//! Pure models, the transform, and signature code live in
//! [`catalog_sync_core`].

pub mod config;
pub mod error;
pub mod index_client;
pub mod logging;
pub mod preview;
pub mod server;
pub mod sign;
pub mod traits;
pub mod webhook;

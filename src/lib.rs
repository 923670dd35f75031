//! # Dynamic Search
//!
//! A pluggable dispatch layer that routes a named search context to a
//! concrete index/search provider and post-processes query results.
//!
//! Contexts are declared in TOML configuration and bind one provider token
//! to a set of output channels (autocomplete, suggestions, search).
//! Providers, channels, and result modifiers are registered at bootstrap;
//! dispatch resolves them lazily, validates provider options before any
//! backend call, and runs each raw result through the channel's configured
//! filter/action pipeline.
//!
//! ## Architecture
//!
//! ```text
//! caller ──▶ ContextResolver ──▶ IndexManager ──▶ OutputChannel.execute
//!                                    │                    │
//!                             ProviderRegistry      ModifierPipeline
//!                                                         │
//!                                                  PaginationAdapter
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`context`] | Context definitions and resolution |
//! | [`provider`] | Index provider capability set and option schema |
//! | [`channel`] | Output channels and runtime strategies |
//! | [`registry`] | Provider/channel factory catalog |
//! | [`index_manager`] | Lazy provider instantiation and caching |
//! | [`channel_manager`] | Channel, strategy, and modifier lookup |
//! | [`modifier`] | Filter/action pipeline |
//! | [`dispatch`] | Query dispatch orchestration |
//! | [`paginate`] | Lazy windowed pagination and normalization |
//! | [`result`] | Raw result container |
//! | [`error`] | Typed error taxonomy |
//! | [`logger`] | Shared logger collaborator |

pub mod channel;
pub mod channel_manager;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod index_manager;
pub mod logger;
pub mod modifier;
pub mod paginate;
pub mod provider;
pub mod registry;
pub mod result;

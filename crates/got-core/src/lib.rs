//! # got-core
//!
//! Typed HTTP client layer for the Ice and Fire houses API.
//!
//! Every request resolves to a [`networking::RequestStatus`] instead of an
//! error: transport failures, undecodable bodies and error responses are
//! folded into one of a fixed set of outcomes, with the device's
//! connectivity deciding whether a failed exchange reads as "server
//! unreachable" or "no network".
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use got_core::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> got_core::Result<()> {
//!     let config = Config::load(None)?;
//!     let client = IceAndFireClient::new(&config.client_settings(None), None)?;
//!
//!     let feed = Arc::new(PagedFeed::new(Arc::new(HouseService::new(client, 20))));
//!     let mut updates = feed.subscribe();
//!     feed.spawn_fetch(false);
//!
//!     while let Ok(status) = updates.recv().await {
//!         if !status.is_loading() {
//!             println!("{:?}", status);
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           API Layer                 │  Endpoint construction, models
//! ├─────────────────────────────────────┤
//! │          Core Layer                 │  House service, paged feed
//! ├─────────────────────────────────────┤
//! │        Networking Layer             │  Calls, classification, connectivity
//! ├─────────────────────────────────────┤
//! │    Storage / Utils / Display        │  Config file, helpers, tables
//! └─────────────────────────────────────┘
//! ```

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use got_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Result;
    pub use crate::error::AppError;

    pub use crate::api::client::{ClientSettings, IceAndFireClient};
    pub use crate::api::models::House;

    pub use crate::core::services::config_service::ConfigService;
    pub use crate::core::services::{FeedState, HouseService, PageSource, PagedFeed};

    pub use crate::networking::{
        Call, ConnectivityMonitor, ManualNetwork, Pagination, ProbeNetwork, RequestStatus,
    };

    pub use crate::storage::config::Config;

    pub use crate::display::TableDisplay;
}

/// House service and the paged feed that drives it.
pub mod core;

/// Call adaptation, outcome classification, connectivity and pagination.
pub mod networking;

/// TOML configuration persistence.
pub mod storage;

/// Text placeholders, page arithmetic and argument validation.
pub mod utils;

/// Client setup, endpoints and response models.
pub mod api;

/// Terminal table rendering.
pub mod display;

/// Error types for setup and configuration failures, with severity levels
/// and troubleshooting hints.
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

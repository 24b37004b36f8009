//! Match-phase driven refresh orchestrator for football data sync.
//!
//! Classifies where a league sits in its fixture cycle, resolves the endpoint set
//! for that phase and fans the refresh calls out in a required wave followed by an
//! optional one, reporting a per-endpoint summary.
//!
//! # Examples
//!
//! ```rust,no_run
//! use matchday_sync::error::AppError;
//! use matchday_sync::http_client::create_http_client_with_timeout;
//! use matchday_sync::orchestrator::{OrchestrationRequest, Outcome, PhaseOrchestrator, Progress};
//! use matchday_sync::phase::PhaseTable;
//! use matchday_sync::refresh::HttpRefreshExecutor;
//! use matchday_sync::store::RestStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let client = create_http_client_with_timeout(120)?;
//!     let orchestrator = PhaseOrchestrator::new(
//!         Arc::new(RestStore::new(client.clone(), "https://db.example.com", "service-key")),
//!         Arc::new(HttpRefreshExecutor::new(client, "https://sync.example.com/api/admin/refresh")),
//!         PhaseTable::default(),
//!     );
//!
//!     let request = OrchestrationRequest::new("7f1d2c9e-epl");
//!     if let Outcome::Run(summary) = orchestrator.run(&request, &Progress::silent()).await? {
//!         println!("{} ({}/{})", summary.phase, summary.summary.successful, summary.summary.total);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod http_client;
pub mod models;
pub mod orchestrator;
pub mod phase;
pub mod refresh;
pub mod server;
pub mod store;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::AppError;
pub use models::{Phase, RunSummary};
pub use orchestrator::{OrchestrationRequest, Outcome, PhaseOrchestrator};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

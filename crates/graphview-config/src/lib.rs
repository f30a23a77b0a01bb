//! Typed configuration for graphview.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides, optionally seeded from `.env`
//! - Strict parsing (unknown fields are rejected) and validation
//! - Layered loading (defaults or preset → file → env)
//!
//! # Example
//!
//! ```no_run
//! use graphview_config::ConfigLoader;
//!
//! # fn main() -> Result<(), graphview_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("graphview.toml")?
//!     .with_dotenv()
//!     .with_env_prefix("GRAPHVIEW")
//!     .load()?;
//!
//! println!("fetch timeout: {:?}", config.dataplane.fetch_timeout());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [dataplane]
//! fetch_timeout_ms = 1000
//!
//! [pipeline]
//! request_timeout_ms = 10000
//! default_limit = 50
//! max_limit = 100
//!
//! [labelers]
//! default = ["did:plc:ar7c4by46qjdydhdevvrndac"]
//!
//! [telemetry]
//! service_name = "graphview"
//! environment = "production"
//!
//! [telemetry.logging]
//! level = "info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `GRAPHVIEW__DATAPLANE__FETCH_TIMEOUT_MS=500`
//! - `GRAPHVIEW__PIPELINE__MAX_LIMIT=50`
//! - `GRAPHVIEW__LABELERS__DEFAULT=did:plc:a,did:plc:b`
//! - `GRAPHVIEW__TELEMETRY__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! AgentConfig::default()
//!     → loader.rs (optional TOML file, merged on top)
//!     → AgentConfig (frozen, shared via Arc with the agent)
//!
//! Agent start:
//!     address.rs resolves `bind` to an IP/port pair
//! ```
//!
//! # Design Decisions
//! - Config is immutable once handed to the agent
//! - All fields have defaults to allow minimal files
//! - Profile names are checked when the agent starts, not at load

pub mod address;
pub mod loader;
pub mod schema;

pub use address::{resolve, AddressError, DEFAULT_BIND_PORT};
pub use loader::{load_config, read_config, ConfigError};
pub use schema::AgentConfig;

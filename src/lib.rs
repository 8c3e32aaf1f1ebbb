//! # sqlward
//!
//! Provisioning service for shared MySQL hosting: tenant accounts,
//! databases, and quotas, usable both as a standalone binary and as a
//! library.
//!
//! The registry (SQLite) records what is supposed to exist; the engine
//! (MySQL) is where it physically exists. Every mutation commits to the
//! registry first, then applies to the engine, and undoes the registry
//! write when the engine refuses.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! sqlward = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqlward::config::Config;
//! use sqlward::engine::MySqlEngine;
//! use sqlward::provision::Provisioner;
//! use sqlward::registry::{Registry, SqliteRegistry};
//! use sqlward::types::ContactInfo;
//!
//! let config = Config::default();
//! let registry = SqliteRegistry::new(config.registry_path()).unwrap();
//! registry.initialize().unwrap();
//! let engine = MySqlEngine::connect(&config.effective_engine_url()).unwrap();
//!
//! let provisioner = Provisioner::new(Arc::new(registry), Arc::new(engine), &config);
//! let issued = provisioner
//!     .create_account("alice", "alice", &ContactInfo::default())
//!     .await
//!     .unwrap();
//! println!("{}", issued.password);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Dependencies for the binary. Disable with
//!   `default-features = false` when embedding.

pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod provision;
pub mod registry;
pub mod response;
pub mod types;

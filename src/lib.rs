//! # StrandKV
//!
//! A typed, namespaced key-value facade over an embedded LSM-tree engine:
//! - Typed values through the [`Encode`] / [`Decode`] codec traits
//! - Namespace isolation by key prefixing, many logical stores in one directory
//! - Ordered range iteration with inclusive bounds over snapshots
//! - Atomic, ordered multi-operation batches
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Database                              │
//! │          get / put / delete / batch / iterate                │
//! └──────────┬───────────────────────────────┬──────────────────┘
//!            │                               │
//!            ▼                               ▼
//!   ┌─────────────────┐             ┌─────────────────┐
//!   │    Namespace    │             │      Codec      │
//!   │ (key prefixing) │             │ (Encode/Decode) │
//!   └────────┬────────┘             └────────┬────────┘
//!            └───────────────┬───────────────┘
//!                            ▼
//!                  ┌───────────────────┐
//!                  │   StorageHandle   │
//!                  │ (physical bytes)  │
//!                  └─────────┬─────────┘
//!                            ▼
//!                  ┌───────────────────┐
//!                  │   fjall (LSM)     │
//!                  └───────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use strandkv::{BatchOp, Database, IterOptions};
//!
//! # fn main() -> strandkv::Result<()> {
//! let db = Database::open_with_namespace("/tmp/strandkv-doc", "users/")?;
//!
//! db.put("alice", "admin")?;
//! let role: Option<String> = db.get("alice")?;
//! assert_eq!(role.as_deref(), Some("admin"));
//!
//! db.batch([BatchOp::delete("alice"), BatchOp::put("bob", &"viewer")])?;
//!
//! for entry in db.iterate::<String, String>(IterOptions::new().gte("b"))? {
//!     let (name, role) = entry?;
//!     println!("{name}: {role}");
//! }
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod namespace;
pub mod storage;
pub mod batch;
pub mod iter;
pub mod db;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StrandError, Result};
pub use config::{BackendKind, Config, SyncStrategy};
pub use codec::{CodecError, Decode, Encode};
pub use namespace::Namespace;
pub use storage::{Direction, StorageHandle};
pub use batch::{BatchOp, WriteBatch};
pub use iter::{Iter, IterOptions};
pub use db::Database;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StrandKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

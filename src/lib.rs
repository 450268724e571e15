//! Logdisk - Log-Structured Storage Device Simulator
//!
//! A block-level simulator for a log-structured storage device, driven by a
//! small command language. Files are append-allocated at a cursor, deletion
//! punches holes, and a single stable compaction pass reclaims them when an
//! allocation would otherwise fail.
//!
//! ## Features
//!
//! - **Append-at-cursor allocation** with an exactly-two-attempt policy:
//!   one tail check, at most one compaction, one retry
//! - **Stable compaction** that preserves the relative order of surviving
//!   blocks
//! - **Monotonic file ids** starting at 3, never reused across deletes
//! - **Binary size ladder** (`B` < `KB` < `MB` < `GB` < `TB`, x1024 per step)
//!   with downscale-only conversion
//! - **Script driver** with a strict geometry handshake and per-command
//!   error reporting
//!
//! ## Modules
//!
//! - [`units`] - size units and whole-number downscale conversion
//! - [`path`] - absolute path resolution against a current directory
//! - [`geometry`] - validated capacity / block-size pairing
//! - [`store`] - block slots, append cursor, compaction
//! - [`catalog`] - file records and id issuance
//! - [`dirs`] - directory registry and current-directory state
//! - [`device`] - write/read/delete orchestration over store and catalog
//! - [`script`] - command grammar and line parser
//! - [`session`] - script interpreter and report stream
//! - [`error`] - fatal versus per-command error tiers
//!
//! ## Quick Start
//!
//! ```rust
//! use logdisk::Session;
//!
//! fn main() -> logdisk::Result<()> {
//!     let mut session = Session::new();
//!     session.execute_line("diskCapacity(4MB)")?;
//!     session.execute_line("blockSize(1MB)")?;
//!     session.execute_line("mkdir(/docs)")?;
//!     session.execute_line("chdir(/docs)")?;
//!     for report in session.execute_line("write(notes, 1500KB)")? {
//!         println!("{report}"); // /docs/notes, 3, 0x0, 2MB
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Session                                     │
//! │  - geometry handshake, command dispatch     │
//! │  - Report stream (console text / serde)     │
//! ├──────────────────────┬──────────────────────┤
//! │ DirRegistry          │ Device               │
//! │  - current dir       │  - Catalog (ids)     │
//! │  - path resolution   │  - BlockStore        │
//! │                      │    (slots, cursor,   │
//! │                      │     compaction)      │
//! └──────────────────────┴──────────────────────┘
//! ```

pub mod catalog;
pub mod device;
pub mod dirs;
pub mod error;
pub mod geometry;
pub mod path;
pub mod script;
pub mod session;
pub mod store;
pub mod units;

// Re-export commonly used types
pub use catalog::{Catalog, FileId, FileRecord, FIRST_FILE_ID};
pub use device::{Commit, Device, DeviceStats, ReadInfo};
pub use dirs::{DirCreate, DirRegistry, ROOT};
pub use error::{LogdiskError, Result};
pub use geometry::Geometry;
pub use script::{Command, ScriptParser};
pub use session::{Report, Session};
pub use store::{BlockStore, Slot};
pub use units::{convert, SizeUnit, UNIT_STEP};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Service layer owning the persisted resource collection.
//! - `storage`: raw document backends behind a `load()/save()` seam.
//! - `resources`: collection semantics (append, merge, remove) and the
//!   single-writer store built on top of a backend.

pub mod errors;
pub mod storage;
pub mod resources;

//! Shared building blocks for the resource server crates:
//! wire body types, logging bootstrap and filesystem helpers.

pub mod types;
pub mod utils;
pub mod env;

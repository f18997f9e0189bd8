//! # moat-sandbox
//!
//! Gatekeeper for every filesystem path the upper layers touch on behalf of
//! the remote model. Each read, write, list, or directory change asks the
//! [`SandboxBoundary`] first; denied paths are never partially acted upon
//! because the guard performs no I/O itself, only authorization.
//!
//! The boundary is constructed once at startup from the launch directory
//! and passed by reference into every path-resolving call. Candidate paths
//! are fully canonicalized — `..` segments and symlinks resolved — *before*
//! the component-wise prefix comparison, defeating both traversal and
//! symlink-escape attacks. `/proj` never authorizes `/projects/x`.
//!
//! Escaping the boundary requires typing the exact confirmation literal
//! [`ESCAPE_CONFIRMATION`]; anything else leaves the sandbox enforced.

#![deny(unsafe_code)]

pub mod boundary;
pub mod errors;
pub mod resolve;

pub use boundary::SandboxBoundary;
pub use errors::SandboxError;

/// The exact literal a user must type to enable filesystem escape.
pub const ESCAPE_CONFIRMATION: &str = "YES";

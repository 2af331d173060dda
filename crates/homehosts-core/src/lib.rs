//! # homehosts-core
//!
//! Safe lookup-and-pack engine behind the `homehosts` name service backend.
//!
//! The engine resolves host names and addresses against a per-user text file
//! (`$HOME/.hosts`, same line format as `/etc/hosts`) and packs the answer into a
//! caller-supplied byte buffer using the `struct hostent` layout the C library
//! expects from any NSS backend.
//!
//! # Architecture
//!
//! ```text
//! engine -> scanner (tokens, mark/rewind) -> matcher (by name / by address)
//!        -> hostent builder -> arena (forward/backward regions) -> caller buffer
//! ```
//!
//! No `unsafe` code is permitted at the crate level. Pointer values written into the
//! packed tables are computed from the buffer's base address as plain integers; the
//! ABI crate only reinterprets offsets as pointers.

#![deny(unsafe_code)]

pub mod arena;
pub mod engine;
pub mod error;
pub mod hostconf;
pub mod hostent;
pub mod inet;
pub mod matcher;
pub mod scanner;

pub use engine::{
    HostsFile, LookupConfig, Query, lookup_by_address, lookup_by_name,
    lookup_by_name_any_family, resolve, resolve_any_family,
};
pub use error::LookupError;
pub use hostent::{HostentLayout, HostentView};
pub use inet::{AddressFamily, HostAddr};

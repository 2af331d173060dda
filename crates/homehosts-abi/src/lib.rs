// NSS entry points take raw pointers straight from the C library's dispatcher.
#![allow(clippy::missing_safety_doc)]
//! # homehosts-abi
//!
//! `extern "C"` boundary for the `homehosts` name service module.
//!
//! This crate produces a `cdylib` (`libnss_homehosts.so`). Listing `homehosts` on the
//! `hosts:` line of `/etc/nsswitch.conf` makes the C library call the
//! `_nss_homehosts_*` symbols exported from [`hosts_abi`], which delegate to the safe
//! engine in `homehosts-core`.
//!
//! # Architecture
//!
//! ```text
//! glibc NSS dispatch -> _nss_homehosts_* (this crate) -> homehosts-core -> caller buffer
//! ```

pub mod config;
pub mod hosts_abi;

//! Process-wide lookup configuration.
//!
//! The `multi` flag comes from `/etc/host.conf` (or `RESOLV_HOST_CONF`) and the
//! `RESOLV_MULTI` override. It is resolved on the first lookup and never re-read.

use std::sync::atomic::{AtomicU8, Ordering};

use homehosts_core::LookupConfig;
use homehosts_core::hostconf::HostConf;

// Atomic cache: 0=unresolved, 1=multi off, 2=multi on, 255=resolving.
// The env and file reads below go through the C library, which may re-enter NSS
// while the slot is held, so resolution never blocks.
static CACHED_MULTI: AtomicU8 = AtomicU8::new(0);

const MULTI_UNRESOLVED: u8 = 0;
const MULTI_OFF: u8 = 1;
const MULTI_ON: u8 = 2;
const MULTI_RESOLVING: u8 = 255;

fn flag_to_u8(multi: bool) -> u8 {
    if multi { MULTI_ON } else { MULTI_OFF }
}

/// Get the cached `multi` flag, resolving it on first use.
///
/// A reentrant or concurrent call that finds the cache being resolved gets `false`.
#[must_use]
pub fn multi_enabled() -> bool {
    let cached = CACHED_MULTI.load(Ordering::Acquire);

    if cached != MULTI_UNRESOLVED && cached != MULTI_RESOLVING {
        return cached == MULTI_ON;
    }

    if cached == MULTI_RESOLVING {
        return false;
    }

    if CACHED_MULTI
        .compare_exchange(
            MULTI_UNRESOLVED,
            MULTI_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_MULTI.load(Ordering::Acquire);
        return v == MULTI_ON;
    }

    let multi = HostConf::load_system().multi;
    CACHED_MULTI.store(flag_to_u8(multi), Ordering::Release);
    multi
}

/// Configuration handed to the engine for one call.
#[must_use]
pub fn lookup_config() -> LookupConfig {
    LookupConfig {
        multi: multi_enabled(),
    }
}

//! Lookup errors and their name-service status mapping.
//!
//! Every failure of a lookup is one of four kinds, and each kind maps to exactly one
//! `(nss_status, errno, h_errno)` triple at the NSS boundary:
//!
//! | kind        | variants                                   | status   | errno        | h_errno        |
//! |-------------|--------------------------------------------|----------|--------------|----------------|
//! | soft        | `HomeUnknown`, `PathTooLong`, `Open`       | TRYAGAIN | EAGAIN       | TRY_AGAIN      |
//! | not found   | `NotFound`                                 | NOTFOUND | ENOENT       | NO_ADDRESS     |
//! | capacity    | `BufferTooSmall`                           | TRYAGAIN | ERANGE       | NETDB_INTERNAL |
//! | unsupported | `UnsupportedFamily`                        | UNAVAIL  | EAFNOSUPPORT | NETDB_INTERNAL |

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::arena::ArenaFull;

// errno values (Linux).
pub const ENOENT: i32 = 2;
pub const EAGAIN: i32 = 11;
pub const EINVAL: i32 = 22;
pub const ERANGE: i32 = 34;
pub const EAFNOSUPPORT: i32 = 97;

// h_errno values from <netdb.h>.
pub const NETDB_INTERNAL: i32 = -1;
pub const NETDB_SUCCESS: i32 = 0;
pub const HOST_NOT_FOUND: i32 = 1;
pub const TRY_AGAIN: i32 = 2;
pub const NO_RECOVERY: i32 = 3;
pub const NO_DATA: i32 = 4;
pub const NO_ADDRESS: i32 = NO_DATA;

/// `enum nss_status` from `<nss.h>`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NssStatus {
    TryAgain = -2,
    Unavail = -1,
    NotFound = 0,
    Success = 1,
    Return = 2,
}

impl NssStatus {
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TryAgain => "TRYAGAIN",
            Self::Unavail => "UNAVAIL",
            Self::NotFound => "NOTFOUND",
            Self::Success => "SUCCESS",
            Self::Return => "RETURN",
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HOME is not set; cannot locate the per-user hosts file")]
    HomeUnknown,
    #[error("hosts file path is {len} bytes, limit is {limit}")]
    PathTooLong { len: usize, limit: usize },
    #[error("cannot read {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no address found")]
    NotFound,
    #[error("result does not fit in the caller buffer: {0}")]
    BufferTooSmall(#[from] ArenaFull),
    #[error("address family {0} is not supported")]
    UnsupportedFamily(i32),
}

impl LookupError {
    /// Transient failure: the caller may retry or consult another backend.
    #[must_use]
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::HomeUnknown | Self::PathTooLong { .. } | Self::Open { .. }
        )
    }

    #[must_use]
    pub fn status(&self) -> NssStatus {
        match self {
            Self::HomeUnknown | Self::PathTooLong { .. } | Self::Open { .. } => {
                NssStatus::TryAgain
            }
            Self::NotFound => NssStatus::NotFound,
            Self::BufferTooSmall(_) => NssStatus::TryAgain,
            Self::UnsupportedFamily(_) => NssStatus::Unavail,
        }
    }

    /// Value stored through the NSS `errnop` argument.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::HomeUnknown | Self::PathTooLong { .. } | Self::Open { .. } => EAGAIN,
            Self::NotFound => ENOENT,
            Self::BufferTooSmall(_) => ERANGE,
            Self::UnsupportedFamily(_) => EAFNOSUPPORT,
        }
    }

    /// Value stored through the NSS `h_errnop` argument.
    #[must_use]
    pub fn h_errno(&self) -> i32 {
        match self {
            Self::HomeUnknown | Self::PathTooLong { .. } | Self::Open { .. } => TRY_AGAIN,
            Self::NotFound => NO_ADDRESS,
            Self::BufferTooSmall(_) | Self::UnsupportedFamily(_) => NETDB_INTERNAL,
        }
    }
}

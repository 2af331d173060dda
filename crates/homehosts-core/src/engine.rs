//! Lookup engine.
//!
//! ```text
//! Init --(HOME, path, read)--> Scanning --(match + stop rule)--> Found
//!   |                             |--(EOF, no address)---------> Exhausted
//!   `--> SoftError                `--(builder full)------------> BufferError
//! ```
//!
//! The file is read into memory in one go and the handle dropped before scanning
//! starts, so no error path can leak it. [`resolve`] is the pure part of the engine
//! and works on any byte slice.

use std::ffi::OsStr;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::LookupError;
use crate::hostconf::HostConf;
use crate::hostent::{HostentBuilder, HostentLayout};
use crate::inet::{AddressFamily, HostAddr};
use crate::matcher::RecordMatcher;
use crate::scanner::LineScanner;

/// Longest path (including the terminating NUL) the C library accepts.
pub const PATH_MAX: usize = 4096;

/// Per-user file name under `$HOME`.
pub const HOSTS_FILE_NAME: &str = ".hosts";

/// Location of a hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    /// An explicit path, used by tooling and tests.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<home>/.hosts`, rejected if it would not fit in `PATH_MAX`.
    pub fn in_home(home: &Path) -> Result<Self, LookupError> {
        let path = home.join(HOSTS_FILE_NAME);
        let len = path.as_os_str().len();
        if len >= PATH_MAX {
            return Err(LookupError::PathTooLong {
                len,
                limit: PATH_MAX,
            });
        }
        Ok(Self { path })
    }

    /// `$HOME/.hosts` for the calling process.
    pub fn from_home() -> Result<Self, LookupError> {
        Self::from_home_dir(std::env::var_os("HOME").as_deref())
    }

    /// `<home>/.hosts` for a raw `HOME` value; unset or empty is `HomeUnknown`.
    pub fn from_home_dir(home: Option<&OsStr>) -> Result<Self, LookupError> {
        let home = home
            .filter(|h| !h.is_empty())
            .ok_or(LookupError::HomeUnknown)?;
        Self::in_home(Path::new(home))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file. The handle is closed when this returns.
    pub fn load(&self) -> Result<Vec<u8>, LookupError> {
        let open_err = |source| LookupError::Open {
            path: self.path.clone(),
            source,
        };
        let mut file = File::open(&self.path).map_err(open_err)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(open_err)?;
        Ok(contents)
    }
}

/// Read-only inputs to a lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupConfig {
    /// host.conf `multi`: keep scanning by-name lookups after the first matching line.
    pub multi: bool,
}

impl LookupConfig {
    #[must_use]
    pub fn from_system() -> Self {
        HostConf::load_system().into()
    }
}

impl From<HostConf> for LookupConfig {
    fn from(conf: HostConf) -> Self {
        Self { multi: conf.multi }
    }
}

/// What is being looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'q> {
    ByName {
        name: &'q [u8],
        family: AddressFamily,
    },
    ByAddress(HostAddr),
}

impl<'q> Query<'q> {
    #[must_use]
    pub fn family(&self) -> AddressFamily {
        match self {
            Self::ByName { family, .. } => *family,
            Self::ByAddress(addr) => addr.family(),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&'q [u8]> {
        match self {
            Self::ByName { name, .. } => Some(*name),
            Self::ByAddress(_) => None,
        }
    }

    #[must_use]
    pub fn is_by_address(&self) -> bool {
        matches!(self, Self::ByAddress(_))
    }
}

/// Run `query` over already-loaded hosts file contents, packing into `buf`.
///
/// A query name that does not fit in `buf` is only reported once a matching line
/// exists; with no match the answer is `NotFound` whatever the buffer size.
pub fn resolve(
    contents: &[u8],
    query: &Query<'_>,
    config: &LookupConfig,
    buf: &mut [u8],
) -> Result<HostentLayout, LookupError> {
    let mut builder = HostentBuilder::new(buf, query.family());
    let mut deferred = None;
    if let Some(name) = query.name()
        && let Err(full) = builder.set_query_echo(name)
    {
        deferred = Some(full);
    }

    let matcher = RecordMatcher::new(*query);
    let mut scanner = LineScanner::new(contents);
    while let Some(token) = scanner.next_record_token() {
        if !token.starts_with(b"#") {
            matcher.scan_record(token, &mut scanner, &mut builder)?;
        }
        scanner.skip_line();

        if builder.address_count() > 0
            && (query.is_by_address() || !config.multi || deferred.is_some())
        {
            break;
        }
    }

    if builder.address_count() == 0 {
        return Err(LookupError::NotFound);
    }
    if let Some(full) = deferred {
        return Err(full.into());
    }
    Ok(builder.finalize()?)
}

/// Map a raw `AF_*` value, rejecting families a hosts file cannot hold.
pub fn family_from_raw(af: i32) -> Result<AddressFamily, LookupError> {
    AddressFamily::from_raw(af).ok_or(LookupError::UnsupportedFamily(af))
}

pub fn lookup_by_name(
    file: &HostsFile,
    name: &[u8],
    family: AddressFamily,
    config: &LookupConfig,
    buf: &mut [u8],
) -> Result<HostentLayout, LookupError> {
    let contents = file.load()?;
    resolve(&contents, &Query::ByName { name, family }, config, buf)
}

pub fn lookup_by_address(
    file: &HostsFile,
    addr: &HostAddr,
    config: &LookupConfig,
    buf: &mut [u8],
) -> Result<HostentLayout, LookupError> {
    let contents = file.load()?;
    resolve(&contents, &Query::ByAddress(*addr), config, buf)
}

/// IPv6 first, then a second full scan for IPv4 if (and only if) that was NotFound.
pub fn lookup_by_name_any_family(
    file: &HostsFile,
    name: &[u8],
    config: &LookupConfig,
    buf: &mut [u8],
) -> Result<HostentLayout, LookupError> {
    let contents = file.load()?;
    resolve_any_family(&contents, name, config, buf)
}

/// [`lookup_by_name_any_family`] over already-loaded contents.
pub fn resolve_any_family(
    contents: &[u8],
    name: &[u8],
    config: &LookupConfig,
    buf: &mut [u8],
) -> Result<HostentLayout, LookupError> {
    for family in [AddressFamily::Inet6, AddressFamily::Inet] {
        match resolve(contents, &Query::ByName { name, family }, config, buf) {
            Err(LookupError::NotFound) => continue,
            other => return other,
        }
    }
    Err(LookupError::NotFound)
}

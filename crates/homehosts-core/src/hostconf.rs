//! /etc/host.conf reader.
//!
//! Only the `multi` directive affects this backend. The other resolver(5)
//! host.conf keywords are recognised and ignored.
//!
//! # Environment
//!
//! - `RESOLV_HOST_CONF`: alternate path for the file.
//! - `RESOLV_MULTI`: `on`/`off`, overrides whatever the file says.

use std::path::{Path, PathBuf};

/// Default location of the system file.
pub const HOST_CONF_PATH: &str = "/etc/host.conf";
/// Environment variable naming an alternate host.conf.
pub const ENV_HOST_CONF: &str = "RESOLV_HOST_CONF";
/// Environment variable overriding the `multi` setting.
pub const ENV_MULTI: &str = "RESOLV_MULTI";

/// Parsed host.conf settings relevant to hosts-file lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostConf {
    /// Return every matching address instead of only the first line's.
    pub multi: bool,
}

impl HostConf {
    /// Parse host.conf content. Later `multi` lines override earlier ones.
    #[must_use]
    pub fn parse(content: &[u8]) -> Self {
        let mut conf = Self::default();
        for line in content.split(|&b| b == b'\n') {
            conf.parse_line(line);
        }
        conf
    }

    fn parse_line(&mut self, line: &[u8]) {
        let line = trim_whitespace(strip_comment(line));
        if line.is_empty() {
            return;
        }

        let mut parts = line
            .split(|&b| b == b' ' || b == b'\t' || b == b',')
            .filter(|p| !p.is_empty());

        let Some(keyword) = parts.next() else {
            return;
        };

        match keyword {
            b"multi" => {
                if let Some(value) = parts.next().and_then(parse_switch) {
                    self.multi = value;
                }
            }
            b"order" | b"trim" | b"reorder" | b"nospoof" | b"spoofalert" | b"spoof" => {}
            _ => {
                // Unknown directive, ignore
            }
        }
    }

    /// Apply a `RESOLV_MULTI` value. Unrecognised values leave the setting alone.
    #[must_use]
    pub fn apply_env_override(mut self, value: Option<&str>) -> Self {
        if let Some(v) = value.and_then(|v| parse_switch(v.trim().as_bytes())) {
            self.multi = v;
        }
        self
    }

    /// Read a host.conf file. A missing or unreadable file yields the defaults.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::parse(&bytes),
            Err(_) => Self::default(),
        }
    }

    /// Resolve the process configuration from the system file and environment.
    #[must_use]
    pub fn load_system() -> Self {
        let path = std::env::var_os(ENV_HOST_CONF)
            .filter(|p| !p.is_empty())
            .map_or_else(|| PathBuf::from(HOST_CONF_PATH), PathBuf::from);
        let multi = std::env::var(ENV_MULTI).ok();
        Self::load(&path).apply_env_override(multi.as_deref())
    }
}

fn parse_switch(value: &[u8]) -> Option<bool> {
    if value.eq_ignore_ascii_case(b"on") {
        Some(true)
    } else if value.eq_ignore_ascii_case(b"off") {
        Some(false)
    } else {
        None
    }
}

fn strip_comment(line: &[u8]) -> &[u8] {
    match line.iter().position(|&b| b == b'#') {
        Some(i) => &line[..i],
        None => line,
    }
}

fn trim_whitespace(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(s.len());
    let end = s
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &s[start..end]
}

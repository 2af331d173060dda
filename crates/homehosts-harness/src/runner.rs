//! Lookup execution and fixture verification.

use std::time::Instant;

use serde::Serialize;

use homehosts_core::arena::PTR_ALIGN;
use homehosts_core::error::NssStatus;
use homehosts_core::inet::parse_addr;
use homehosts_core::{
    AddressFamily, HostentLayout, HostentView, HostsFile, LookupConfig, LookupError, Query,
    resolve, resolve_any_family,
};

use crate::error::HarnessError;
use crate::fixtures::{Expectation, FamilySpec, FixtureCase, FixtureSet, QuerySpec};

/// Largest caller buffer the harness will allocate.
pub const MAX_BUFLEN: usize = 1 << 20;

/// Caller buffer whose first byte is pointer-aligned, so dumps are reproducible.
#[derive(Debug)]
pub struct ScratchBuffer {
    storage: Vec<u8>,
    start: usize,
    len: usize,
}

impl ScratchBuffer {
    pub fn new(len: usize) -> Result<Self, HarnessError> {
        if len > MAX_BUFLEN {
            return Err(HarnessError::BufferTooLarge {
                len,
                max: MAX_BUFLEN,
            });
        }
        let storage = vec![0u8; len + PTR_ALIGN];
        let start = storage.as_ptr().align_offset(PTR_ALIGN).min(PTR_ALIGN);
        Ok(Self {
            storage,
            start,
            len,
        })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.start..self.start + self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.start + self.len]
    }
}

/// Decoded result of one lookup, in the shape tooling reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupOutcome {
    /// NSS status name.
    pub status: String,
    pub errno: i32,
    pub h_errno: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub addresses: Vec<String>,
    pub aliases: Vec<String>,
    pub buflen: usize,
    #[serde(skip)]
    pub latency_ns: u64,
}

impl LookupOutcome {
    fn from_error(err: &LookupError, buflen: usize, latency_ns: u64) -> Self {
        Self {
            status: err.status().name().to_string(),
            errno: err.errno(),
            h_errno: err.h_errno(),
            error: Some(err.to_string()),
            family: None,
            name: None,
            addresses: Vec::new(),
            aliases: Vec::new(),
            buflen,
            latency_ns,
        }
    }

    fn from_view(view: &HostentView, buflen: usize, latency_ns: u64) -> Self {
        Self {
            status: NssStatus::Success.name().to_string(),
            errno: 0,
            h_errno: 0,
            error: None,
            family: Some(view.family.name().to_string()),
            name: view.name_lossy(),
            addresses: view.addresses.iter().map(ToString::to_string).collect(),
            aliases: view.aliases_lossy(),
            buflen,
            latency_ns,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == NssStatus::Success.name()
    }
}

enum Plan<'a> {
    Single(Query<'a>),
    AnyFamily(&'a [u8]),
}

fn plan(spec: &QuerySpec) -> Result<Plan<'_>, HarnessError> {
    match spec {
        QuerySpec::Name { name, family } => {
            let name = name.as_bytes();
            Ok(match family {
                FamilySpec::Inet => Plan::Single(Query::ByName {
                    name,
                    family: AddressFamily::Inet,
                }),
                FamilySpec::Inet6 => Plan::Single(Query::ByName {
                    name,
                    family: AddressFamily::Inet6,
                }),
                FamilySpec::Any => Plan::AnyFamily(name),
            })
        }
        QuerySpec::Address { addr } => parse_addr(addr.as_bytes())
            .map(|a| Plan::Single(Query::ByAddress(a)))
            .ok_or_else(|| HarnessError::InvalidAddress(addr.clone())),
    }
}

/// Run `spec` over hosts contents, packing into `buf`.
///
/// Returns the decoded outcome and, on success, the raw layout for dumping.
pub fn run_lookup(
    contents: &[u8],
    spec: &QuerySpec,
    multi: bool,
    buf: &mut [u8],
) -> Result<(LookupOutcome, Option<HostentLayout>), HarnessError> {
    let plan = plan(spec)?;
    let config = LookupConfig { multi };
    let started = Instant::now();
    let result = match plan {
        Plan::Single(query) => resolve(contents, &query, &config, buf),
        Plan::AnyFamily(name) => resolve_any_family(contents, name, &config, buf),
    };
    let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

    Ok(match result {
        Ok(layout) => {
            let view = HostentView::decode(buf, &layout)
                .ok_or_else(|| std::io::Error::other("packed buffer failed to decode"))?;
            (
                LookupOutcome::from_view(&view, buf.len(), latency_ns),
                Some(layout),
            )
        }
        Err(err) => (LookupOutcome::from_error(&err, buf.len(), latency_ns), None),
    })
}

/// Same as [`run_lookup`] but reads the hosts file first. Read failures are reported
/// as a soft-error outcome, exactly as the NSS module would see them.
pub fn run_file_lookup(
    file: &HostsFile,
    spec: &QuerySpec,
    multi: bool,
    buf: &mut [u8],
) -> Result<(LookupOutcome, Option<HostentLayout>), HarnessError> {
    match file.load() {
        Ok(contents) => run_lookup(&contents, spec, multi, buf),
        Err(err) => {
            plan(spec)?;
            Ok((LookupOutcome::from_error(&err, buf.len(), 0), None))
        }
    }
}

/// Result of one fixture case.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Expectation,
    pub actual: LookupOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the verification campaign.
    pub campaign: String,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set.cases.iter().map(run_case).collect()
    }
}

fn run_case(case: &FixtureCase) -> VerificationResult {
    let actual = ScratchBuffer::new(case.buflen).and_then(|mut scratch| {
        run_lookup(
            case.hosts.as_bytes(),
            &case.query,
            case.multi,
            scratch.as_mut_slice(),
        )
    });
    let actual = match actual {
        Ok((outcome, _)) => outcome,
        Err(err) => LookupOutcome {
            status: "ERROR".to_string(),
            errno: 0,
            h_errno: 0,
            error: Some(err.to_string()),
            family: None,
            name: None,
            addresses: Vec::new(),
            aliases: Vec::new(),
            buflen: case.buflen,
            latency_ns: 0,
        },
    };
    let diff = compare(&case.expected, &actual);
    VerificationResult {
        case_name: case.name.clone(),
        passed: diff.is_none(),
        expected: case.expected.clone(),
        actual,
        diff,
    }
}

/// Describe every mismatch between `expected` and `actual`, or `None` if they agree.
#[must_use]
pub fn compare(expected: &Expectation, actual: &LookupOutcome) -> Option<String> {
    let mut notes = Vec::new();
    if !expected.status.eq_ignore_ascii_case(&actual.status) {
        notes.push(format!(
            "status: expected={} actual={}",
            expected.status, actual.status
        ));
    }
    if let Some(errno) = expected.errno
        && errno != actual.errno
    {
        notes.push(format!("errno: expected={errno} actual={}", actual.errno));
    }
    if actual.is_success() {
        if expected.name != actual.name {
            notes.push(format!(
                "name: expected={:?} actual={:?}",
                expected.name, actual.name
            ));
        }
        if expected.addresses != actual.addresses {
            notes.push(format!(
                "addresses: expected={:?} actual={:?}",
                expected.addresses, actual.addresses
            ));
        }
        if expected.aliases != actual.aliases {
            notes.push(format!(
                "aliases: expected={:?} actual={:?}",
                expected.aliases, actual.aliases
            ));
        }
    }
    if notes.is_empty() {
        None
    } else {
        Some(notes.join("\n"))
    }
}

/// Machine-readable verification report.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub campaign: String,
    pub fixture: String,
    pub fixture_sha256: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerifyReport {
    #[must_use]
    pub fn new(
        campaign: impl Into<String>,
        fixture: impl Into<String>,
        fixture_sha256: impl Into<String>,
        results: Vec<VerificationResult>,
    ) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            campaign: campaign.into(),
            fixture: fixture.into(),
            fixture_sha256: fixture_sha256.into(),
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

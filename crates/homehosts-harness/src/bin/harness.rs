//! CLI entrypoint for the homehosts tooling harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use homehosts_core::{HostsFile, LookupConfig};
use homehosts_harness::dump;
use homehosts_harness::fixtures::{FamilySpec, QuerySpec};
use homehosts_harness::runner::{ScratchBuffer, run_file_lookup};
use homehosts_harness::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use homehosts_harness::{FixtureSet, HarnessError, TestRunner, VerifyReport};

/// Lookup and fixture tooling for the per-user hosts backend.
#[derive(Debug, Parser)]
#[command(name = "homehosts-harness")]
#[command(about = "Lookup and verification harness for the ~/.hosts NSS backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FamilyArg {
    Inet,
    Inet6,
    Any,
}

impl From<FamilyArg> for FamilySpec {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Inet => Self::Inet,
            FamilyArg::Inet6 => Self::Inet6,
            FamilyArg::Any => Self::Any,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve one name or address and print the decoded result as JSON.
    Lookup {
        /// Host name to resolve.
        #[arg(long, conflicts_with = "addr", required_unless_present = "addr")]
        name: Option<String>,
        /// Address literal for a reverse lookup.
        #[arg(long)]
        addr: Option<String>,
        /// Address family for name lookups.
        #[arg(long, value_enum, default_value = "any")]
        family: FamilyArg,
        /// Hosts file to read (defaults to `$HOME/.hosts`).
        #[arg(long)]
        hosts_file: Option<PathBuf>,
        /// Override the host.conf `multi` setting.
        #[arg(long, value_enum)]
        multi: Option<Switch>,
        /// Caller buffer size in bytes.
        #[arg(long, default_value_t = 1024)]
        buflen: usize,
        /// Write a JSONL record for this lookup.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Print a hex dump of the packed buffer to stderr.
        #[arg(long)]
        dump: bool,
    },
    /// Replay a fixture set through the engine.
    Verify {
        /// Fixture JSON file.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (JSON).
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL log path, one record per case.
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

fn run_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{}-{nanos:x}", std::process::id())
}

#[allow(clippy::too_many_arguments)]
fn lookup(
    name: Option<String>,
    addr: Option<String>,
    family: FamilyArg,
    hosts_file: Option<PathBuf>,
    multi: Option<Switch>,
    buflen: usize,
    log: Option<PathBuf>,
    dump_buffer: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let spec = match (name, addr) {
        (Some(name), _) => QuerySpec::Name {
            name,
            family: family.into(),
        },
        (None, Some(addr)) => QuerySpec::Address { addr },
        (None, None) => return Err("one of --name or --addr is required".into()),
    };
    let file = match hosts_file {
        Some(path) => HostsFile::at(path),
        None => HostsFile::from_home()?,
    };
    let multi = match multi {
        Some(Switch::On) => true,
        Some(Switch::Off) => false,
        None => LookupConfig::from_system().multi,
    };

    let mut scratch = ScratchBuffer::new(buflen)?;
    let (outcome, layout) = run_file_lookup(&file, &spec, multi, scratch.as_mut_slice())?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if dump_buffer {
        eprint!("{}", dump::render(scratch.as_slice(), layout.as_ref()));
    }

    if let Some(path) = log {
        let query = match &spec {
            QuerySpec::Name { name, .. } => name.clone(),
            QuerySpec::Address { addr } => addr.clone(),
        };
        let mut emitter = LogEmitter::to_file(&path, &run_id())?;
        let entry = LogEntry::new("", LogLevel::Info, "lookup")
            .with_query(query)
            .with_lookup(&outcome)
            .with_details(serde_json::json!({
                "hosts_file": file.path().display().to_string(),
                "multi": multi,
            }));
        emitter.emit_entry(entry)?;
        emitter.flush()?;
    }
    Ok(())
}

fn verify(
    fixture: PathBuf,
    report: Option<PathBuf>,
    log: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Verifying against fixture {}", fixture.display());
    let (set, digest) = FixtureSet::load_with_digest(&fixture)?;
    let runner = TestRunner::new("homehosts-verify");
    let results = runner.run(&set);

    let mut emitter = match &log {
        Some(path) => Some(LogEmitter::to_file(path, &run_id())?),
        None => None,
    };
    for (case, result) in set.cases.iter().zip(&results) {
        let mark = if result.passed { "PASS" } else { "FAIL" };
        println!("[{mark}] {}", result.case_name);
        if let Some(diff) = &result.diff {
            for line in diff.lines() {
                println!("       {line}");
            }
        }
        if let Some(emitter) = emitter.as_mut() {
            let query = match &case.query {
                QuerySpec::Name { name, .. } => name.clone(),
                QuerySpec::Address { addr } => addr.clone(),
            };
            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Warn, Outcome::Fail)
            };
            let entry = LogEntry::new("", level, "fixture_case")
                .with_query(query)
                .with_lookup(&result.actual)
                .with_outcome(outcome)
                .with_details(serde_json::json!({ "case": result.case_name }));
            emitter.emit_entry(entry)?;
        }
    }
    if let Some(emitter) = emitter.as_mut() {
        emitter.flush()?;
    }

    let summary = VerifyReport::new(
        runner.campaign.clone(),
        fixture.display().to_string(),
        digest,
        results,
    );
    println!(
        "{} passed, {} failed, {} total (sha256 {})",
        summary.passed, summary.failed, summary.total, summary.fixture_sha256
    );
    if let Some(path) = report {
        std::fs::write(&path, summary.to_json()?)?;
        eprintln!("Report written to {}", path.display());
    }
    if !summary.all_passed() {
        return Err(HarnessError::VerificationFailed {
            failed: summary.failed,
            total: summary.total,
        }
        .into());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Lookup {
            name,
            addr,
            family,
            hosts_file,
            multi,
            buflen,
            log,
            dump,
        } => lookup(name, addr, family, hosts_file, multi, buflen, log, dump),
        Command::Verify {
            fixture,
            report,
            log,
        } => verify(fixture, report, log),
    }
}

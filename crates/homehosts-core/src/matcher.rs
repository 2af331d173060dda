//! Per-line record matching.
//!
//! The engine hands the matcher one record at a time: the address token it has just
//! read, plus a scanner positioned on the first name token of that line. On a match
//! the matcher feeds the builder (address first, then names) before returning; the
//! engine then moves to the next line.

use crate::arena::ArenaFull;
use crate::engine::Query;
use crate::hostent::HostentBuilder;
use crate::inet::{HostAddr, parse_addr_in};
use crate::scanner::LineScanner;

/// Result of offering one line to the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Line did not match; nothing was written.
    Skipped,
    /// Line matched; its address and names are now in the builder.
    Matched,
}

/// Case-insensitive host name comparison (ASCII only).
#[inline]
#[must_use]
pub fn names_equal(a: &[u8], b: &[u8]) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[derive(Debug, Clone, Copy)]
pub struct RecordMatcher<'q> {
    query: Query<'q>,
}

impl<'q> RecordMatcher<'q> {
    #[must_use]
    pub fn new(query: Query<'q>) -> Self {
        Self { query }
    }

    /// Test the line whose address column is `addr_token`.
    ///
    /// Malformed or wrong-family addresses are a plain [`LineOutcome::Skipped`]. The
    /// only error is builder exhaustion.
    pub fn scan_record(
        &self,
        addr_token: &[u8],
        scanner: &mut LineScanner<'_>,
        builder: &mut HostentBuilder<'_>,
    ) -> Result<LineOutcome, ArenaFull> {
        match self.query {
            Query::ByName { name, family } => {
                let start = scanner.mark();
                while let Some(token) = scanner.next_name() {
                    if names_equal(token.text, name) {
                        let Some(addr) = parse_addr_in(addr_token, family) else {
                            return Ok(LineOutcome::Skipped);
                        };
                        builder.add_address(&addr)?;
                        scanner.rewind(start);
                        self.collect_aliases(scanner, builder)?;
                        return Ok(LineOutcome::Matched);
                    }
                    if token.line_ended {
                        break;
                    }
                }
                Ok(LineOutcome::Skipped)
            }
            Query::ByAddress(target) => {
                if !address_matches(addr_token, &target) {
                    return Ok(LineOutcome::Skipped);
                }
                // A line with no names still matches; `h_name` then stays NULL.
                builder.add_address(&target)?;
                self.collect_aliases(scanner, builder)?;
                Ok(LineOutcome::Matched)
            }
        }
    }

    /// Walk the remaining name tokens of a matched line.
    ///
    /// The query name is dropped, the first other name fills an empty canonical slot,
    /// everything else becomes an alias.
    pub fn collect_aliases(
        &self,
        scanner: &mut LineScanner<'_>,
        builder: &mut HostentBuilder<'_>,
    ) -> Result<(), ArenaFull> {
        let query_name = self.query.name();
        while let Some(token) = scanner.next_name() {
            if query_name.is_some_and(|q| names_equal(token.text, q)) {
                // query echo already holds it
            } else if !builder.has_canonical() {
                builder.set_canonical(token.text)?;
            } else {
                builder.add_alias(token.text)?;
            }
            if token.line_ended {
                break;
            }
        }
        Ok(())
    }
}

fn address_matches(token: &[u8], target: &HostAddr) -> bool {
    parse_addr_in(token, target.family()).is_some_and(|addr| addr == *target)
}

// SPDX-License-Identifier: MIT

//! Version comparison (spec §4.7 "Versioning comparison").
//!
//! Open question resolved in DESIGN.md: versions are compared by
//! `major.minor.patch` triples, leading `v` tolerated, non-numeric parts
//! treated as `0`. Pre-release suffixes (`-beta.1`) are dropped before
//! parsing the patch component rather than compared, matching spec.md's
//! explicit statement that this is "stringy" and under-specified.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTriple(pub u64, pub u64, pub u64);

/// Parse a version string into a comparable triple. Tolerates a leading
/// `v`/`V` and drops anything after a `-` (pre-release) or `+` (build
/// metadata) suffix on the patch component.
pub fn parse(version: &str) -> VersionTriple {
    let trimmed = version.trim().trim_start_matches(['v', 'V']);
    let mut parts = trimmed.splitn(3, '.');
    let major = numeric_prefix(parts.next().unwrap_or(""));
    let minor = numeric_prefix(parts.next().unwrap_or(""));
    let patch = numeric_prefix(parts.next().unwrap_or(""));
    VersionTriple(major, minor, patch)
}

fn numeric_prefix(segment: &str) -> u64 {
    let cleaned = segment.split(['-', '+']).next().unwrap_or("");
    cleaned.parse().unwrap_or(0)
}

/// True if `candidate` is strictly newer than `current` (spec §4.7
/// "CheckForUpdates ... Returns the UpdateInfo only if strictly newer").
pub fn is_newer(candidate: &str, current: &str) -> bool {
    parse(candidate) > parse(current)
}

#[cfg(test)]
#[path = "versioning_tests.rs"]
mod tests;

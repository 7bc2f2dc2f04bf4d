//! Input validation for verification requests.
//!
//! Malformed keys are rejected before any state is touched, so a failed
//! precondition never leaves a partial record behind.

use shared_types::{VerificationError, VerificationResult};

/// Maximum length of a project identifier.
pub const MAX_PROJECT_ID_LEN: usize = 64;

/// Validate a project identifier: non-empty, at most
/// [`MAX_PROJECT_ID_LEN`] characters of `[A-Za-z0-9_-]`.
pub fn validate_project_id(project_id: &str) -> VerificationResult<()> {
    if project_id.is_empty() {
        return Err(VerificationError::InvalidInput(
            "project_id must not be empty".to_string(),
        ));
    }
    if project_id.len() > MAX_PROJECT_ID_LEN {
        return Err(VerificationError::InvalidInput(format!(
            "project_id exceeds {MAX_PROJECT_ID_LEN} characters"
        )));
    }
    if !project_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(VerificationError::InvalidInput(format!(
            "project_id contains invalid characters: {project_id}"
        )));
    }
    Ok(())
}

/// Validate a semantic version: `MAJOR.MINOR.PATCH[-pre][+build]`.
///
/// Numeric components must not carry leading zeros; pre-release and build
/// metadata are dot-separated `[0-9A-Za-z-]` identifiers.
pub fn validate_version(version: &str) -> VerificationResult<()> {
    let invalid = || VerificationError::InvalidInput(format!("invalid semantic version: {version}"));

    if version.is_empty() {
        return Err(VerificationError::InvalidInput(
            "version must not be empty".to_string(),
        ));
    }

    // Build metadata comes after the first `+`.
    let (rest, build) = match version.split_once('+') {
        Some((rest, build)) => (rest, Some(build)),
        None => (version, None),
    };
    // Pre-release comes after the first `-` in what remains; the
    // pre-release itself may contain further hyphens.
    let (core, pre) = match rest.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (rest, None),
    };

    let mut core_parts = core.split('.');
    for _ in 0..3 {
        let part = core_parts.next().ok_or_else(invalid)?;
        if !is_numeric_component(part) {
            return Err(invalid());
        }
    }
    if core_parts.next().is_some() {
        return Err(invalid());
    }

    if let Some(pre) = pre {
        for ident in pre.split('.') {
            if !is_prerelease_ident(ident) {
                return Err(invalid());
            }
        }
    }
    if let Some(build) = build {
        for ident in build.split('.') {
            if !is_metadata_ident(ident) {
                return Err(invalid());
            }
        }
    }
    Ok(())
}

/// `0` or a digit sequence without a leading zero.
fn is_numeric_component(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'))
}

/// Alphanumeric/hyphen identifier; purely numeric ones must not carry a
/// leading zero.
fn is_prerelease_ident(s: &str) -> bool {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return false;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s == "0" || !s.starts_with('0');
    }
    true
}

/// Alphanumeric/hyphen identifier; leading zeros are allowed in build
/// metadata.
fn is_metadata_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

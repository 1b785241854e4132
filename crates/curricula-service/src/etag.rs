//! ETag computation for plans.
//!
//! ETags are SHA-256 hashes over the canonical JSON form of the plan. Any
//! change to semesters, subjects, their order or their record ids changes
//! the tag.

use curricula_core::plan::CurricularPlan;
use sha2::{Digest, Sha256};

/// Compute a quoted ETag for `plan`.
pub fn compute_etag(plan: &CurricularPlan) -> serde_json::Result<String> {
  let bytes = serde_json::to_vec(plan)?;
  let hash = Sha256::digest(&bytes);
  Ok(format!("\"{}\"", hex::encode(hash)))
}

/// Compare an `If-Match` value against a computed tag. Accepts quoted or
/// bare tags, and `*`.
pub fn etag_matches(current: &str, if_match: &str) -> bool {
  let if_match = if_match.trim();
  if_match == "*" || strip_etag_quotes(current) == strip_etag_quotes(if_match)
}

fn strip_etag_quotes(tag: &str) -> &str {
  tag.trim().trim_start_matches("W/").trim_matches('"')
}

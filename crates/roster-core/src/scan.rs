//! Scan-to-lookup boundary.
//!
//! The capture side (camera, optical-code decoding) lives outside the core.
//! It hands over an opaque string; unreadable or foreign scans simply yield
//! no identifier.

/// Literal prefix of every stored lookup key.
pub const SCAN_PREFIX: &str = "RECORDTAG:";

/// Strip [`SCAN_PREFIX`] from a scanned token and return the identifier.
pub fn extract_record_id(scanned: &str) -> Option<String> {
  scanned
    .trim()
    .strip_prefix(SCAN_PREFIX)
    .filter(|id| !id.is_empty())
    .map(str::to_owned)
}

/// Whether `scanned` looks like one of our lookup keys.
pub fn is_record_tag(scanned: &str) -> bool { extract_record_id(scanned).is_some() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_identifier() {
    assert_eq!(extract_record_id("RECORDTAG:abc-123").as_deref(), Some("abc-123"));
    assert_eq!(extract_record_id("  RECORDTAG:abc\n").as_deref(), Some("abc"));
  }

  #[test]
  fn noise_yields_nothing() {
    assert_eq!(extract_record_id(""), None);
    assert_eq!(extract_record_id("RECORDTAG:"), None);
    assert_eq!(extract_record_id("https://example.com"), None);
    assert!(!is_record_tag("recordtag:abc"));
  }
}

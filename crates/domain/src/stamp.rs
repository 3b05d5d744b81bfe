//! Integrity stamper — the short content-derived token appended to
//! official bot replies.
//!
//! A stamp is `"0x"` plus the first 10 hex characters of
//! `sha256(content ‖ millis)`. The timestamp is part of the input, so two
//! stamps over identical content differ when generated at different
//! instants: stamps are tamper-evidence markers, not lookup keys, and
//! cannot be reversed to the content.
//!
//! Verification is purely structural (prefix + length). No registry of
//! issued stamps exists, so a well-formed but never-issued stamp verifies
//! as valid. Deliberate MVP simplification, kept as-is.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Total stamp length: `0x` plus 10 hex characters.
pub const STAMP_LEN: usize = 12;

/// Generate a stamp for `content` at the current instant.
pub fn generate_stamp(content: &str) -> String {
    generate_stamp_at(content, Utc::now())
}

/// Generate a stamp for `content` at an explicit instant (test seam).
pub fn generate_stamp_at(content: &str, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.update(at.timestamp_millis().to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("0x{}", &digest[..STAMP_LEN - 2])
}

/// Structural validity check: starts with `0x` and has the expected total
/// length. Nothing else — see the module docs.
pub fn verify_stamp(stamp: &str) -> bool {
    stamp.starts_with("0x") && stamp.len() == STAMP_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn is_hex(s: &str) -> bool {
        s.bytes().all(|b| b.is_ascii_hexdigit())
    }

    #[test]
    fn stamp_has_expected_shape() {
        let stamp = generate_stamp("Drink fluids and rest.");
        assert_eq!(stamp.len(), STAMP_LEN);
        assert!(stamp.starts_with("0x"));
        assert!(is_hex(&stamp[2..]));
        // hex::encode produces lowercase digits.
        assert_eq!(stamp, stamp.to_lowercase());
    }

    #[test]
    fn same_content_different_instants_differ() {
        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t2 = t1 + chrono::Duration::milliseconds(1);
        assert_ne!(
            generate_stamp_at("same content", t1),
            generate_stamp_at("same content", t2)
        );
    }

    #[test]
    fn same_content_same_instant_is_deterministic() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            generate_stamp_at("same content", t),
            generate_stamp_at("same content", t)
        );
    }

    #[test]
    fn verify_accepts_generated_stamps() {
        assert!(verify_stamp(&generate_stamp("anything")));
    }

    #[test]
    fn verify_rejects_wrong_prefix_or_length() {
        assert!(!verify_stamp(""));
        assert!(!verify_stamp("0x"));
        assert!(!verify_stamp("1234567890ab"));
        assert!(!verify_stamp("0x12345678"));
        assert!(!verify_stamp("0x1234567890ab"));
    }

    #[test]
    fn verify_is_structural_only() {
        // Never issued by this process and not even hex, yet it verifies.
        // Known design weakness, preserved on purpose.
        assert!(verify_stamp("0xZZZZZZZZZZ"));
    }
}

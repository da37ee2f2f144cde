//! Codec for Xcode's undocumented 24-hex-character identifier scheme.
//!
//! Layout (hex digits): user(2) pid(2) random(4) time(8) zero(2)
//! host_shift(2) host_h(2) host_l(2).
//! Based on: https://pewpewthespells.com/blog/pbxproj_identifiers.html

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds between the Unix epoch and Apple's reference date (2001-01-01).
const APPLE_EPOCH_OFFSET: u64 = 978_307_200;

/// A decoded 24-hex-character pbxproj object identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PBXIdentifier {
    user: u8,
    pid: u8,
    random: u16,
    time: u32,
    zero: u8,
    host_shift: u8,
    host_h: u8,
    host_l: u8,
}

impl PBXIdentifier {
    /// Parse a 24-character hex string into its sub-fields.
    ///
    /// Returns `None` if the string is not exactly 24 hex digits.
    pub fn parse(string_value: &str) -> Option<Self> {
        if string_value.len() != 24 || !string_value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        Some(Self {
            user: hex_u8(string_value, 0)?,
            pid: hex_u8(string_value, 2)?,
            random: hex_u16(string_value, 4)?,
            time: hex_u32(string_value, 8)?,
            zero: hex_u8(string_value, 16)?,
            host_shift: hex_u8(string_value, 18)?,
            host_h: hex_u8(string_value, 20)?,
            host_l: hex_u8(string_value, 22)?,
        })
    }

    /// Re-encode as the canonical uppercase 24-character hex string.
    pub fn string_value(&self) -> String {
        format!(
            "{:02X}{:02X}{:04X}{:08X}{:02X}{:02X}{:02X}{:02X}",
            self.user,
            self.pid,
            self.random,
            self.time,
            self.zero,
            self.host_shift,
            self.host_h,
            self.host_l
        )
    }

    /// Derive a new identifier from this one by substituting the current
    /// timestamp and a fresh random value. The host/user/pid bytes are kept,
    /// so minted identifiers still look like they came from the same machine.
    pub fn create_fresh_identifier(&self) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let uuid = uuid::Uuid::new_v4();
        let bytes = uuid.as_bytes();

        Self {
            time: now.saturating_sub(APPLE_EPOCH_OFFSET) as u32,
            random: u16::from_be_bytes([bytes[0], bytes[1]]),
            ..*self
        }
    }
}

fn hex_u8(s: &str, at: usize) -> Option<u8> {
    u8::from_str_radix(s.get(at..at + 2)?, 16).ok()
}

fn hex_u16(s: &str, at: usize) -> Option<u16> {
    u16::from_str_radix(s.get(at..at + 4)?, 16).ok()
}

fn hex_u32(s: &str, at: usize) -> Option<u32> {
    u32::from_str_radix(s.get(at..at + 8)?, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn round_trips_uppercase_identifiers() {
        let input = "8B0A20D31D3FD1FF00E67113";
        let id = PBXIdentifier::parse(input).expect("should parse");
        assert_eq!(id.string_value(), input);
    }

    #[rstest]
    #[case("")]
    #[case("8B0A20D31D3FD1FF00E6711")] // 23 chars
    #[case("8B0A20D31D3FD1FF00E671134")] // 25 chars
    #[case("8B0A20D31D3FD1FF00E6711G")] // non-hex
    #[case("not an identifier at all")]
    fn rejects_malformed_input(#[case] input: &str) {
        assert_eq!(PBXIdentifier::parse(input), None);
    }

    #[test]
    fn fresh_identifiers_differ_and_still_decode() {
        let seed = PBXIdentifier::parse("8B0A20D31D3FD1FF00E67113").expect("should parse");
        let a = seed.create_fresh_identifier();
        let b = seed.create_fresh_identifier();

        // The random component is 16 bits, so two mints in a row collide with
        // probability 2^-16; treat equality as failure.
        assert_ne!(a.string_value(), b.string_value());
        assert!(PBXIdentifier::parse(&a.string_value()).is_some());
        assert!(PBXIdentifier::parse(&b.string_value()).is_some());
    }

    #[test]
    fn fresh_identifier_keeps_host_bytes() {
        let seed = PBXIdentifier::parse("8B0A20D31D3FD1FF00E67113").expect("should parse");
        let fresh = seed.create_fresh_identifier();
        let s = fresh.string_value();

        // user, pid and the trailing host bytes are preserved
        assert_eq!(&s[0..4], "8B0A");
        assert_eq!(&s[16..24], "00E67113");
    }
}

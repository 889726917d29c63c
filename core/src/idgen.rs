// comanda_core/src/idgen.rs

//! Identifier generation.
//!
//! Tracking numbers combine a millisecond timestamp (base36) with a small
//! random suffix: practically unique without a central counter, and cheap
//! to read back over the phone. Payment references are plain UUIDs with no
//! timestamp component.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

pub const TRACKING_PREFIX: &str = "TK-";

/// Generates a tracking number of the form `TK-<millis base36>-<0..999>`.
pub fn tracking_number() -> String {
  let millis = Utc::now().timestamp_millis().max(0) as u64;
  let suffix: u16 = rand::thread_rng().gen_range(0..1000);
  format!("{}{}-{}", TRACKING_PREFIX, to_base36(millis), suffix)
}

/// Generates a unique payment reference token.
pub fn payment_reference() -> String {
  Uuid::new_v4().to_string()
}

fn to_base36(mut n: u64) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  if n == 0 {
    return "0".to_string();
  }
  let mut buf = [0u8; 13]; // u64::MAX in base36 is 13 digits
  let mut i = buf.len();
  while n > 0 {
    i -= 1;
    buf[i] = DIGITS[(n % 36) as usize];
    n /= 36;
  }
  String::from_utf8_lossy(&buf[i..]).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tracking_number_has_prefix_and_two_segments() {
    let tn = tracking_number();
    assert!(tn.starts_with(TRACKING_PREFIX));
    let rest = &tn[TRACKING_PREFIX.len()..];
    let parts: Vec<&str> = rest.split('-').collect();
    assert_eq!(parts.len(), 2, "expected timestamp and random segments: {}", tn);
    assert!(parts[0].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    let suffix: u32 = parts[1].parse().unwrap();
    assert!(suffix < 1000);
  }

  #[test]
  fn base36_encodes_known_values() {
    assert_eq!(to_base36(0), "0");
    assert_eq!(to_base36(35), "z");
    assert_eq!(to_base36(36), "10");
    assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
  }

  #[test]
  fn payment_references_are_unique_and_timestamp_free() {
    let a = payment_reference();
    let b = payment_reference();
    assert_ne!(a, b);
    assert!(Uuid::parse_str(&a).is_ok());
  }
}

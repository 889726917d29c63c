// comanda_core/src/signature.rs

//! Webhook signature verification.
//!
//! The gateway signs the raw request payload with a shared secret and
//! delivers the signature in a header of the form
//! `t=<unix seconds>,v1=<hex hmac-sha256>`. The signed message is
//! `"{t}.{payload}"`. Verification must succeed before any field of the
//! event is trusted; a stale timestamp is rejected to bound replays.

use crate::error::{EngineError, EngineResult};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted distance between the header timestamp and now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct SignatureVerifier {
  secret: String,
  tolerance_secs: i64,
}

impl SignatureVerifier {
  pub fn new(secret: impl Into<String>) -> Self {
    SignatureVerifier {
      secret: secret.into(),
      tolerance_secs: DEFAULT_TOLERANCE_SECS,
    }
  }

  pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
    self.tolerance_secs = tolerance_secs;
    self
  }

  pub fn verify(&self, payload: &[u8], signature_header: &str) -> EngineResult<()> {
    self.verify_at(payload, signature_header, Utc::now().timestamp())
  }

  /// Verification against an explicit clock, for tests.
  pub fn verify_at(&self, payload: &[u8], signature_header: &str, now_secs: i64) -> EngineResult<()> {
    let (timestamp, candidates) = parse_header(signature_header)?;

    if (now_secs - timestamp).abs() > self.tolerance_secs {
      return Err(EngineError::GatewaySignature(format!(
        "Timestamp outside tolerance: t={}, now={}",
        timestamp, now_secs
      )));
    }

    let mut signed = Vec::with_capacity(payload.len() + 16);
    signed.extend_from_slice(timestamp.to_string().as_bytes());
    signed.push(b'.');
    signed.extend_from_slice(payload);

    for candidate in &candidates {
      let Ok(sig_bytes) = hex::decode(candidate) else {
        continue;
      };
      let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
        .map_err(|e| EngineError::GatewaySignature(format!("Bad secret: {}", e)))?;
      mac.update(&signed);
      // verify_slice is a constant-time comparison.
      if mac.verify_slice(&sig_bytes).is_ok() {
        return Ok(());
      }
    }

    Err(EngineError::GatewaySignature("No matching v1 signature".to_string()))
  }
}

/// Produces a signature header for `payload` at `timestamp`. Used by tests
/// and by tooling that replays events against a local server.
pub fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any size");
  mac.update(timestamp.to_string().as_bytes());
  mac.update(b".");
  mac.update(payload);
  format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

fn parse_header(header: &str) -> EngineResult<(i64, Vec<String>)> {
  let mut timestamp: Option<i64> = None;
  let mut candidates = Vec::new();

  for element in header.split(',') {
    match element.trim().split_once('=') {
      Some(("t", value)) => {
        timestamp = value.parse::<i64>().ok();
      }
      Some(("v1", value)) => candidates.push(value.to_string()),
      _ => {} // unknown schemes (v0, ...) are ignored
    }
  }

  let timestamp =
    timestamp.ok_or_else(|| EngineError::GatewaySignature("Missing or malformed timestamp".to_string()))?;
  if candidates.is_empty() {
    return Err(EngineError::GatewaySignature("No v1 signature present".to_string()));
  }
  Ok((timestamp, candidates))
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "whsec_test123secret456";
  const PAYLOAD: &[u8] = b"{\"type\":\"checkout.session.completed\"}";

  #[test]
  fn accepts_a_valid_signature() {
    let now = 1_700_000_000;
    let header = sign(PAYLOAD, SECRET, now);
    let verifier = SignatureVerifier::new(SECRET);
    assert!(verifier.verify_at(PAYLOAD, &header, now).is_ok());
  }

  #[test]
  fn rejects_a_wrong_secret() {
    let now = 1_700_000_000;
    let header = sign(PAYLOAD, "wrong_secret", now);
    let verifier = SignatureVerifier::new(SECRET);
    assert!(verifier.verify_at(PAYLOAD, &header, now).is_err());
  }

  #[test]
  fn rejects_a_tampered_payload() {
    let now = 1_700_000_000;
    let header = sign(PAYLOAD, SECRET, now);
    let verifier = SignatureVerifier::new(SECRET);
    let tampered = b"{\"type\":\"checkout.session.completed\",\"x\":1}";
    assert!(verifier.verify_at(tampered, &header, now).is_err());
  }

  #[test]
  fn rejects_a_stale_timestamp() {
    let then = 1_700_000_000;
    let header = sign(PAYLOAD, SECRET, then);
    let verifier = SignatureVerifier::new(SECRET);
    // 10 minutes later, beyond the 5 minute tolerance.
    assert!(verifier.verify_at(PAYLOAD, &header, then + 600).is_err());
  }

  #[test]
  fn tolerance_is_configurable() {
    let then = 1_700_000_000;
    let header = sign(PAYLOAD, SECRET, then);
    let lenient = SignatureVerifier::new(SECRET).with_tolerance(3600);
    assert!(lenient.verify_at(PAYLOAD, &header, then + 600).is_ok());
  }

  #[test]
  fn rejects_malformed_headers() {
    let verifier = SignatureVerifier::new(SECRET);
    for header in ["", "v1=abcd", "t=notanumber,v1=abcd", "t=12345"] {
      assert!(verifier.verify_at(PAYLOAD, header, 12345).is_err(), "header {:?}", header);
    }
  }

  #[test]
  fn accepts_when_any_v1_candidate_matches() {
    let now = 1_700_000_000;
    let good = sign(PAYLOAD, SECRET, now);
    let good_sig = good.split("v1=").nth(1).unwrap();
    let header = format!("t={},v1={},v1={}", now, "00".repeat(32), good_sig);
    let verifier = SignatureVerifier::new(SECRET);
    assert!(verifier.verify_at(PAYLOAD, &header, now).is_ok());
  }
}

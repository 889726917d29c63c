// comanda_core/src/payment.rs

//! Standalone payment ledger records.
//!
//! These are independent of the inline payment fields on an order: a
//! payment may exist before any order (guest intent), or be created by the
//! gateway callback, and may link to an order by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRecordMethod {
  Card,
  Cash,
  Other,
}

impl PaymentRecordMethod {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentRecordMethod::Card => "card",
      PaymentRecordMethod::Cash => "cash",
      PaymentRecordMethod::Other => "other",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "card" => Some(PaymentRecordMethod::Card),
      "cash" => Some(PaymentRecordMethod::Cash),
      "other" => Some(PaymentRecordMethod::Other),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRecordStatus {
  Pending,
  Paid,
  Failed,
  Refunded,
}

impl PaymentRecordStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentRecordStatus::Pending => "pending",
      PaymentRecordStatus::Paid => "paid",
      PaymentRecordStatus::Failed => "failed",
      PaymentRecordStatus::Refunded => "refunded",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "pending" => Some(PaymentRecordStatus::Pending),
      "paid" => Some(PaymentRecordStatus::Paid),
      "failed" => Some(PaymentRecordStatus::Failed),
      "refunded" => Some(PaymentRecordStatus::Refunded),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerInfo {
  pub full_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
  pub id: Uuid,
  /// Unique token generated once at creation, independent of the gateway's
  /// own transaction identifier. The gateway callback upserts records keyed
  /// by the checkout session id instead.
  pub reference: String,
  pub payer: PayerInfo,
  pub amount_cents: i64,
  pub currency: String,
  pub method: PaymentRecordMethod,
  pub status: PaymentRecordStatus,
  /// A hosted-checkout session for this record may only be created after
  /// an administrator sets this.
  pub verified_by_admin: bool,
  pub transaction_id: Option<String>,
  pub paid_at: Option<DateTime<Utc>>,
  pub description: Option<String>,
  pub order_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Payment {
  /// Moves the record to `paid`. Idempotent: `transaction_id` and `paid_at`
  /// are set exactly once, and repeated calls change nothing further.
  /// Amount and currency are immutable from the first call on.
  pub fn mark_paid(&mut self, transaction_id: Option<&str>, now: DateTime<Utc>) {
    if self.status != PaymentRecordStatus::Paid {
      self.status = PaymentRecordStatus::Paid;
      self.updated_at = now;
    }
    if self.paid_at.is_none() {
      self.paid_at = Some(now);
    }
    if self.transaction_id.is_none() {
      self.transaction_id = transaction_id.map(str::to_string);
    }
  }

  pub fn is_paid(&self) -> bool {
    self.status == PaymentRecordStatus::Paid
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Payment {
    let now = Utc::now();
    Payment {
      id: Uuid::new_v4(),
      reference: "ref-1".into(),
      payer: PayerInfo {
        full_name: "Ada Obi".into(),
        email: "ada@example.com".into(),
        phone: None,
        address: None,
      },
      amount_cents: 2500,
      currency: "GBP".into(),
      method: PaymentRecordMethod::Card,
      status: PaymentRecordStatus::Pending,
      verified_by_admin: false,
      transaction_id: None,
      paid_at: None,
      description: None,
      order_id: None,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn mark_paid_sets_fields_exactly_once() {
    let mut payment = sample();
    let first = Utc::now();
    payment.mark_paid(Some("pi_123"), first);
    assert!(payment.is_paid());
    assert_eq!(payment.paid_at, Some(first));
    assert_eq!(payment.transaction_id.as_deref(), Some("pi_123"));

    let later = first + chrono::Duration::seconds(60);
    payment.mark_paid(Some("pi_other"), later);
    assert_eq!(payment.paid_at, Some(first), "paid_at must not move on replay");
    assert_eq!(payment.transaction_id.as_deref(), Some("pi_123"), "transaction id must not change");
  }

  #[test]
  fn status_literals_are_lowercase() {
    assert_eq!(PaymentRecordStatus::Refunded.as_str(), "refunded");
    assert_eq!(PaymentRecordStatus::parse("paid"), Some(PaymentRecordStatus::Paid));
    assert_eq!(PaymentRecordStatus::parse("Paid"), None);
  }
}

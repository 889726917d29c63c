// comanda_server/src/models/payment.rs

use chrono::{DateTime, Utc};
use comanda_core::{EngineError, EngineResult, PayerInfo, Payment, PaymentRecordMethod, PaymentRecordStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// One row of the `payments` table (the standalone ledger).
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
  pub id: Uuid,
  pub reference: String,
  pub full_name: String,
  pub email: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub amount_cents: i64,
  pub currency: String,
  pub method: String,
  pub status: String,
  pub verified_by_admin: bool,
  pub transaction_id: Option<String>,
  pub paid_at: Option<DateTime<Utc>>,
  pub description: Option<String>,
  pub order_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl PaymentRow {
  pub fn into_domain(self) -> EngineResult<Payment> {
    let method = PaymentRecordMethod::parse(&self.method).ok_or_else(|| {
      EngineError::store(anyhow::anyhow!(
        "payment {} has unknown method '{}'",
        self.id,
        self.method
      ))
    })?;
    let status = PaymentRecordStatus::parse(&self.status).ok_or_else(|| {
      EngineError::store(anyhow::anyhow!(
        "payment {} has unknown status '{}'",
        self.id,
        self.status
      ))
    })?;

    Ok(Payment {
      id: self.id,
      reference: self.reference,
      payer: PayerInfo {
        full_name: self.full_name,
        email: self.email,
        phone: self.phone,
        address: self.address,
      },
      amount_cents: self.amount_cents,
      currency: self.currency,
      method,
      status,
      verified_by_admin: self.verified_by_admin,
      transaction_id: self.transaction_id,
      paid_at: self.paid_at,
      description: self.description,
      order_id: self.order_id,
      created_at: self.created_at,
      updated_at: self.updated_at,
    })
  }
}

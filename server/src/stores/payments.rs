// comanda_server/src/stores/payments.rs

use crate::models::payment::PaymentRow;
use crate::stores::db_err;
use async_trait::async_trait;
use comanda_core::{EngineResult, Payment, PaymentStore};
use sqlx::PgPool;
use uuid::Uuid;

const PAYMENT_COLUMNS: &str = "id, reference, full_name, email, phone, address, amount_cents, currency, method, \
                               status, verified_by_admin, transaction_id, paid_at, description, order_id, \
                               created_at, updated_at";

pub struct PgPaymentStore {
  pool: PgPool,
}

impl PgPaymentStore {
  pub fn new(pool: PgPool) -> Self {
    PgPaymentStore { pool }
  }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
  async fn insert(&self, payment: &Payment) -> EngineResult<()> {
    sqlx::query(
      "INSERT INTO payments (id, reference, full_name, email, phone, address, amount_cents, currency, method, \
       status, verified_by_admin, transaction_id, paid_at, description, order_id, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(payment.id)
    .bind(&payment.reference)
    .bind(&payment.payer.full_name)
    .bind(&payment.payer.email)
    .bind(&payment.payer.phone)
    .bind(&payment.payer.address)
    .bind(payment.amount_cents)
    .bind(&payment.currency)
    .bind(payment.method.as_str())
    .bind(payment.status.as_str())
    .bind(payment.verified_by_admin)
    .bind(&payment.transaction_id)
    .bind(payment.paid_at)
    .bind(&payment.description)
    .bind(payment.order_id)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(())
  }

  async fn get(&self, id: Uuid) -> EngineResult<Option<Payment>> {
    let row: Option<PaymentRow> = sqlx::query_as(&format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(db_err)?;
    row.map(PaymentRow::into_domain).transpose()
  }

  async fn get_by_reference(&self, reference: &str) -> EngineResult<Option<Payment>> {
    let row: Option<PaymentRow> =
      sqlx::query_as(&format!("SELECT {} FROM payments WHERE reference = $1", PAYMENT_COLUMNS))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
    row.map(PaymentRow::into_domain).transpose()
  }

  async fn list(&self) -> EngineResult<Vec<Payment>> {
    let rows: Vec<PaymentRow> =
      sqlx::query_as(&format!("SELECT {} FROM payments ORDER BY created_at DESC", PAYMENT_COLUMNS))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
    rows.into_iter().map(PaymentRow::into_domain).collect()
  }

  async fn update(&self, payment: &Payment) -> EngineResult<()> {
    sqlx::query(
      "UPDATE payments SET full_name = $2, email = $3, phone = $4, address = $5, amount_cents = $6, \
       currency = $7, method = $8, status = $9, verified_by_admin = $10, transaction_id = $11, \
       paid_at = $12, description = $13, order_id = $14, updated_at = $15 WHERE id = $1",
    )
    .bind(payment.id)
    .bind(&payment.payer.full_name)
    .bind(&payment.payer.email)
    .bind(&payment.payer.phone)
    .bind(&payment.payer.address)
    .bind(payment.amount_cents)
    .bind(&payment.currency)
    .bind(payment.method.as_str())
    .bind(payment.status.as_str())
    .bind(payment.verified_by_admin)
    .bind(&payment.transaction_id)
    .bind(payment.paid_at)
    .bind(&payment.description)
    .bind(payment.order_id)
    .bind(payment.updated_at)
    .execute(&self.pool)
    .await
    .map_err(db_err)?;
    Ok(())
  }

  async fn upsert_by_reference(&self, payment: &Payment) -> EngineResult<Payment> {
    // Replays of the same gateway session rewrite the same row; identity
    // and created_at stay with the first write.
    let row: PaymentRow = sqlx::query_as(&format!(
      "INSERT INTO payments (id, reference, full_name, email, phone, address, amount_cents, currency, method, \
       status, verified_by_admin, transaction_id, paid_at, description, order_id, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
       ON CONFLICT (reference) DO UPDATE SET \
         full_name = EXCLUDED.full_name, email = EXCLUDED.email, phone = EXCLUDED.phone, \
         address = EXCLUDED.address, amount_cents = EXCLUDED.amount_cents, currency = EXCLUDED.currency, \
         method = EXCLUDED.method, status = EXCLUDED.status, verified_by_admin = EXCLUDED.verified_by_admin, \
         transaction_id = COALESCE(payments.transaction_id, EXCLUDED.transaction_id), \
         paid_at = COALESCE(payments.paid_at, EXCLUDED.paid_at), \
         description = EXCLUDED.description, order_id = EXCLUDED.order_id, updated_at = EXCLUDED.updated_at \
       RETURNING {}",
      PAYMENT_COLUMNS
    ))
    .bind(payment.id)
    .bind(&payment.reference)
    .bind(&payment.payer.full_name)
    .bind(&payment.payer.email)
    .bind(&payment.payer.phone)
    .bind(&payment.payer.address)
    .bind(payment.amount_cents)
    .bind(&payment.currency)
    .bind(payment.method.as_str())
    .bind(payment.status.as_str())
    .bind(payment.verified_by_admin)
    .bind(&payment.transaction_id)
    .bind(payment.paid_at)
    .bind(&payment.description)
    .bind(payment.order_id)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .fetch_one(&self.pool)
    .await
    .map_err(db_err)?;
    row.into_domain()
  }
}

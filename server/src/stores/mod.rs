// comanda_server/src/stores/mod.rs

//! Postgres-backed implementations of the engine's persistence seams.

pub mod orders;
pub mod payments;

pub use orders::PgOrderStore;
pub use payments::PgPaymentStore;

use comanda_core::EngineError;

pub(crate) fn db_err(e: sqlx::Error) -> EngineError {
  EngineError::store(e)
}

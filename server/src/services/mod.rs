// comanda_server/src/services/mod.rs

pub mod auth;
pub mod catalog;
pub mod gateway;
pub mod notifier;

pub use catalog::MenuCatalog;
pub use gateway::StripeGateway;
pub use notifier::HttpNotifier;

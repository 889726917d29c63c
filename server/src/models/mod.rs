// comanda_server/src/models/mod.rs

//! Row structs mapping database records to the core domain types.

pub mod admin_user;
pub mod menu_item;
pub mod order;
pub mod payment;

pub use admin_user::AdminUserRow;
pub use menu_item::MenuItemRow;
pub use order::OrderRow;
pub use payment::PaymentRow;

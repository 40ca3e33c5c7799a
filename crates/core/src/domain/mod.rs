pub mod stock;
pub mod suggestion;
pub mod transfer;

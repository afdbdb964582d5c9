pub mod auth;
pub mod cart;
pub mod notify;

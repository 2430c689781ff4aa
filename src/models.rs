pub mod auth;
pub mod material;
pub mod supplier;

pub mod auth;
pub mod material_service;
pub mod supplier_service;
pub mod validation;

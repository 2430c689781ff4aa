pub mod materials;
pub mod rpc;
pub mod suppliers;

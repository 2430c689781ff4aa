pub mod material_repo;
pub use material_repo::PgMaterialRepository;
pub mod supplier_repo;
pub use supplier_repo::PgSupplierRepository;
pub mod memory_repo;
pub use memory_repo::MemoryCatalog;

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::{
        material::{Material, MaterialChanges, MaterialFilter, MaterialPage, NewMaterial},
        supplier::{NewSupplier, Supplier, SupplierChanges, SupplierFilter},
    },
};

// Os serviços só conhecem estes traits; o backend (Postgres ou memória)
// é escolhido na montagem do AppState.

#[async_trait]
pub trait MaterialRepository: Send + Sync {
    async fn list(&self, filter: &MaterialFilter) -> Result<MaterialPage, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Material>, AppError>;

    async fn create(&self, material: &NewMaterial) -> Result<Material, AppError>;

    /// `None` quando o id não existe.
    async fn update(&self, id: i64, changes: &MaterialChanges) -> Result<Option<Material>, AppError>;

    /// Remove e devolve o registro como estava.
    async fn delete(&self, id: i64) -> Result<Option<Material>, AppError>;

    async fn count_by_supplier(&self, supplier_id: i64) -> Result<i64, AppError>;
}

#[async_trait]
pub trait SupplierRepository: Send + Sync {
    async fn list(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Supplier>, AppError>;

    async fn exists(&self, id: i64) -> Result<bool, AppError>;

    async fn create(&self, supplier: &NewSupplier) -> Result<Supplier, AppError>;

    async fn update(&self, id: i64, changes: &SupplierChanges) -> Result<Option<Supplier>, AppError>;

    async fn delete(&self, id: i64) -> Result<Option<Supplier>, AppError>;
}

/// Traduz violações de constraint do Postgres para erros de domínio.
/// `unique` mapeia o nome da constraint para (campo, valor enviado).
pub(crate) fn map_constraint_error(
    e: sqlx::Error,
    unique: &[(&str, &'static str, &str)],
    foreign_key: Option<AppError>,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if let Some((_, field, value)) = unique.iter().find(|(name, _, _)| *name == constraint) {
                return AppError::DuplicateValue {
                    field: *field,
                    value: value.to_string(),
                };
            }
        }
        if db_err.is_foreign_key_violation() {
            if let Some(err) = foreign_key {
                return err;
            }
        }
    }
    e.into()
}

// src/services/supplier_service.rs

use std::sync::Arc;
use validator::ValidationErrors;

use crate::{
    common::error::AppError,
    db::{MaterialRepository, SupplierRepository},
    models::{
        material::MaterialFilter,
        supplier::{NewSupplier, Supplier, SupplierListParams, SupplierMaterials, SupplierPayload},
    },
    services::validation,
};

#[derive(Clone)]
pub struct SupplierService {
    suppliers: Arc<dyn SupplierRepository>,
    materials: Arc<dyn MaterialRepository>,
}

impl SupplierService {
    pub fn new(suppliers: Arc<dyn SupplierRepository>, materials: Arc<dyn MaterialRepository>) -> Self {
        Self { suppliers, materials }
    }

    pub async fn list(&self, params: &SupplierListParams) -> Result<Vec<Supplier>, AppError> {
        let filter = validation::supplier_filter(params)?;
        self.suppliers.list(&filter).await
    }

    pub async fn get(&self, id: i64, include_materials: bool) -> Result<Supplier, AppError> {
        let mut supplier = self
            .suppliers
            .find_by_id(id)
            .await?
            .ok_or(AppError::SupplierNotFound(id))?;

        if include_materials {
            let page = self.materials.list(&MaterialFilter::for_supplier(id)).await?;
            supplier.materials = Some(page.items);
        }
        Ok(supplier)
    }

    pub async fn create(&self, payload: &SupplierPayload) -> Result<Supplier, AppError> {
        let mut errors = ValidationErrors::new();
        let changes = validation::supplier_changes(payload, &mut errors);
        validation::require_supplier_fields(payload, &mut errors);

        let (Some(code), Some(name)) = (changes.code, changes.name) else {
            return Err(AppError::ValidationError(errors));
        };
        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        // Campos opcionais: string vazia / ativo por padrão
        let new_supplier = NewSupplier {
            code,
            name,
            email: changes.email.unwrap_or_default(),
            phone: changes.phone.unwrap_or_default(),
            address: changes.address.unwrap_or_default(),
            active: changes.active.unwrap_or(true),
        };

        let supplier = self.suppliers.create(&new_supplier).await?;
        tracing::info!(id = supplier.id, code = %supplier.code, "fornecedor criado");
        Ok(supplier)
    }

    pub async fn update(&self, id: i64, payload: &SupplierPayload) -> Result<Supplier, AppError> {
        let current = self
            .suppliers
            .find_by_id(id)
            .await?
            .ok_or(AppError::SupplierNotFound(id))?;

        let mut errors = ValidationErrors::new();
        let changes = validation::supplier_changes(payload, &mut errors);
        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }
        if changes.is_empty() {
            return Ok(current);
        }

        let supplier = self
            .suppliers
            .update(id, &changes)
            .await?
            .ok_or(AppError::SupplierNotFound(id))?;
        tracing::info!(id, "fornecedor atualizado");
        Ok(supplier)
    }

    /// Só remove fornecedores sem materiais.
    pub async fn delete(&self, id: i64) -> Result<Supplier, AppError> {
        if !self.suppliers.exists(id).await? {
            return Err(AppError::SupplierNotFound(id));
        }

        let material_count = self.materials.count_by_supplier(id).await?;
        if material_count > 0 {
            tracing::warn!(id, material_count, "fornecedor com materiais não pode ser removido");
            return Err(AppError::SupplierHasMaterials(material_count));
        }

        let deleted = self
            .suppliers
            .delete(id)
            .await?
            .ok_or(AppError::SupplierNotFound(id))?;
        tracing::info!(id, code = %deleted.code, "fornecedor removido");
        Ok(deleted)
    }

    pub async fn list_materials_for(&self, id: i64) -> Result<SupplierMaterials, AppError> {
        let supplier = self
            .suppliers
            .find_by_id(id)
            .await?
            .ok_or(AppError::SupplierNotFound(id))?;

        let page = self.materials.list(&MaterialFilter::for_supplier(id)).await?;
        Ok(SupplierMaterials {
            supplier: (&supplier).into(),
            materials: page.items,
        })
    }
}

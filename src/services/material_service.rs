// src/services/material_service.rs

use std::sync::Arc;
use validator::ValidationErrors;

use crate::{
    common::error::AppError,
    db::{MaterialRepository, SupplierRepository},
    models::material::{Material, MaterialListParams, MaterialPage, MaterialPayload, NewMaterial},
    services::validation,
};

#[derive(Clone)]
pub struct MaterialService {
    materials: Arc<dyn MaterialRepository>,
    suppliers: Arc<dyn SupplierRepository>,
}

impl MaterialService {
    pub fn new(materials: Arc<dyn MaterialRepository>, suppliers: Arc<dyn SupplierRepository>) -> Self {
        Self { materials, suppliers }
    }

    // Adiciona o erro de FK ao acumulado, se o fornecedor não existir.
    async fn check_supplier(&self, supplier_id: Option<i64>, errors: &mut ValidationErrors) -> Result<(), AppError> {
        if let Some(id) = supplier_id {
            if !self.suppliers.exists(id).await? {
                errors.add("supplier_id", validation::supplier_not_found(id));
            }
        }
        Ok(())
    }

    // --- LIST ---
    pub async fn list(&self, params: &MaterialListParams) -> Result<MaterialPage, AppError> {
        let filter = validation::material_filter(params)?;
        self.materials.list(&filter).await
    }

    // --- GET ---
    pub async fn get(&self, id: i64) -> Result<Material, AppError> {
        self.materials
            .find_by_id(id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))
    }

    // --- CREATE ---
    pub async fn create(&self, payload: &MaterialPayload) -> Result<Material, AppError> {
        let mut errors = ValidationErrors::new();
        let changes = validation::material_changes(payload, &mut errors);
        validation::require_material_fields(payload, &mut errors);
        self.check_supplier(changes.supplier_id, &mut errors).await?;

        let (Some(code), Some(name), Some(material_type), Some(buy_price), Some(supplier_id)) = (
            changes.code,
            changes.name,
            changes.material_type,
            changes.buy_price,
            changes.supplier_id,
        ) else {
            return Err(AppError::ValidationError(errors));
        };
        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        let new_material = NewMaterial {
            code,
            name,
            material_type,
            buy_price,
            supplier_id,
            active: changes.active.unwrap_or(true),
        };

        let material = self.materials.create(&new_material).await?;
        tracing::info!(id = material.id, code = %material.code, "material criado");
        Ok(material)
    }

    // --- UPDATE (merge parcial) ---
    pub async fn update(&self, id: i64, payload: &MaterialPayload) -> Result<Material, AppError> {
        let current = self.get(id).await?;

        let mut errors = ValidationErrors::new();
        let changes = validation::material_changes(payload, &mut errors);
        self.check_supplier(changes.supplier_id, &mut errors).await?;
        if !errors.is_empty() {
            return Err(AppError::ValidationError(errors));
        }

        if changes.is_empty() {
            return Ok(current);
        }

        let material = self
            .materials
            .update(id, &changes)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;
        tracing::info!(id, "material atualizado");
        Ok(material)
    }

    // --- DELETE ---
    pub async fn delete(&self, id: i64) -> Result<Material, AppError> {
        let deleted = self
            .materials
            .delete(id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;
        tracing::info!(id, code = %deleted.code, "material removido");
        Ok(deleted)
    }
}

// src/db/memory_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::{collections::BTreeMap, sync::Arc};
use tokio::sync::RwLock;

use super::{MaterialRepository, SupplierRepository};
use crate::{
    common::error::AppError,
    models::{
        material::{Material, MaterialChanges, MaterialFilter, MaterialPage, MaterialType, NewMaterial},
        supplier::{NewSupplier, Supplier, SupplierChanges, SupplierFilter},
    },
};

// Linhas "cruas", como estariam nas tabelas (sem JOIN nem contagem).
#[derive(Debug, Clone)]
struct MaterialRow {
    id: i64,
    code: String,
    name: String,
    material_type: MaterialType,
    buy_price: Decimal,
    supplier_id: i64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SupplierRow {
    id: i64,
    code: String,
    name: String,
    email: String,
    phone: String,
    address: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    materials: BTreeMap<i64, MaterialRow>,
    suppliers: BTreeMap<i64, SupplierRow>,
    next_material_id: i64,
    next_supplier_id: i64,
}

impl Tables {
    fn material(&self, row: &MaterialRow) -> Material {
        let supplier_name = self
            .suppliers
            .get(&row.supplier_id)
            .map(|s| s.name.clone())
            .unwrap_or_default();

        Material {
            id: row.id,
            code: row.code.clone(),
            name: row.name.clone(),
            material_type: row.material_type,
            buy_price: row.buy_price,
            supplier_id: row.supplier_id,
            supplier_name,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn supplier(&self, row: &SupplierRow) -> Supplier {
        Supplier {
            id: row.id,
            code: row.code.clone(),
            name: row.name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            address: row.address.clone(),
            active: row.active,
            material_count: self.material_count(row.id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            materials: None,
        }
    }

    fn material_count(&self, supplier_id: i64) -> i64 {
        self.materials
            .values()
            .filter(|m| m.supplier_id == supplier_id)
            .count() as i64
    }

    // Mesmas regras das constraints UNIQUE do schema Postgres
    fn check_material_code(&self, code: &str, except: Option<i64>) -> Result<(), AppError> {
        let taken = self
            .materials
            .values()
            .any(|m| m.code == code && Some(m.id) != except);
        if taken {
            return Err(AppError::DuplicateValue {
                field: "code",
                value: code.to_string(),
            });
        }
        Ok(())
    }

    fn check_supplier_unique(&self, code: Option<&str>, name: Option<&str>, except: Option<i64>) -> Result<(), AppError> {
        for s in self.suppliers.values().filter(|s| Some(s.id) != except) {
            if let Some(code) = code.filter(|c| *c == s.code) {
                return Err(AppError::DuplicateValue {
                    field: "code",
                    value: code.to_string(),
                });
            }
            if let Some(name) = name.filter(|n| *n == s.name) {
                return Err(AppError::DuplicateValue {
                    field: "name",
                    value: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Catálogo em memória: implementa os dois repositórios sobre as mesmas
/// tabelas, protegidas por um único lock (cada chamada é atômica).
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MaterialRepository for MemoryCatalog {
    async fn list(&self, filter: &MaterialFilter) -> Result<MaterialPage, AppError> {
        let tables = self.tables.read().await;

        let matching: Vec<Material> = tables
            .materials
            .values()
            .map(|row| tables.material(row))
            .filter(|m| filter.matches(m))
            .collect();
        let total_count = matching.len() as i64;

        let skip = usize::try_from(filter.offset).unwrap_or(0);
        let take = filter
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(skip).take(take).collect();

        Ok(MaterialPage { items, total_count })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Material>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.materials.get(&id).map(|row| tables.material(row)))
    }

    async fn create(&self, material: &NewMaterial) -> Result<Material, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.suppliers.contains_key(&material.supplier_id) {
            return Err(AppError::unknown_supplier(material.supplier_id));
        }
        tables.check_material_code(&material.code, None)?;

        tables.next_material_id += 1;
        let now = Utc::now();
        let row = MaterialRow {
            id: tables.next_material_id,
            code: material.code.clone(),
            name: material.name.clone(),
            material_type: material.material_type,
            buy_price: material.buy_price,
            supplier_id: material.supplier_id,
            active: material.active,
            created_at: now,
            updated_at: now,
        };
        let created = tables.material(&row);
        tables.materials.insert(row.id, row);
        Ok(created)
    }

    async fn update(&self, id: i64, changes: &MaterialChanges) -> Result<Option<Material>, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.materials.contains_key(&id) {
            return Ok(None);
        }
        if let Some(supplier_id) = changes.supplier_id {
            if !tables.suppliers.contains_key(&supplier_id) {
                return Err(AppError::unknown_supplier(supplier_id));
            }
        }
        if let Some(code) = &changes.code {
            tables.check_material_code(code, Some(id))?;
        }

        let Some(row) = tables.materials.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(code) = &changes.code {
            row.code = code.clone();
        }
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(material_type) = changes.material_type {
            row.material_type = material_type;
        }
        if let Some(buy_price) = changes.buy_price {
            row.buy_price = buy_price;
        }
        if let Some(supplier_id) = changes.supplier_id {
            row.supplier_id = supplier_id;
        }
        if let Some(active) = changes.active {
            row.active = active;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(Some(tables.material(&row)))
    }

    async fn delete(&self, id: i64) -> Result<Option<Material>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.materials.remove(&id) else {
            return Ok(None);
        };
        Ok(Some(tables.material(&row)))
    }

    async fn count_by_supplier(&self, supplier_id: i64) -> Result<i64, AppError> {
        Ok(self.tables.read().await.material_count(supplier_id))
    }
}

#[async_trait]
impl SupplierRepository for MemoryCatalog {
    async fn list(&self, filter: &SupplierFilter) -> Result<Vec<Supplier>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .suppliers
            .values()
            .map(|row| tables.supplier(row))
            .filter(|s| filter.matches(s))
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Supplier>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.suppliers.get(&id).map(|row| tables.supplier(row)))
    }

    async fn exists(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.read().await.suppliers.contains_key(&id))
    }

    async fn create(&self, supplier: &NewSupplier) -> Result<Supplier, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_supplier_unique(Some(supplier.code.as_str()), Some(supplier.name.as_str()), None)?;

        tables.next_supplier_id += 1;
        let now = Utc::now();
        let row = SupplierRow {
            id: tables.next_supplier_id,
            code: supplier.code.clone(),
            name: supplier.name.clone(),
            email: supplier.email.clone(),
            phone: supplier.phone.clone(),
            address: supplier.address.clone(),
            active: supplier.active,
            created_at: now,
            updated_at: now,
        };
        let created = tables.supplier(&row);
        tables.suppliers.insert(row.id, row);
        Ok(created)
    }

    async fn update(&self, id: i64, changes: &SupplierChanges) -> Result<Option<Supplier>, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.suppliers.contains_key(&id) {
            return Ok(None);
        }
        tables.check_supplier_unique(changes.code.as_deref(), changes.name.as_deref(), Some(id))?;

        let Some(row) = tables.suppliers.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(code) = &changes.code {
            row.code = code.clone();
        }
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(email) = &changes.email {
            row.email = email.clone();
        }
        if let Some(phone) = &changes.phone {
            row.phone = phone.clone();
        }
        if let Some(address) = &changes.address {
            row.address = address.clone();
        }
        if let Some(active) = changes.active {
            row.active = active;
        }
        row.updated_at = Utc::now();

        let row = row.clone();
        Ok(Some(tables.supplier(&row)))
    }

    async fn delete(&self, id: i64) -> Result<Option<Supplier>, AppError> {
        let mut tables = self.tables.write().await;

        // Equivalente ao ON DELETE RESTRICT da FK
        let count = tables.material_count(id);
        if count > 0 && tables.suppliers.contains_key(&id) {
            return Err(AppError::SupplierHasMaterials(count));
        }

        let Some(row) = tables.suppliers.remove(&id) else {
            return Ok(None);
        };
        Ok(Some(tables.supplier(&row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::material::ActiveFilter;

    fn acme() -> NewSupplier {
        NewSupplier {
            code: "SUP1".into(),
            name: "Acme".into(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            active: true,
        }
    }

    fn roll(code: &str, supplier_id: i64, material_type: MaterialType, active: bool) -> NewMaterial {
        NewMaterial {
            code: code.into(),
            name: "Roll".into(),
            material_type,
            buy_price: Decimal::new(150, 0),
            supplier_id,
            active,
        }
    }

    #[tokio::test]
    async fn material_count_is_computed_on_read() {
        let catalog = MemoryCatalog::new();
        let supplier = SupplierRepository::create(&catalog, &acme()).await.unwrap();
        assert_eq!(supplier.material_count, 0);

        MaterialRepository::create(&catalog, &roll("M1", supplier.id, MaterialType::Cotton, true))
            .await
            .unwrap();
        MaterialRepository::create(&catalog, &roll("M2", supplier.id, MaterialType::Jeans, false))
            .await
            .unwrap();

        let reloaded = SupplierRepository::find_by_id(&catalog, supplier.id).await.unwrap().unwrap();
        assert_eq!(reloaded.material_count, 2);
    }

    #[tokio::test]
    async fn list_paginates_after_filtering() {
        let catalog = MemoryCatalog::new();
        let supplier = SupplierRepository::create(&catalog, &acme()).await.unwrap();
        for i in 0..5 {
            MaterialRepository::create(&catalog, &roll(&format!("F{i}"), supplier.id, MaterialType::Fabric, true))
                .await
                .unwrap();
        }
        MaterialRepository::create(&catalog, &roll("J1", supplier.id, MaterialType::Jeans, true))
            .await
            .unwrap();

        let filter = MaterialFilter {
            material_type: Some(MaterialType::Fabric),
            active: ActiveFilter::All,
            limit: Some(2),
            offset: 1,
            ..Default::default()
        };
        let page = MaterialRepository::list(&catalog, &filter).await.unwrap();

        assert_eq!(page.total_count, 5);
        let codes: Vec<_> = page.items.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, ["F1", "F2"]);
    }

    #[tokio::test]
    async fn unique_and_foreign_key_rules_are_enforced() {
        let catalog = MemoryCatalog::new();
        let supplier = SupplierRepository::create(&catalog, &acme()).await.unwrap();

        let dup = SupplierRepository::create(&catalog, &acme()).await;
        assert!(matches!(dup, Err(AppError::DuplicateValue { field: "code", .. })));

        let orphan = MaterialRepository::create(&catalog, &roll("M1", 999, MaterialType::Cotton, true)).await;
        assert!(matches!(orphan, Err(AppError::ValidationError(_))));

        MaterialRepository::create(&catalog, &roll("M1", supplier.id, MaterialType::Cotton, true))
            .await
            .unwrap();
        let blocked = SupplierRepository::delete(&catalog, supplier.id).await;
        assert!(matches!(blocked, Err(AppError::SupplierHasMaterials(1))));
    }
}

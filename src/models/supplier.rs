// src/models/supplier.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::material::{ActiveFilter, Material};

// --- 1. Fornecedor (leitura) ---
// `material_count` é calculado na leitura (subquery), nunca armazenado.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Supplier {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub active: bool,
    pub material_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Só preenchido quando o cliente pede `include_materials`
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<Material>>,
}

// --- 2. Payload de escrita ---
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SupplierPayload {
    #[schema(example = "SUP1")]
    pub code: Option<String>,
    #[schema(example = "Acme")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSupplier {
    pub code: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

impl SupplierChanges {
    pub fn is_empty(&self) -> bool {
        *self == SupplierChanges::default()
    }
}

// --- 3. Filtros ---
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierListParams {
    /// true (padrão) | false | all
    #[param(value_type = Option<String>)]
    pub active: Option<Value>,
    /// Trecho do nome (sem diferenciar maiúsculas)
    pub name: Option<String>,
    /// Trecho do código (sem diferenciar maiúsculas)
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierFilter {
    pub active: ActiveFilter,
    pub name_contains: Option<String>,
    pub code_contains: Option<String>,
}

impl SupplierFilter {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        fn contains_ci(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        self.active.matches(supplier.active)
            && contains_ci(&supplier.name, &self.name_contains)
            && contains_ci(&supplier.code, &self.code_contains)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierGetParams {
    #[param(value_type = Option<bool>)]
    pub include_materials: Option<Value>,
}

/// Resumo do fornecedor devolvido junto com a lista de materiais dele.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierSummary {
    pub id: i64,
    pub name: String,
    pub code: String,
}

impl From<&Supplier> for SupplierSummary {
    fn from(s: &Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            code: s.code.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierMaterials {
    pub supplier: SupplierSummary,
    pub materials: Vec<Material>,
}

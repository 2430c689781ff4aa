// src/models/material.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::{IntoParams, ToSchema};

/// Preço mínimo de compra aceito para qualquer material.
pub const MIN_BUY_PRICE: Decimal = Decimal::ONE_HUNDRED;

/// Maior preço que cabe em `NUMERIC(14, 2)`: 999999999999.99.
pub const MAX_BUY_PRICE: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, 2);

/// Casas decimais gravadas para o preço.
pub const BUY_PRICE_SCALE: u32 = 2;

// --- 1. Tipo de Material ---
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "material_type", rename_all = "lowercase")] // Banco
#[serde(rename_all = "lowercase")] // JSON
pub enum MaterialType {
    Fabric, // Vira "fabric"
    Jeans,
    Cotton,
}

impl MaterialType {
    pub const ALL: [MaterialType; 3] = [MaterialType::Fabric, MaterialType::Jeans, MaterialType::Cotton];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Fabric => "fabric",
            MaterialType::Jeans => "jeans",
            MaterialType::Cotton => "cotton",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = ();

    // Comparação exata ("Fabric" não é aceito)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

// --- 2. Material (leitura) ---
// O nome do fornecedor vem do JOIN e acompanha toda leitura.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Material {
    pub id: i64,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub material_type: MaterialType,
    #[schema(value_type = f64, example = 150.0)]
    pub buy_price: Decimal,
    pub supplier_id: i64,
    pub supplier_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 3. Payload de escrita ---
// Tudo opcional: o create exige os obrigatórios, o update valida só o que veio.
// `buy_price` e `supplier_id` aceitam número ou string numérica.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MaterialPayload {
    #[schema(example = "m1")]
    pub code: Option<String>,
    #[schema(example = "Cotton Roll")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "cotton")]
    pub material_type: Option<String>,
    #[schema(value_type = Option<f64>, example = 150.0)]
    pub buy_price: Option<Value>,
    #[schema(value_type = Option<i64>, example = 1)]
    pub supplier_id: Option<Value>,
    pub active: Option<bool>,
}

/// Material já validado e normalizado, pronto para inserir.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterial {
    pub code: String,
    pub name: String,
    pub material_type: MaterialType,
    pub buy_price: Decimal,
    pub supplier_id: i64,
    pub active: bool,
}

/// Alterações parciais já validadas. `None` mantém o valor atual.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialChanges {
    pub code: Option<String>,
    pub name: Option<String>,
    pub material_type: Option<MaterialType>,
    pub buy_price: Option<Decimal>,
    pub supplier_id: Option<i64>,
    pub active: Option<bool>,
}

impl MaterialChanges {
    pub fn is_empty(&self) -> bool {
        *self == MaterialChanges::default()
    }
}

// --- 4. Filtros de listagem ---

/// Filtro de `active`. Sem parâmetro explícito, só os ativos aparecem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveFilter {
    Only(bool),
    All,
}

impl Default for ActiveFilter {
    fn default() -> Self {
        ActiveFilter::Only(true)
    }
}

impl ActiveFilter {
    pub fn matches(&self, active: bool) -> bool {
        match self {
            ActiveFilter::Only(expected) => *expected == active,
            ActiveFilter::All => true,
        }
    }
}

/// Query string (ou params do JSON-RPC) da listagem de materiais.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaterialListParams {
    /// fabric | jeans | cotton
    #[serde(rename = "type")]
    #[param(value_type = Option<String>)]
    pub material_type: Option<Value>,
    #[param(value_type = Option<i64>)]
    pub supplier_id: Option<Value>,
    /// true (padrão) | false | all
    #[param(value_type = Option<String>)]
    pub active: Option<Value>,
    #[param(value_type = Option<i64>)]
    pub limit: Option<Value>,
    #[param(value_type = Option<i64>)]
    pub offset: Option<Value>,
}

/// Predicados (AND) aplicados à listagem, já tipados.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialFilter {
    pub material_type: Option<MaterialType>,
    pub supplier_id: Option<i64>,
    pub active: ActiveFilter,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl MaterialFilter {
    /// Todos os materiais de um fornecedor, ativos ou não.
    pub fn for_supplier(supplier_id: i64) -> Self {
        Self {
            supplier_id: Some(supplier_id),
            active: ActiveFilter::All,
            ..Default::default()
        }
    }

    pub fn matches(&self, material: &Material) -> bool {
        self.material_type.is_none_or(|t| t == material.material_type)
            && self.supplier_id.is_none_or(|id| id == material.supplier_id)
            && self.active.matches(material.active)
    }
}

/// Página de resultados + total antes da paginação.
#[derive(Debug, Clone)]
pub struct MaterialPage {
    pub items: Vec<Material>,
    pub total_count: i64,
}

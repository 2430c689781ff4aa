// src/services/validation.rs
//
// Regras de campo compartilhadas pelos serviços. Os payloads chegam "soltos"
// (número ou string, JSON ou query string); aqui viram tipos do domínio e
// todas as violações são acumuladas num único `ValidationErrors`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;
use validator::{ValidationError, ValidationErrors};

use crate::models::{
    material::{
        ActiveFilter, MaterialChanges, MaterialFilter, MaterialListParams, MaterialPayload, MaterialType,
        BUY_PRICE_SCALE, MAX_BUY_PRICE, MIN_BUY_PRICE,
    },
    supplier::{SupplierChanges, SupplierFilter, SupplierGetParams, SupplierListParams, SupplierPayload},
};

pub fn field_error(code: &'static str) -> ValidationError {
    ValidationError::new(code)
}

pub fn supplier_not_found(supplier_id: i64) -> ValidationError {
    let mut err = field_error("supplier_not_found");
    err.add_param("id".into(), &supplier_id);
    err
}

fn invalid_type() -> ValidationError {
    let mut err = field_error("invalid_type");
    let allowed: Vec<&str> = MaterialType::ALL.iter().map(|t| t.as_str()).collect();
    err.add_param("allowed".into(), &allowed.join(", "));
    err
}

fn below_min_price() -> ValidationError {
    let mut err = field_error("min_price");
    err.add_param("min".into(), &MIN_BUY_PRICE.to_string());
    err
}

fn above_max_price() -> ValidationError {
    let mut err = field_error("max_price");
    err.add_param("max".into(), &MAX_BUY_PRICE.to_string());
    err
}

/// Código normalizado: sem espaços nas pontas e em maiúsculas.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Código de fornecedor: só letras, números e sublinhado.
pub fn is_valid_supplier_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Valores vazios ("" ou null) contam como "não enviado".
fn present(value: &Option<Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Número JSON ou string numérica ("150", " 99.5 ").
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = as_text(value)?;
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Preço de compra dentro da faixa aceita, arredondado como o banco grava.
pub fn parse_price(value: &Value) -> Result<Decimal, ValidationError> {
    match parse_decimal(value) {
        Some(price) if price < MIN_BUY_PRICE => Err(below_min_price()),
        Some(price) if price > MAX_BUY_PRICE => Err(above_max_price()),
        Some(price) => Ok(price.round_dp_with_strategy(BUY_PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)),
        // Número válido, mas além do alcance do Decimal (ex.: 1e30)
        None => match as_text(value).and_then(|t| t.parse::<f64>().ok()) {
            Some(n) if n.is_finite() && n > 0.0 => Err(above_max_price()),
            Some(n) if n.is_finite() => Err(below_min_price()),
            _ => Err(field_error("invalid_number")),
        },
    }
}

/// Inteiro JSON (inclusive `1.0`) ou string numérica.
pub fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Booleano JSON ou "true"/"false"/"1"/"0".
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// `active`: true | false | all.
pub fn parse_active(value: &Value) -> Option<ActiveFilter> {
    if let Value::String(s) = value {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(ActiveFilter::All);
        }
    }
    parse_flag(value).map(ActiveFilter::Only)
}

fn parse_active_param(value: &Option<Value>, errors: &mut ValidationErrors) -> ActiveFilter {
    match present(value) {
        None => ActiveFilter::default(),
        Some(v) => parse_active(v).unwrap_or_else(|| {
            errors.add("active", field_error("invalid_boolean"));
            ActiveFilter::default()
        }),
    }
}

fn parse_non_negative(field: &'static str, value: &Option<Value>, errors: &mut ValidationErrors) -> Option<i64> {
    let v = present(value)?;
    match parse_integer(v) {
        Some(n) if n >= 0 => Some(n),
        Some(_) => {
            errors.add(field, field_error("negative"));
            None
        }
        None => {
            errors.add(field, field_error("invalid_number"));
            None
        }
    }
}

// ---
// Materiais
// ---

/// Valida só os campos enviados. Erros vão para `errors`; o que passou volta normalizado.
pub fn material_changes(payload: &MaterialPayload, errors: &mut ValidationErrors) -> MaterialChanges {
    let mut changes = MaterialChanges {
        active: payload.active,
        ..Default::default()
    };

    if let Some(code) = &payload.code {
        let code = normalize_code(code);
        if code.is_empty() {
            errors.add("code", field_error("empty"));
        } else {
            changes.code = Some(code);
        }
    }

    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            errors.add("name", field_error("empty"));
        } else {
            changes.name = Some(name.clone());
        }
    }

    if let Some(raw) = &payload.material_type {
        match raw.parse::<MaterialType>() {
            Ok(t) => changes.material_type = Some(t),
            Err(_) => errors.add("type", invalid_type()),
        }
    }

    if let Some(raw) = &payload.buy_price {
        match parse_price(raw) {
            Ok(price) => changes.buy_price = Some(price),
            Err(err) => errors.add("buy_price", err),
        }
    }

    if let Some(raw) = &payload.supplier_id {
        match parse_integer(raw) {
            Some(id) => changes.supplier_id = Some(id),
            None => errors.add("supplier_id", field_error("invalid_number")),
        }
    }

    changes
}

/// Campos obrigatórios na criação.
pub fn require_material_fields(payload: &MaterialPayload, errors: &mut ValidationErrors) {
    let required = [
        ("code", payload.code.is_none()),
        ("name", payload.name.is_none()),
        ("type", payload.material_type.is_none()),
        ("buy_price", payload.buy_price.is_none()),
        ("supplier_id", payload.supplier_id.is_none()),
    ];
    for (field, missing) in required {
        if missing {
            errors.add(field, field_error("required"));
        }
    }
}

pub fn material_filter(params: &MaterialListParams) -> Result<MaterialFilter, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let material_type = present(&params.material_type).and_then(|v| {
        let parsed = as_text(v).and_then(|t| t.parse::<MaterialType>().ok());
        if parsed.is_none() {
            errors.add("type", invalid_type());
        }
        parsed
    });

    let supplier_id = present(&params.supplier_id).and_then(|v| {
        let parsed = parse_integer(v);
        if parsed.is_none() {
            errors.add("supplier_id", field_error("invalid_number"));
        }
        parsed
    });

    let active = parse_active_param(&params.active, &mut errors);
    // limit=0 equivale a "sem limite"
    let limit = parse_non_negative("limit", &params.limit, &mut errors).filter(|l| *l > 0);
    let offset = parse_non_negative("offset", &params.offset, &mut errors).unwrap_or(0);

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(MaterialFilter {
        material_type,
        supplier_id,
        active,
        limit,
        offset,
    })
}

// ---
// Fornecedores
// ---

pub fn supplier_changes(payload: &SupplierPayload, errors: &mut ValidationErrors) -> SupplierChanges {
    let mut changes = SupplierChanges {
        email: payload.email.clone(),
        phone: payload.phone.clone(),
        address: payload.address.clone(),
        active: payload.active,
        ..Default::default()
    };

    if let Some(code) = &payload.code {
        let code = normalize_code(code);
        if code.is_empty() {
            errors.add("code", field_error("empty"));
        } else if !is_valid_supplier_code(&code) {
            errors.add("code", field_error("invalid_code"));
        } else {
            changes.code = Some(code);
        }
    }

    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            errors.add("name", field_error("empty"));
        } else {
            changes.name = Some(name.clone());
        }
    }

    changes
}

pub fn require_supplier_fields(payload: &SupplierPayload, errors: &mut ValidationErrors) {
    if payload.code.is_none() {
        errors.add("code", field_error("required"));
    }
    if payload.name.is_none() {
        errors.add("name", field_error("required"));
    }
}

pub fn supplier_filter(params: &SupplierListParams) -> Result<SupplierFilter, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let active = parse_active_param(&params.active, &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let non_blank = |s: &Option<String>| s.as_ref().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    Ok(SupplierFilter {
        active,
        name_contains: non_blank(&params.name),
        code_contains: non_blank(&params.code),
    })
}

/// Valor irreconhecível em `include_materials` conta como "não".
pub fn include_materials(params: &SupplierGetParams) -> bool {
    present(&params.include_materials)
        .and_then(parse_flag)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_decimal(&json!(150)), Some(Decimal::new(150, 0)));
        assert_eq!(parse_decimal(&json!(99.5)), Some(Decimal::new(995, 1)));
        assert_eq!(parse_decimal(&json!(" 120.25 ")), Some(Decimal::new(12025, 2)));
        assert_eq!(parse_decimal(&json!("abc")), None);
        assert_eq!(parse_decimal(&json!(true)), None);
    }

    #[test]
    fn price_is_bounded_and_rounded_to_cents() {
        assert_eq!(parse_price(&json!("123.456")), Ok(Decimal::new(12346, 2)));
        assert_eq!(parse_price(&json!(1.5e2)), Ok(Decimal::new(150, 0)));
        assert_eq!(parse_price(&json!("999999999999.99")), Ok(MAX_BUY_PRICE));

        let code = |v: Value| parse_price(&v).unwrap_err().code.to_string();
        assert_eq!(code(json!(99.99)), "min_price");
        assert_eq!(code(json!(1e12)), "max_price");
        assert_eq!(code(json!(1e30)), "max_price");
        assert_eq!(code(json!("-1e30")), "min_price");
        assert_eq!(code(json!("cem")), "invalid_number");
    }

    #[test]
    fn integer_accepts_integral_floats_only() {
        assert_eq!(parse_integer(&json!(1)), Some(1));
        assert_eq!(parse_integer(&json!(1.0)), Some(1));
        assert_eq!(parse_integer(&json!(" 42 ")), Some(42));
        assert_eq!(parse_integer(&json!(1.5)), None);
        assert_eq!(parse_integer(&json!(1e30)), None);
    }

    #[test]
    fn supplier_code_allows_only_alnum_and_underscore() {
        assert!(is_valid_supplier_code("SUP_01"));
        assert!(!is_valid_supplier_code("SUP-01"));
        assert!(!is_valid_supplier_code("SUP 01"));
        assert!(!is_valid_supplier_code(""));
    }

    #[test]
    fn create_payload_reports_every_violation_at_once() {
        let payload = MaterialPayload {
            code: Some("   ".into()),
            material_type: Some("silk".into()),
            buy_price: Some(json!(50)),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        material_changes(&payload, &mut errors);
        require_material_fields(&payload, &mut errors);

        let fields = errors.field_errors();
        let mut names: Vec<String> = fields.keys().map(|k| k.to_string()).collect();
        names.sort();
        assert_eq!(names, ["buy_price", "code", "name", "supplier_id", "type"]);
    }

    #[test]
    fn code_is_trimmed_and_upper_cased() {
        let payload = MaterialPayload {
            code: Some("  m1 ".into()),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        let changes = material_changes(&payload, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(changes.code.as_deref(), Some("M1"));
    }

    #[test]
    fn material_filter_defaults_to_active_only() {
        let filter = material_filter(&MaterialListParams::default()).unwrap();
        assert_eq!(filter.active, ActiveFilter::Only(true));
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.limit, None);

        let params = MaterialListParams {
            material_type: Some(json!("fabric")),
            active: Some(json!("all")),
            limit: Some(json!("10")),
            ..Default::default()
        };
        let filter = material_filter(&params).unwrap();
        assert_eq!(filter.material_type, Some(MaterialType::Fabric));
        assert_eq!(filter.active, ActiveFilter::All);
        assert_eq!(filter.limit, Some(10));
    }

    #[test]
    fn material_filter_rejects_garbage() {
        let params = MaterialListParams {
            material_type: Some(json!("wool")),
            active: Some(json!("maybe")),
            offset: Some(json!(-1)),
            ..Default::default()
        };
        let errors = material_filter(&params).unwrap_err();
        assert_eq!(errors.field_errors().len(), 3);
    }
}

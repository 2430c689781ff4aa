// src/common/i18n.rs

use std::collections::HashMap;

pub const DEFAULT_LANG: &str = "en";

// (chave, inglês, português)
const MESSAGES: &[(&str, &str, &str)] = &[
    // --- Erros gerais ---
    ("error.validation", "One or more fields are invalid.", "Um ou mais campos são inválidos."),
    ("error.malformed_json", "Malformed JSON body: {detail}", "Corpo JSON inválido: {detail}"),
    ("error.invalid_path", "Invalid path parameter: {detail}", "Parâmetro de caminho inválido: {detail}"),
    ("error.material_not_found", "Material not found", "Material não encontrado"),
    ("error.supplier_not_found", "Supplier not found", "Fornecedor não encontrado"),
    (
        "error.supplier_has_materials",
        "Cannot delete supplier. It has {count} associated materials.",
        "Não é possível excluir o fornecedor. Ele possui {count} materiais associados.",
    ),
    (
        "error.duplicate_value",
        "A record with {field} '{value}' already exists.",
        "Já existe um registro com {field} '{value}'.",
    ),
    (
        "error.invalid_token",
        "Missing or invalid authentication token.",
        "Token de autenticação inválido ou ausente.",
    ),
    (
        "error.invalid_operation",
        "Invalid operation: {operation}. Use {allowed}",
        "Operação inválida: {operation}. Use {allowed}",
    ),
    ("error.internal", "An unexpected error occurred.", "Ocorreu um erro inesperado."),
    // --- Sucesso ---
    ("success.material_created", "Material created successfully", "Material criado com sucesso"),
    ("success.material_updated", "Material updated successfully", "Material atualizado com sucesso"),
    ("success.material_deleted", "Material \"{name}\" deleted successfully", "Material \"{name}\" removido com sucesso"),
    ("success.supplier_created", "Supplier created successfully", "Fornecedor criado com sucesso"),
    ("success.supplier_updated", "Supplier updated successfully", "Fornecedor atualizado com sucesso"),
    ("success.supplier_deleted", "Supplier \"{name}\" deleted successfully", "Fornecedor \"{name}\" removido com sucesso"),
    // --- Erros por campo ---
    ("field.required", "Missing required field: {field}", "Campo obrigatório ausente: {field}"),
    ("field.empty", "Field {field} cannot be empty.", "O campo {field} não pode ser vazio."),
    (
        "field.invalid_type",
        "Invalid material type. Must be one of: {allowed}",
        "Tipo de material inválido. Use um destes: {allowed}",
    ),
    ("field.invalid_number", "Invalid {field} format", "Formato inválido para {field}"),
    ("field.invalid_boolean", "Field {field} must be true, false or all.", "O campo {field} deve ser true, false ou all."),
    ("field.negative", "Field {field} cannot be negative.", "O campo {field} não pode ser negativo."),
    ("field.min_price", "Buy price must be at least {min}", "O preço de compra deve ser no mínimo {min}"),
    ("field.max_price", "Buy price must be at most {max}", "O preço de compra deve ser no máximo {max}"),
    ("field.supplier_not_found", "Supplier {id} not found", "Fornecedor {id} não encontrado"),
    (
        "field.invalid_code",
        "Supplier code must contain only letters, numbers, and underscores.",
        "O código do fornecedor deve conter apenas letras, números e sublinhados.",
    ),
];

/// Catálogo de mensagens por idioma. Idiomas desconhecidos caem no inglês.
#[derive(Debug, Clone)]
pub struct I18nStore {
    catalogs: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

impl I18nStore {
    pub fn new() -> Self {
        let mut en = HashMap::new();
        let mut pt = HashMap::new();
        for (key, en_msg, pt_msg) in MESSAGES {
            en.insert(*key, *en_msg);
            pt.insert(*key, *pt_msg);
        }

        let mut catalogs = HashMap::new();
        catalogs.insert("en", en);
        catalogs.insert("pt", pt);
        Self { catalogs }
    }

    pub fn has(&self, key: &str) -> bool {
        self.lookup(DEFAULT_LANG, key).is_some()
    }

    /// Traduz `key` substituindo `{param}` pelos valores dados.
    /// Chave desconhecida volta como está.
    pub fn translate(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        let template = self
            .lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .unwrap_or(key);

        params.iter().fold(template.to_string(), |msg, (name, value)| {
            msg.replace(&format!("{{{}}}", name), value)
        })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs.get(lang).and_then(|c| c.get(key)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_params_and_falls_back_to_english() {
        let store = I18nStore::new();

        let pt = store.translate("pt", "error.supplier_has_materials", &[("count", "2".into())]);
        assert_eq!(pt, "Não é possível excluir o fornecedor. Ele possui 2 materiais associados.");

        let fr = store.translate("fr", "field.min_price", &[("min", "100".into())]);
        assert_eq!(fr, "Buy price must be at least 100");
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::new();
        assert!(!store.has("field.nope"));
        assert_eq!(store.translate("en", "field.nope", &[]), "field.nope");
    }
}

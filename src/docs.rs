// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Material Catalog API", description = "Materiais e fornecedores (REST + JSON-RPC)"),
    paths(
        // --- Materials ---
        handlers::materials::list_materials,
        handlers::materials::get_material,
        handlers::materials::create_material,
        handlers::materials::update_material,
        handlers::materials::delete_material,

        // --- Suppliers ---
        handlers::suppliers::list_suppliers,
        handlers::suppliers::get_supplier,
        handlers::suppliers::create_supplier,
        handlers::suppliers::update_supplier,
        handlers::suppliers::delete_supplier,
        handlers::suppliers::list_supplier_materials,

        // --- JSON-RPC ---
        handlers::rpc::materials_rpc,
        handlers::rpc::material_rpc,
        handlers::rpc::suppliers_rpc,
        handlers::rpc::supplier_rpc,
        handlers::rpc::supplier_materials_rpc,
    ),
    components(
        schemas(
            // --- Materials ---
            models::material::MaterialType,
            models::material::Material,
            models::material::MaterialPayload,

            // --- Suppliers ---
            models::supplier::Supplier,
            models::supplier::SupplierPayload,
            models::supplier::SupplierSummary,
            models::supplier::SupplierMaterials,

            // --- JSON-RPC ---
            handlers::rpc::RpcRequest,
            handlers::rpc::RpcResult,
            handlers::rpc::RpcResponse,
        )
    ),
    tags(
        (name = "Materials", description = "Cadastro de Materiais"),
        (name = "Suppliers", description = "Cadastro de Fornecedores"),
        (name = "JSON-RPC", description = "Mesmas operações no envelope JSON-RPC (params.operation)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build(app_state: AppState) -> Router {
    // REST: materiais e fornecedores
    let api_routes = Router::new()
        .route(
            "/api/materials",
            get(handlers::materials::list_materials).post(handlers::materials::create_material),
        )
        .route(
            "/api/materials/{id}",
            get(handlers::materials::get_material)
                .put(handlers::materials::update_material)
                .delete(handlers::materials::delete_material),
        )
        .route(
            "/api/suppliers",
            get(handlers::suppliers::list_suppliers).post(handlers::suppliers::create_supplier),
        )
        .route(
            "/api/suppliers/{id}",
            get(handlers::suppliers::get_supplier)
                .put(handlers::suppliers::update_supplier)
                .delete(handlers::suppliers::delete_supplier),
        )
        .route(
            "/api/suppliers/{id}/materials",
            get(handlers::suppliers::list_supplier_materials),
        );

    // JSON-RPC: mesmas operações, escolhidas por `params.operation`
    let rpc_routes = Router::new()
        .route("/jsonrpc/materials", post(handlers::rpc::materials_rpc))
        .route("/jsonrpc/materials/{id}", post(handlers::rpc::material_rpc))
        .route("/jsonrpc/suppliers", post(handlers::rpc::suppliers_rpc))
        .route("/jsonrpc/suppliers/{id}", post(handlers::rpc::supplier_rpc))
        .route(
            "/jsonrpc/suppliers/{id}/materials",
            post(handlers::rpc::supplier_materials_rpc),
        );

    // Uma única política de autenticação para REST e JSON-RPC.
    // `route_layer` para que rota inexistente continue 404 (e não 401).
    let protected = api_routes
        .merge(rpc_routes)
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(protected)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "segredo-de-teste";

    struct TestApp {
        router: Router,
        token: String,
    }

    impl TestApp {
        fn new() -> Self {
            let state = AppState::in_memory(SECRET.into());
            let token = state.auth_service.issue_token(Uuid::new_v4());
            Self {
                router: build(state),
                token,
            }
        }

        async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.token));
            let body = match body {
                Some(json) => {
                    request = request.header(header::CONTENT_TYPE, "application/json");
                    Body::from(json.to_string())
                }
                None => Body::empty(),
            };
            let response = self
                .router
                .clone()
                .oneshot(request.body(body).unwrap())
                .await
                .unwrap();
            read_json(response).await
        }

        async fn rpc(&self, uri: &str, params: Value) -> Value {
            let envelope = json!({"jsonrpc": "2.0", "method": "call", "params": params, "id": 7});
            let (status, body) = self.send(Method::POST, uri, Some(envelope)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["jsonrpc"], "2.0");
            assert_eq!(body["id"], 7);
            body["result"].clone()
        }
    }

    async fn read_json(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    #[tokio::test]
    async fn supplier_and_material_lifecycle() {
        let app = TestApp::new();

        let (status, body) = app
            .send(Method::POST, "/api/suppliers", Some(json!({"code": "SUP1", "name": "Acme"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        let supplier_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/materials",
                Some(json!({
                    "code": "m1",
                    "name": "Cotton Roll",
                    "type": "cotton",
                    "buy_price": 150,
                    "supplier_id": supplier_id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["code"], "M1");
        assert_eq!(body["data"]["supplier_name"], "Acme");
        assert_eq!(body["message"], "Material created successfully");
        let material_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/materials/{material_id}"),
                Some(json!({"buy_price": 50})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["details"]["buy_price"][0], "Buy price must be at least 100");

        let (status, body) = app
            .send(Method::DELETE, &format!("/api/suppliers/{supplier_id}"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot delete supplier. It has 1 associated materials.");

        let (status, body) = app
            .send(Method::DELETE, &format!("/api/materials/{material_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Material \"Cotton Roll\" deleted successfully");

        let (status, _) = app
            .send(Method::DELETE, &format!("/api/suppliers/{supplier_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn requests_without_a_valid_token_are_rejected() {
        let app = TestApp::new();

        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/api/materials").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/suppliers")
                    .header(header::AUTHORIZATION, "Bearer nao-e-um-jwt")
                    .header(header::ACCEPT_LANGUAGE, "pt-BR")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");
    }

    #[tokio::test]
    async fn docs_and_health_are_public() {
        let app = TestApp::new();

        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/api/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/materials"].is_object());
        assert!(body["paths"]["/jsonrpc/suppliers/{id}"].is_object());

        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_a_localized_bad_request() {
        let app = TestApp::new();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/suppliers")
                    .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::ACCEPT_LANGUAGE, "pt")
                    .body(Body::from("{\"code\": "))
                    .unwrap(),
            )
            .await
            .unwrap();
        let (status, body) = read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Corpo JSON inválido"));
    }

    #[tokio::test]
    async fn material_listing_filters_and_paginates() {
        let app = TestApp::new();
        let (_, body) = app
            .send(Method::POST, "/api/suppliers", Some(json!({"code": "SUP1", "name": "Acme"})))
            .await;
        let supplier_id = body["data"]["id"].as_i64().unwrap();

        for (code, kind, active) in [("F1", "fabric", true), ("F2", "fabric", true), ("F3", "fabric", false), ("J1", "jeans", true)] {
            let (status, _) = app
                .send(
                    Method::POST,
                    "/api/materials",
                    Some(json!({
                        "code": code, "name": code, "type": kind,
                        "buy_price": "120.50", "supplier_id": supplier_id.to_string(), "active": active
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = app.send(Method::GET, "/api/materials?type=fabric", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["total_count"], 2);

        let (_, body) = app
            .send(Method::GET, "/api/materials?type=fabric&active=all&limit=2&offset=1", None)
            .await;
        assert_eq!(body["total_count"], 3);
        let codes: Vec<&str> = body["data"].as_array().unwrap().iter().map(|m| m["code"].as_str().unwrap()).collect();
        assert_eq!(codes, ["F2", "F3"]);

        let (status, body) = app.send(Method::GET, "/api/materials?type=wool", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["type"].is_array());

        let (_, body) = app
            .send(Method::GET, &format!("/api/suppliers/{supplier_id}?include_materials=true"), None)
            .await;
        assert_eq!(body["data"]["material_count"], 4);
        assert_eq!(body["data"]["materials"].as_array().unwrap().len(), 4);

        let (_, body) = app
            .send(Method::GET, &format!("/api/suppliers/{supplier_id}/materials"), None)
            .await;
        assert_eq!(body["data"]["supplier"]["code"], "SUP1");
        assert_eq!(body["count"], 4);
    }

    #[tokio::test]
    async fn duplicate_codes_conflict_and_unknown_ids_are_not_found() {
        let app = TestApp::new();
        let supplier = json!({"code": "sup_1", "name": "Acme"});

        let (status, body) = app.send(Method::POST, "/api/suppliers", Some(supplier.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["code"], "SUP_1");

        let (status, _) = app.send(Method::POST, "/api/suppliers", Some(supplier)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = app.send(Method::GET, "/api/materials/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Material not found");

        let (status, _) = app.send(Method::GET, "/api/suppliers/999/materials", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn jsonrpc_dispatches_by_operation() {
        let app = TestApp::new();

        let created = app
            .rpc("/jsonrpc/suppliers", json!({"operation": "create", "code": "SUP1", "name": "Acme"}))
            .await;
        assert_eq!(created["success"], true);
        assert_eq!(created["message"], "Supplier created successfully");
        let supplier_id = created["data"]["id"].as_i64().unwrap();

        let material = app
            .rpc(
                "/jsonrpc/materials",
                json!({
                    "operation": "create", "code": "m1", "name": "Denim",
                    "type": "jeans", "buy_price": 300, "supplier_id": supplier_id
                }),
            )
            .await;
        assert_eq!(material["success"], true);
        let material_id = material["data"]["id"].as_i64().unwrap();

        // Sem `operation`: list na coleção, get no registro
        let listed = app.rpc("/jsonrpc/materials", json!({})).await;
        assert_eq!(listed["count"], 1);
        assert_eq!(listed["total_count"], 1);

        let fetched = app.rpc(&format!("/jsonrpc/materials/{material_id}"), json!({})).await;
        assert_eq!(fetched["data"]["code"], "M1");

        let rejected = app
            .rpc(&format!("/jsonrpc/materials/{material_id}"), json!({"operation": "update", "buy_price": 10}))
            .await;
        assert_eq!(rejected["success"], false);
        assert!(rejected["details"]["buy_price"].is_array());

        let blocked = app
            .rpc(&format!("/jsonrpc/suppliers/{supplier_id}"), json!({"operation": "delete"}))
            .await;
        assert_eq!(blocked["success"], false);
        assert_eq!(blocked["error"], "Cannot delete supplier. It has 1 associated materials.");

        let invalid = app.rpc("/jsonrpc/materials", json!({"operation": "purge"})).await;
        assert_eq!(invalid["success"], false);
        assert_eq!(invalid["error"], "Invalid operation: purge. Use \"list\" or \"create\"");

        let invalid = app
            .rpc(&format!("/jsonrpc/suppliers/{supplier_id}"), json!({"operation": "purge"}))
            .await;
        assert_eq!(invalid["error"], "Invalid operation: purge. Use \"get\", \"update\", or \"delete\"");

        let listing = app
            .rpc(&format!("/jsonrpc/suppliers/{supplier_id}/materials"), json!({}))
            .await;
        assert_eq!(listing["count"], 1);
        assert_eq!(listing["data"]["supplier"]["name"], "Acme");
    }

    #[tokio::test]
    async fn non_numeric_ids_keep_the_error_envelope() {
        let app = TestApp::new();

        let (status, body) = app.send(Method::GET, "/api/materials/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().starts_with("Invalid path parameter"));

        let (status, body) = app
            .send(Method::PUT, "/api/suppliers/abc", Some(json!({"name": "Acme"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, body) = app.send(Method::GET, "/api/suppliers/1x/materials", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let result = app.rpc("/jsonrpc/materials/abc", json!({"operation": "get"})).await;
        assert_eq!(result["success"], false);
        assert!(result["error"].as_str().unwrap().starts_with("Invalid path parameter"));

        let result = app.rpc("/jsonrpc/suppliers/abc/materials", json!({})).await;
        assert_eq!(result["success"], false);
    }

    #[tokio::test]
    async fn material_codes_are_unique_after_normalization() {
        let app = TestApp::new();
        let (_, body) = app
            .send(Method::POST, "/api/suppliers", Some(json!({"code": "SUP1", "name": "Acme"})))
            .await;
        let supplier_id = body["data"]["id"].as_i64().unwrap();
        let material = |code: &str| {
            json!({"code": code, "name": "Denim", "type": "jeans", "buy_price": 150, "supplier_id": supplier_id})
        };

        let (status, _) = app.send(Method::POST, "/api/materials", Some(material("m1"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app.send(Method::POST, "/api/materials", Some(material(" M1 "))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "A record with code 'M1' already exists.");

        let (_, body) = app.send(Method::POST, "/api/materials", Some(material("m2"))).await;
        let second_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .send(Method::PUT, &format!("/api/materials/{second_id}"), Some(json!({"code": "m1"})))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn price_range_and_float_ids_are_checked_before_storage() {
        let app = TestApp::new();
        let (_, body) = app
            .send(Method::POST, "/api/suppliers", Some(json!({"code": "SUP1", "name": "Acme"})))
            .await;
        let supplier_id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = app
            .send(
                Method::POST,
                "/api/materials",
                Some(json!({
                    "code": "m1", "name": "Denim", "type": "jeans",
                    "buy_price": 1e30, "supplier_id": supplier_id
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["buy_price"][0], "Buy price must be at most 999999999999.99");

        let (status, body) = app
            .send(
                Method::POST,
                "/api/materials",
                Some(json!({
                    "code": "m1", "name": "Denim", "type": "jeans",
                    "buy_price": 250, "supplier_id": supplier_id as f64
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["supplier_id"], supplier_id);
    }

    #[tokio::test]
    async fn supplier_update_and_list_query_over_http() {
        let app = TestApp::new();
        let (_, body) = app
            .send(Method::POST, "/api/suppliers", Some(json!({"code": "SUP1", "name": "Acme"})))
            .await;
        let acme_id = body["data"]["id"].as_i64().unwrap();
        app.send(Method::POST, "/api/suppliers", Some(json!({"code": "SUP2", "name": "Beta Textiles"})))
            .await;

        let (status, body) = app
            .send(
                Method::PUT,
                &format!("/api/suppliers/{acme_id}"),
                Some(json!({"name": "Acme Ltda", "active": false})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Supplier updated successfully");
        assert_eq!(body["data"]["name"], "Acme Ltda");
        assert_eq!(body["data"]["code"], "SUP1");
        assert_eq!(body["data"]["active"], false);

        // Sem filtro: só ativos
        let (status, body) = app.send(Method::GET, "/api/suppliers", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["code"], "SUP2");

        // `code=` vazio é ignorado
        let (_, body) = app.send(Method::GET, "/api/suppliers?name=acme&code=&active=all", None).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["name"], "Acme Ltda");

        let (_, body) = app.send(Method::GET, "/api/suppliers?code=sup&active=all", None).await;
        assert_eq!(body["count"], 2);

        let (_, body) = app.send(Method::GET, "/api/suppliers?active=false", None).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["id"], acme_id);

        let (status, body) = app.send(Method::GET, "/api/suppliers?active=maybe", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["active"].is_array());
    }
}

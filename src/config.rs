// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{MaterialRepository, MemoryCatalog, PgMaterialRepository, PgSupplierRepository, SupplierRepository},
    services::{auth::AuthService, material_service::MaterialService, supplier_service::SupplierService},
};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Sem `DATABASE_URL` o catálogo roda em memória.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt_secret: String,
    pub addr: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        let addr = env::var("APP_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

        Ok(Self {
            database_url,
            max_connections,
            jwt_secret,
            addr,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    /// Presente só quando o backend é Postgres (usado para as migrações).
    pub db_pool: Option<PgPool>,
    pub material_service: MaterialService,
    pub supplier_service: SupplierService,
    pub auth_service: AuthService,
    pub i18n_store: Arc<I18nStore>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(database_url) = &config.database_url else {
            tracing::warn!("DATABASE_URL não definida: usando catálogo em memória");
            return Ok(Self::in_memory(config.jwt_secret.clone()));
        };

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let materials: Arc<dyn MaterialRepository> = Arc::new(PgMaterialRepository::new(db_pool.clone()));
        let suppliers: Arc<dyn SupplierRepository> = Arc::new(PgSupplierRepository::new(db_pool.clone()));

        Ok(Self::assemble(Some(db_pool), materials, suppliers, config.jwt_secret.clone()))
    }

    pub fn in_memory(jwt_secret: String) -> Self {
        let catalog = Arc::new(MemoryCatalog::new());
        Self::assemble(None, catalog.clone(), catalog, jwt_secret)
    }

    fn assemble(
        db_pool: Option<PgPool>,
        materials: Arc<dyn MaterialRepository>,
        suppliers: Arc<dyn SupplierRepository>,
        jwt_secret: String,
    ) -> Self {
        Self {
            db_pool,
            material_service: MaterialService::new(materials.clone(), suppliers.clone()),
            supplier_service: SupplierService::new(suppliers, materials),
            auth_service: AuthService::new(jwt_secret),
            i18n_store: Arc::new(I18nStore::new()),
        }
    }
}

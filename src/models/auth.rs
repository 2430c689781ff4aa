// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Estrutura de dados ("claims") dentro do JWT emitido pelo provedor de identidade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// O usuário autenticado de uma requisição. Não há tabela de usuários aqui:
// a sessão pertence ao sistema externo, só confiamos no token assinado.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
}

impl From<Claims> for User {
    fn from(claims: Claims) -> Self {
        Self { id: claims.sub }
    }
}

// src/services/auth.rs

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, User},
};

/// Valida os tokens emitidos pelo provedor de identidade (HS256, segredo compartilhado).
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    pub fn validate_token(&self, token: &str) -> Result<User, AppError> {
        // Validation::default() exige `exp` e HS256
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        Ok(token_data.claims.into())
    }

    /// Emite um token como o provedor faria. Só existe para os testes.
    #[cfg(test)]
    pub fn issue_token(&self, user_id: uuid::Uuid) -> String {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + chrono::Duration::hours(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .expect("falha ao assinar token de teste")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    #[test]
    fn accepts_tokens_signed_with_the_shared_secret() {
        let service = AuthService::new("segredo".into());
        let user_id = Uuid::new_v4();

        let user = service.validate_token(&service.issue_token(user_id)).unwrap();
        assert_eq!(user.id, user_id);
    }

    #[test]
    fn rejects_foreign_and_expired_tokens() {
        let service = AuthService::new("segredo".into());

        let other = AuthService::new("outro".into()).issue_token(Uuid::new_v4());
        assert!(matches!(service.validate_token(&other), Err(AppError::InvalidToken)));

        let expired = Claims {
            sub: Uuid::new_v4(),
            exp: 1_000,
            iat: 0,
        };
        let token = encode(&Header::default(), &expired, &EncodingKey::from_secret(b"segredo")).unwrap();
        assert!(matches!(service.validate_token(&token), Err(AppError::InvalidToken)));

        assert!(matches!(service.validate_token("lixo"), Err(AppError::InvalidToken)));
    }
}

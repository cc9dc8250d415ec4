use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use fleet_core::identity::{Principal, Role};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Session token claims issued by the identity collaborator. The role claim
/// is trusted as given.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
    pub role: Role,
    pub exp: usize,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Decodes the bearer token and injects a [`Principal`] into request
/// extensions for downstream handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut()
        .insert(Principal::from(token_data.claims));

    Ok(next.run(req).await)
}

/// Role gate used at the top of each handler.
pub fn require_role(principal: &Principal, role: Role) -> Result<(), AppError> {
    if principal.role == role {
        Ok(())
    } else {
        Err(AppError::AuthorizationError(format!(
            "requires the {} role",
            role.as_str()
        )))
    }
}

/// Admin or the named role; admin bypasses most ownership checks.
pub fn require_role_or_admin(principal: &Principal, role: Role) -> Result<(), AppError> {
    if principal.role == role || principal.is_admin() {
        Ok(())
    } else {
        Err(AppError::AuthorizationError(format!(
            "requires the {} or admin role",
            role.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(role: Role, secret: &str) -> String {
        let claims = Claims {
            sub: "user-1".into(),
            email: Some("user@example.com".into()),
            role,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn claims_round_trip_through_jwt() {
        let token = token_for(Role::Driver, "test-secret");
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, "user-1");
        assert_eq!(decoded.claims.role, Role::Driver);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = token_for(Role::Client, "test-secret");
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn role_gates() {
        let admin = Principal {
            id: "a".into(),
            email: None,
            role: Role::Admin,
        };
        let client = Principal {
            id: "c".into(),
            email: None,
            role: Role::Client,
        };
        assert!(require_role(&admin, Role::Admin).is_ok());
        assert!(require_role(&client, Role::Admin).is_err());
        assert!(require_role_or_admin(&admin, Role::Client).is_ok());
        assert!(require_role_or_admin(&client, Role::Client).is_ok());
        assert!(require_role_or_admin(&client, Role::Driver).is_err());
    }
}

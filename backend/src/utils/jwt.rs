use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::caller::{Caller, CallerRole};
use crate::types::OperatorId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // operator id
    pub role: String,
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
    pub jti: String, // JWT ID
}

impl Claims {
    pub fn new(operator_id: OperatorId, role: CallerRole, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: operator_id.to_string(),
            role: role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Resolves the caller; unknown role names are treated as read-only.
    pub fn caller(&self) -> anyhow::Result<Caller> {
        let id: OperatorId = self
            .sub
            .parse()
            .map_err(|_| anyhow::anyhow!("token subject is not an operator id"))?;
        Ok(Caller::new(id, CallerRole::parse_lenient(&self.role)))
    }
}

pub fn create_access_token(
    operator_id: OperatorId,
    role: CallerRole,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    let claims = Claims::new(operator_id, role, expiration_hours);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_round_trips_the_caller() {
        let operator = OperatorId::new();
        let token = create_access_token(operator, CallerRole::Observer, "secret", 1)
            .expect("create token");
        let claims = verify_access_token(&token, "secret").expect("verify token");
        assert_eq!(claims.role, "observer");
        let caller = claims.caller().expect("caller");
        assert_eq!(caller.id, operator);
        assert_eq!(caller.role, CallerRole::Observer);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_access_token(OperatorId::new(), CallerRole::Admin, "secret", 1)
            .expect("create token");
        assert!(verify_access_token(&token, "other").is_err());
    }

    #[test]
    fn unknown_role_degrades_to_registrant() {
        let mut claims = Claims::new(OperatorId::new(), CallerRole::Admin, 1);
        claims.role = "donor".into();
        assert_eq!(claims.caller().expect("caller").role, CallerRole::Registrant);
    }

    #[test]
    fn malformed_subject_is_an_error() {
        let mut claims = Claims::new(OperatorId::new(), CallerRole::Admin, 1);
        claims.sub = "not-a-uuid".into();
        assert!(claims.caller().is_err());
    }
}

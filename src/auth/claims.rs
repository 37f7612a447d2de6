use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims read out of a bearer token for display only.
///
/// The signature is NOT verified; nothing here may feed an access decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|exp| exp <= now).unwrap_or(false)
    }
}

/// Decode the token's payload if it is a JWT; opaque tokens yield `None`
pub fn peek_claims(token: &str) -> Option<TokenClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("Token is not a readable JWT: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};

    #[test]
    fn test_peek_reads_unverified_claims() {
        let exp = (Utc::now() + Duration::hours(2)).timestamp();
        let claims = TokenClaims {
            sub: Some("42".into()),
            email: Some("ana@ferreteria.bo".into()),
            role: Some("VENDEDOR".into()),
            iat: Some(Utc::now().timestamp()),
            exp: Some(exp),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-only")).unwrap();

        let peeked = peek_claims(&token).expect("jwt decodes");
        assert_eq!(peeked.sub.as_deref(), Some("42"));
        assert_eq!(peeked.expires_at().map(|t| t.timestamp()), Some(exp));
        assert!(!peeked.is_expired_at(Utc::now()));
        assert!(peeked.is_expired_at(Utc::now() + Duration::hours(3)));
    }

    #[test]
    fn test_opaque_token_has_no_claims() {
        assert!(peek_claims("not-a-jwt").is_none());
    }
}

//! Interpretation of raw GraphQL responses.

use serde::Deserialize;
use serde_json::Value;

use crate::error::GraphQLError;

/// Error codes that mean the credential itself was rejected
const AUTH_CODES: [&str; 2] = ["UNAUTHENTICATED", "UNAUTHORIZED"];

/// Message fragments (lowercased) that mean the same when no code is sent
const AUTH_MESSAGES: [&str; 6] = [
    "unauthorized",
    "unauthenticated",
    "jwt expired",
    "invalid token",
    "token expired",
    "no autorizado",
];

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

/// What a response means for the caller and for the session
#[derive(Debug)]
pub enum Reply {
    Data(Value),
    /// Credential rejected: the session must be dropped
    Unauthenticated(Vec<GraphQLError>),
    /// Any other error list, passed through verbatim
    Rejected(Vec<GraphQLError>),
    /// Non-2xx status without a readable GraphQL body
    HttpFailure { status: u16, body: String },
    /// 2xx status but the body is not a GraphQL response
    Malformed(String),
}

/// A code, when present, decides; the message is only read when none is sent
pub fn is_auth_error(error: &GraphQLError) -> bool {
    match error.code() {
        Some(code) => AUTH_CODES.contains(&code),
        None => {
            let message = error.message.to_lowercase();
            AUTH_MESSAGES.iter().any(|fragment| message.contains(fragment))
        }
    }
}

pub fn classify(status: u16, body: &str) -> Reply {
    let envelope = serde_json::from_str::<Envelope>(body);

    if status == 401 {
        let errors = match envelope {
            Ok(Envelope { errors: Some(errors), .. }) => errors,
            _ => Vec::new(),
        };
        return Reply::Unauthenticated(errors);
    }

    let envelope = match envelope {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => return Reply::Malformed(e.to_string()),
        Err(_) => {
            return Reply::HttpFailure {
                status,
                body: body.chars().take(200).collect(),
            }
        }
    };

    match envelope {
        Envelope { errors: Some(errors), .. } if !errors.is_empty() => {
            if errors.iter().any(is_auth_error) {
                Reply::Unauthenticated(errors)
            } else {
                Reply::Rejected(errors)
            }
        }
        Envelope { data: Some(data), .. } => Reply::Data(data),
        Envelope { data: None, .. } if (200..300).contains(&status) => {
            Reply::Malformed("response has neither data nor errors".to_string())
        }
        Envelope { data: None, .. } => Reply::HttpFailure {
            status,
            body: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_401_is_auth_failure_whatever_the_body() {
        assert!(matches!(classify(401, "Unauthorized"), Reply::Unauthenticated(e) if e.is_empty()));
    }

    #[test]
    fn test_auth_code_and_message_detection() {
        let by_code = json!({ "errors": [{ "message": "nope", "extensions": { "code": "UNAUTHENTICATED" } }] });
        assert!(matches!(classify(200, &by_code.to_string()), Reply::Unauthenticated(_)));

        let by_message = json!({ "data": null, "errors": [{ "message": "Unauthorized" }] });
        assert!(matches!(classify(200, &by_message.to_string()), Reply::Unauthenticated(_)));

        assert!(is_auth_error(&GraphQLError::new("jwt expired")));
        assert!(is_auth_error(&GraphQLError::new("Acceso no autorizado")));
    }

    #[test]
    fn test_coded_error_is_not_read_by_message() {
        let forbidden = json!({ "data": null, "errors": [{
            "message": "No autorizado: solo ADMIN puede anular movimientos",
            "extensions": { "code": "FORBIDDEN" }
        }] });
        assert!(matches!(classify(200, &forbidden.to_string()), Reply::Rejected(_)));

        let input = GraphQLError::new("Usuario no autorizado para este almacén").with_code("BAD_USER_INPUT");
        assert!(!is_auth_error(&input));
    }

    #[test]
    fn test_null_data_on_error_status_is_http_failure() {
        let body = json!({ "data": null });
        assert!(matches!(classify(500, &body.to_string()), Reply::HttpFailure { status: 500, .. }));
        assert!(matches!(classify(200, &body.to_string()), Reply::Malformed(_)));
    }

    #[test]
    fn test_business_errors_pass_through() {
        let body = json!({ "errors": [{ "message": "Stock insuficiente en el almacén" }] });
        match classify(200, &body.to_string()) {
            Reply::Rejected(errors) => assert_eq!(errors[0].message, "Stock insuficiente en el almacén"),
            other => panic!("unexpected {:?}", other),
        }

        // Apollo answers validation failures with 400 and a GraphQL body
        let body = json!({ "errors": [{ "message": "Variable \"$id\" got invalid value" }] });
        assert!(matches!(classify(400, &body.to_string()), Reply::Rejected(_)));
    }

    #[test]
    fn test_data_and_garbage() {
        let body = json!({ "data": { "me": { "id": "1" } } });
        assert!(matches!(classify(200, &body.to_string()), Reply::Data(_)));
        assert!(matches!(classify(200, "<html>"), Reply::Malformed(_)));
        assert!(matches!(
            classify(502, "Bad Gateway"),
            Reply::HttpFailure { status: 502, .. }
        ));
    }
}

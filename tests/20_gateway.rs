mod common;

use anyhow::Result;
use serde_json::{json, Value};

use ferreteria_console::auth::{SessionEnd, SessionState};
use ferreteria_console::config::ApiConfig;
use ferreteria_console::error::ClientError;
use ferreteria_console::gateway::{Gateway, Operation};
use ferreteria_console::models::Warehouse;
use ferreteria_console::services::{CatalogService, InventoryService};
use ferreteria_console::types::Role;

const PING: Operation = Operation::query("Ping", "ping", "query Ping { ping }");

#[tokio::test]
async fn every_request_carries_fresh_credentials_and_no_cache() -> Result<()> {
    let api = common::FakeApi::start().await?;
    api.data("Ping", json!({ "ping": "pong" }));
    api.data("Ping", json!({ "ping": "pong" }));

    let session = common::signed_in(Role::Vendedor);
    let gateway = api.gateway(session.clone());

    let _: String = gateway.execute(&PING, json!({})).await?;
    session.login("rotated-token")?;
    let _: String = gateway.execute(&PING, json!({})).await?;

    let seen = api.seen();
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer integration-token"));
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer rotated-token"));
    for request in &seen {
        assert_eq!(request.cache_control.as_deref(), Some("no-cache"));
        assert!(request.request_id.is_some());
    }
    assert_ne!(seen[0].request_id, seen[1].request_id);
    Ok(())
}

#[tokio::test]
async fn unauthorized_ends_session_exactly_once() -> Result<()> {
    let api = common::FakeApi::start().await?;
    api.reply("GetAlmacenes", 401, json!({ "errors": [{ "message": "Unauthorized" }] }));
    api.error("GetAlmacenes", "jwt expired", None);

    let session = common::signed_in(Role::Almacenista);
    let mut changes = session.subscribe();
    let _ = changes.borrow_and_update();
    let catalog = CatalogService::new(api.gateway(session.clone()));

    let first = catalog.list::<Warehouse>().await.unwrap_err();
    assert!(matches!(first, ClientError::SessionExpired));
    assert!(!first.is_displayable());
    assert_eq!(session.current_state(), SessionState::Anonymous);
    assert_eq!(session.snapshot().ended(), Some(SessionEnd::Expired));
    assert!(changes.has_changed()?);
    let _ = changes.borrow_and_update();

    // A second rejection finds no credential left; nothing changes again
    let second = catalog.list::<Warehouse>().await.unwrap_err();
    assert!(matches!(second, ClientError::SessionExpired));
    assert!(!changes.has_changed()?);
    assert_eq!(api.seen()[1].authorization, None);
    Ok(())
}

#[tokio::test]
async fn application_errors_pass_through_verbatim() -> Result<()> {
    let api = common::FakeApi::start().await?;
    api.error("AnularMovimiento", "El movimiento ya fue anulado", Some("BAD_USER_INPUT"));

    let session = common::signed_in(Role::Almacenista);
    let inventory = InventoryService::new(api.gateway(session.clone()));

    let err = inventory.void(9, "duplicado").await.unwrap_err();
    match &err {
        ClientError::Application(errors) => {
            assert_eq!(errors[0].message, "El movimiento ya fue anulado");
            assert_eq!(errors[0].code(), Some("BAD_USER_INPUT"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(session.current_state(), SessionState::Authenticated(_)));
    assert_eq!(api.variables("AnularMovimiento")[0], json!({ "id": 9, "motivo": "duplicado" }));
    Ok(())
}

#[tokio::test]
async fn server_failure_is_retryable_and_keeps_session() -> Result<()> {
    let api = common::FakeApi::start().await?;
    api.reply("Ping", 502, Value::String("bad gateway".into()));

    let session = common::signed_in(Role::Vendedor);
    let err = api.gateway(session.clone()).execute::<Value>(&PING, json!({})).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "Transport error: HTTP 502");
    assert!(matches!(session.current_state(), SessionState::Authenticated(_)));
    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() -> Result<()> {
    let port = portpicker::pick_unused_port().expect("free port");
    let api = ApiConfig {
        endpoint: format!("http://127.0.0.1:{}/graphql", port).parse()?,
        timeout_secs: 2,
        user_agent: "ferre-tests".to_string(),
    };
    let session = common::signed_in(Role::Vendedor);
    let gateway = Gateway::new(&api, session.clone())?;

    let err = gateway.execute::<Value>(&PING, json!({})).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(session.token().is_some());
    Ok(())
}

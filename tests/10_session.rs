mod common;

use anyhow::Result;
use serde_json::json;

use ferreteria_console::auth::{
    AccessGuard, Decision, FileTokenStore, IdentityResolver, Requirement, SessionEnd, SessionState, TokenStore,
};
use ferreteria_console::services::AuthService;
use ferreteria_console::types::{Action, Resource, Role};

#[tokio::test]
async fn login_as_warehouse_keeper_gates_by_role() -> Result<()> {
    let api = common::FakeApi::start().await?;
    api.data("Login", json!({ "login": "jwt-alma" }));
    api.data("Me", common::me("ALMACENISTA"));

    let dir = tempfile::tempdir()?;
    let session = common::file_session(dir.path());
    let guard = AccessGuard::new(session.clone());
    assert_eq!(guard.check(&Requirement::authenticated()), Decision::DenyUnauthenticated);

    let state = AuthService::new(api.gateway(session.clone()))
        .login("alma@ferreteria.bo", "secret")
        .await?;
    assert!(matches!(state, SessionState::Authenticated(ref i) if i.role == Role::Almacenista));

    assert_eq!(
        guard.check(&Requirement::permission(Resource::Inventario, Action::View)),
        Decision::Allow
    );
    let denied = guard.check(&Requirement::permission(Resource::Usuarios, Action::View));
    assert_eq!(denied, Decision::DenyRedirect);
    assert_eq!(denied.redirect(), Some("/app/dashboard"));

    // Login itself is sent without credentials, `me` with the new token
    let seen = api.seen();
    assert_eq!(seen[0].operation, "Login");
    assert_eq!(seen[0].authorization, None);
    assert_eq!(seen[1].operation, "Me");
    assert_eq!(seen[1].authorization.as_deref(), Some("Bearer jwt-alma"));
    Ok(())
}

#[tokio::test]
async fn stored_token_survives_restart_until_logout() -> Result<()> {
    let api = common::FakeApi::start().await?;
    api.data("Me", common::me("VENDEDOR"));

    let dir = tempfile::tempdir()?;
    FileTokenStore::in_dir(dir.path()).save("jwt-stored")?;

    let session = common::file_session(dir.path());
    assert_eq!(session.current_state(), SessionState::Loading);
    assert_eq!(
        AccessGuard::new(session.clone()).check(&Requirement::authenticated()),
        Decision::Pending
    );

    let state = IdentityResolver::new(api.gateway(session.clone()))
        .ensure_resolved()
        .await?;
    assert!(matches!(state, SessionState::Authenticated(ref i) if i.role == Role::Vendedor));

    session.logout();
    assert_eq!(session.current_state(), SessionState::Anonymous);
    assert_eq!(session.snapshot().ended(), Some(SessionEnd::LoggedOut));
    assert_eq!(FileTokenStore::in_dir(dir.path()).load()?, None);

    // Logging out again is harmless
    session.logout();
    assert_eq!(session.current_state(), SessionState::Anonymous);

    let reopened = common::file_session(dir.path());
    assert_eq!(reopened.current_state(), SessionState::Anonymous);
    Ok(())
}

#[tokio::test]
async fn rejected_login_keeps_session_anonymous() -> Result<()> {
    let api = common::FakeApi::start().await?;
    api.error("Login", "Credenciales inválidas", Some("UNAUTHENTICATED"));

    let dir = tempfile::tempdir()?;
    let session = common::file_session(dir.path());
    let err = AuthService::new(api.gateway(session.clone()))
        .login("x@ferreteria.bo", "wrong")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Credenciales inválidas");
    assert_eq!(session.current_state(), SessionState::Anonymous);
    assert_eq!(session.snapshot().ended(), None);
    assert_eq!(api.calls("Me"), 0);
    Ok(())
}

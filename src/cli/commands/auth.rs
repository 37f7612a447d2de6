use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::auth::claims::peek_claims;
use crate::auth::guard::route_after;
use crate::auth::permissions::grants;
use crate::auth::SessionState;
use crate::cli::config::token_store;
use crate::cli::utils::*;
use crate::cli::{Console, OutputFormat};
use crate::services::AuthService;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Create an account and sign in with it")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show the stored token without contacting the server")]
    Status,

    #[command(about = "Show current user and what the role may do")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open()?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_stdin_line("Password")?,
            };
            let state = AuthService::new(console.gateway().clone()).login(&email, &password).await?;
            signed_in(&output_format, state, "Logged in")
        }
        AuthCommands::Register { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_stdin_line("Password")?,
            };
            let state = AuthService::new(console.gateway().clone())
                .register(&email, &password)
                .await?;
            signed_in(&output_format, state, "Registered")
        }
        AuthCommands::Logout => {
            AuthService::new(console.gateway().clone()).logout();
            let next = console.session().snapshot().ended().map(route_after);
            output_success(&output_format, "Logged out", Some(json!({ "next": next })))
        }
        AuthCommands::Status => {
            let token = console.session().token();
            let saved_at = token_store()?.saved_at()?;
            let claims = token.as_deref().and_then(peek_claims);

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "token_stored": token.is_some(),
                            "saved_at": saved_at,
                            "claims": claims,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    if token.is_none() {
                        println!("Not logged in");
                        return Ok(());
                    }
                    println!("Token stored");
                    if let Some(at) = saved_at {
                        println!("Saved: {}", at.format("%Y-%m-%d %H:%M"));
                    }
                    match claims {
                        Some(claims) => {
                            if let Some(sub) = &claims.sub {
                                println!("Subject: {}", sub);
                            }
                            if let Some(exp) = claims.expires_at() {
                                let note = if claims.is_expired_at(Utc::now()) { " (expired)" } else { "" };
                                println!("Expires: {}{}", exp.format("%Y-%m-%d %H:%M"), note);
                            }
                        }
                        None => println!("Token is opaque; run `ferre auth whoami` to check it"),
                    }
                }
            }
            Ok(())
        }
        AuthCommands::Whoami => match console.resolve().await? {
            SessionState::Authenticated(identity) => {
                let allowed = grants(identity.role)
                    .into_iter()
                    .map(|(resource, action)| format!("{}:{}", resource, action))
                    .collect::<Vec<_>>();
                match output_format {
                    OutputFormat::Json => {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&json!({ "user": identity, "permissions": allowed }))?
                        );
                    }
                    OutputFormat::Text => {
                        println!("{} ({})", identity.email, identity.role);
                        println!("ID: {}", identity.id);
                        println!("Permissions: {}", allowed.join(", "));
                    }
                }
                Ok(())
            }
            _ => console.authorize(crate::auth::Requirement::authenticated()).await.map(|_| ()),
        },
    }
}

fn signed_in(output_format: &OutputFormat, state: SessionState, verb: &str) -> anyhow::Result<()> {
    match state {
        SessionState::Authenticated(identity) => output_success(
            output_format,
            &format!("{} as {} ({})", verb, identity.email, identity.role),
            Some(json!({ "user": identity })),
        ),
        _ => anyhow::bail!("the server issued a token but did not recognise it"),
    }
}

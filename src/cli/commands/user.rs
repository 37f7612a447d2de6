use clap::Subcommand;
use serde_json::json;

use crate::auth::Requirement;
use crate::cli::utils::*;
use crate::cli::{Console, OutputFormat};
use crate::models::{NewUser, UserUpdate};
use crate::services::UserService;
use crate::types::{Action, Resource, Role};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users")]
    List,

    #[command(about = "Show one user")]
    Show {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Create a user")]
    Create {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
        #[arg(long, default_value = "VENDEDOR", help = "ADMIN, VENDEDOR or ALMACENISTA")]
        role: Role,
    },

    #[command(about = "Update a user's email, password or role")]
    Update {
        #[arg(help = "User ID")]
        id: String,
        #[arg(long, help = "New email")]
        email: Option<String>,
        #[arg(long, help = "New password")]
        password: Option<String>,
        #[arg(long, help = "New role")]
        role: Option<Role>,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "User ID")]
        id: String,
    },
}

fn requirement(action: Action) -> Requirement {
    Requirement::permission(Resource::Usuarios, action).with_roles([Role::Admin])
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = Console::open()?;
    let users = UserService::new(console.gateway().clone());

    match cmd {
        UserCommands::List => {
            console.authorize(requirement(Action::View)).await?;
            let list = users.list().await?;
            output_collection(
                &output_format,
                "users",
                &list,
                &format!("{:<38} {:<30} {}", "ID", "EMAIL", "ROLE"),
                |u| format!("{:<38} {:<30} {}", u.id, u.email, u.role),
            )
        }
        UserCommands::Show { id } => {
            console.authorize(requirement(Action::View)).await?;
            let user = users.get(&id).await?;
            output_record(&output_format, "user", user.as_ref())
        }
        UserCommands::Create { email, password, role } => {
            console.authorize(requirement(Action::Create)).await?;
            let password = match password {
                Some(p) => p,
                None => read_stdin_line("Password")?,
            };
            let user = users.create(&NewUser { email, password, role }).await?;
            output_success(
                &output_format,
                &format!("Created user {} ({})", user.email, user.role),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::Update {
            id,
            email,
            password,
            role,
        } => {
            console.authorize(requirement(Action::Edit)).await?;
            let user = users.update(&id, &UserUpdate { email, password, role }).await?;
            output_success(
                &output_format,
                &format!("Updated user {}", user.email),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::Delete { id } => {
            console.authorize(requirement(Action::Delete)).await?;
            if !users.remove(&id).await? {
                anyhow::bail!("user {} was not deleted", id);
            }
            output_success(&output_format, &format!("Deleted user {}", id), Some(json!({ "id": id })))
        }
    }
}

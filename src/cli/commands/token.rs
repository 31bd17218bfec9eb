use clap::Subcommand;
use serde_json::json;

use crate::auth::{Role, TokenAuthority, TokenSubject};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a session token with the configured JWT settings")]
    Issue {
        #[arg(long, help = "Role: user, mechanic, store_owner or admin")]
        role: Role,
        #[arg(long, help = "User id")]
        id: String,
        #[arg(long, help = "Email claim")]
        email: Option<String>,
        #[arg(long, help = "Display name claim")]
        name: Option<String>,
    },

    #[command(about = "Verify a session token and print its identity")]
    Verify {
        #[arg(help = "Token, with or without the 'Bearer ' prefix")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let authority = TokenAuthority::from_config(&config.security)?;

    match cmd {
        TokenCommands::Issue { role, id, email, name } => {
            let mut subject = TokenSubject::new(id, role);
            if let Some(email) = email {
                subject = subject.with_email(email);
            }
            if let Some(name) = name {
                subject = subject.with_name(name);
            }

            let token = authority.issue(&subject)?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    &format!("Issued {} token for '{}'", role, subject.id),
                    Some(json!({
                        "token": token,
                        "cookie": config.session.cookie_name,
                        "expires_in": authority.ttl().num_seconds(),
                    })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Verify { token } => match authority.decode(&token) {
            Ok(identity) => output_success(
                &output_format,
                &format!("Token valid: {} '{}' until {}", identity.role, identity.id, identity.expires_at),
                Some(json!({ "identity": identity })),
            ),
            Err(e) => {
                output_error(&output_format, &e.to_string(), Some("INVALID_CREDENTIAL"))?;
                anyhow::bail!("token rejected")
            }
        },
    }
}

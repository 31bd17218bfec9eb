use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::middleware::{Decision, PartitionOutcome};
use crate::server::build_gate;

#[derive(Subcommand)]
pub enum RoutesCommands {
    #[command(about = "List protected partitions and sign-in landing pages")]
    List,

    #[command(about = "Show what the gate would do with a request")]
    Check {
        #[arg(help = "Request path, e.g. /screens/client/dashboard")]
        path: String,
        #[arg(long, help = "Session token to present as the cookie value")]
        token: Option<String>,
    },
}

pub async fn handle(cmd: RoutesCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let gate = build_gate(config)?;

    match cmd {
        RoutesCommands::List => {
            let table = gate.table();
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Partition table",
                    Some(json!({
                        "protected": table.protected(),
                        "landing": table.landing(),
                    })),
                ),
                OutputFormat::Text => {
                    println!("Protected partitions:");
                    for rule in table.protected() {
                        println!("  {:<24} {:<12} -> {}", rule.prefix, rule.required_role, rule.auth_landing);
                    }
                    println!("Sign-in landing pages:");
                    for rule in table.landing() {
                        println!("  {:<24} {:<12} -> {}", rule.prefix, rule.role, rule.dashboard);
                    }
                    Ok(())
                }
            }
        }
        RoutesCommands::Check { path, token } => {
            let partition = match gate.table().resolve(&path) {
                PartitionOutcome::Protected { required_role, .. } => format!("protected ({})", required_role),
                PartitionOutcome::AuthLanding { role, .. } => format!("sign-in landing ({})", role),
                PartitionOutcome::Unrestricted => "unrestricted".to_string(),
            };

            let decision = gate.decide(&path, token.as_deref()).await;
            let (summary, data) = match &decision {
                Decision::Allow(Some(identity)) => (
                    format!("allow {} as {} '{}'", path, identity.role, identity.id),
                    json!({ "decision": "allow", "identity": identity }),
                ),
                Decision::Allow(None) => (
                    format!("allow {}", path),
                    json!({ "decision": "allow" }),
                ),
                Decision::RedirectToAuth { target, reason } => (
                    format!("redirect {} -> {} ({})", path, target, reason),
                    json!({ "decision": "redirect_to_auth", "target": target, "reason": reason.to_string() }),
                ),
                Decision::RedirectToDashboard(target) => (
                    format!("redirect {} -> {} (already signed in)", path, target),
                    json!({ "decision": "redirect_to_dashboard", "target": target }),
                ),
            };

            let mut data = data;
            data["partition"] = json!(partition);
            output_success(&output_format, &summary, Some(data))
        }
    }
}

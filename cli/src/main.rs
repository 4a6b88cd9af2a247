use std::sync::Arc;

use anyhow::Context;
use bloodlink_core::api::DEFAULT_LOGIN_TYPE;
use bloodlink_core::types::RequestFilters;
use bloodlink_core::{ApiClient, ClientConfig, FileSessionStore};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bloodlink")]
#[command(about = "BloodLink blood bank dashboard from the command line")]
struct Cli {
    /// API base URL, overriding BLOODLINK_API_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session token
    Login {
        email: String,
        password: String,
        /// 1 for administrators, 2 for hospital-scoped operators
        #[arg(long, default_value_t = DEFAULT_LOGIN_TYPE)]
        login_type: i64,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Dashboard headline figures
    Stats,
    /// Blood unit stock
    Inventory {
        /// Hospital id; defaults to the session's hospital
        #[arg(long)]
        hospital: Option<String>,
        /// Show a single blood type instead of the whole list
        #[arg(long, conflicts_with = "hospital")]
        blood_type: Option<String>,
    },
    /// Blood requests raised by hospitals
    Requests {
        #[arg(long)]
        hospital: Option<String>,
        /// Only urgent requests
        #[arg(long)]
        urgent: bool,
    },
    /// Approve a blood request
    Approve { id: i64, hospital_id: i64 },
    /// Reject a blood request
    Reject { id: i64, hospital_id: i64 },
    /// Donation campaigns
    Campaigns,
    /// Inter-hospital transfers
    Transfers,
    /// Analytics charts, or a report export
    Analytics {
        /// Export a report of this type instead
        #[arg(long)]
        export: Option<String>,
        /// Period for the exported report
        #[arg(long, default_value = "month", requires = "export")]
        period: String,
    },
    /// Profile and notification preferences
    Settings,
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn execute(client: &ApiClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Login {
            email,
            password,
            login_type,
        } => {
            client
                .auth()
                .login(&email, &password, login_type)
                .await
                .context("login failed")?;
            println!("Signed in as {email}");
        }
        Commands::Logout => {
            client.auth().logout().await.context("server logout failed")?;
            println!("Signed out");
        }
        Commands::Whoami => print(&client.auth().get_current_user().await?)?,
        Commands::Stats => print(&client.dashboard().get_stats().await?)?,
        Commands::Inventory {
            hospital,
            blood_type,
        } => match (hospital, blood_type) {
            (_, Some(blood_type)) => print(&client.inventory().get_by_type(&blood_type).await?)?,
            (Some(hospital), None) => print(&client.inventory().get_all(&hospital).await?)?,
            (None, None) => print(
                &client
                    .inventory()
                    .get_all_for_session()
                    .await
                    .context("no hospital in session, pass --hospital")?,
            )?,
        },
        Commands::Requests { hospital, urgent } => {
            let mut filters = RequestFilters::default();
            if let Some(hospital) = hospital {
                filters = filters.for_hospital(hospital);
            }
            if urgent {
                filters = filters.urgent_only();
            }
            print(&client.hospitals().get_requests(&filters).await?)?;
        }
        Commands::Approve { id, hospital_id } => {
            print(&client.hospitals().approve_request(id, hospital_id).await?)?
        }
        Commands::Reject { id, hospital_id } => {
            print(&client.hospitals().reject_request(id, hospital_id).await?)?
        }
        Commands::Campaigns => print(&client.campaigns().get_all().await?)?,
        Commands::Transfers => print(&client.transfers().get_all().await?)?,
        Commands::Analytics { export, period } => match export {
            Some(report_type) => print(&client.analytics().export_report(&report_type, &period).await?)?,
            None => {
                let analytics = client.analytics();
                print(&serde_json::json!({
                    "monthly": analytics.get_monthly_data().await?,
                    "bloodTypes": analytics.get_blood_type_distribution().await?,
                    "ageGroups": analytics.get_donor_age_groups().await?,
                }))?;
            }
        },
        Commands::Settings => {
            let settings = client.settings();
            print(&serde_json::json!({
                "profile": settings.get_profile().await?,
                "notifications": settings.get_notifications().await?,
            }))?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    tracing::debug!(base_url = %config.base_url, session_file = %config.session_file.display(), "configured");

    let session = Arc::new(FileSessionStore::new(&config.session_file));
    let client = ApiClient::from_config(&config, session);
    execute(&client, cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_defaults_to_admin_type() {
        let cli = Cli::try_parse_from(["bloodlink", "login", "a@b.com", "pw"]).unwrap();
        match cli.command {
            Commands::Login { login_type, .. } => assert_eq!(login_type, DEFAULT_LOGIN_TYPE),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn base_url_is_global() {
        let cli = Cli::try_parse_from(["bloodlink", "stats", "--base-url", "http://localhost:3000"]).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:3000"));
    }

    #[test]
    fn inventory_flags_conflict() {
        let parsed = Cli::try_parse_from(["bloodlink", "inventory", "--hospital", "1", "--blood-type", "O+"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn period_requires_export() {
        assert!(Cli::try_parse_from(["bloodlink", "analytics", "--period", "week"]).is_err());
        let cli = Cli::try_parse_from(["bloodlink", "analytics", "--export", "inventory"]).unwrap();
        match cli.command {
            Commands::Analytics { export, period } => {
                assert_eq!(export.as_deref(), Some("inventory"));
                assert_eq!(period, "month");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn approve_takes_request_and_hospital() {
        let cli = Cli::try_parse_from(["bloodlink", "approve", "10", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Approve { id: 10, hospital_id: 3 }));
    }
}

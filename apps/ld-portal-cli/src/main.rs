//! `ld-portal`: terminal console for the L&D / Demo portal.
//!
//! Loads dashboard collections, applies filters, prints tables and KPI
//! cards, and sends mutations to the backend.

// CLI tools are expected to print to stderr
#![allow(clippy::print_stderr)]

mod commands;
mod context;
mod filters;
mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use ld_portal::{CliOverrides, PortalConfig, PortalError};

use crate::context::AppContext;

/// L&D / Demo portal console
#[derive(Parser)]
#[command(name = "ld-portal")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL override (overrides config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login(commands::auth::LoginArgs),
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Submit a self-service registration
    Register(commands::auth::RegisterArgs),
    /// List customer requests
    Customers(commands::records::ListArgs),
    /// List demo accounts
    Demos(commands::records::ListArgs),
    /// List interns (admin)
    Interns(commands::records::ListArgs),
    /// Assign or unassign an intern
    Assign(commands::records::AssignArgs),
    /// Change the status of a request or demo account
    Status(commands::records::StatusArgs),
    /// Write the admin or intern note of a record
    Note(commands::records::NoteArgs),
    /// Delete a record (admin)
    Delete(commands::records::DeleteArgs),
    /// Create an intern with generated credentials (admin)
    AddIntern(commands::records::AddInternArgs),
    /// Record a customer request by hand (admin)
    AddCustomer(commands::admin::AddCustomerArgs),
    /// Edit a customer request or an intern (admin)
    #[command(subcommand)]
    Edit(commands::admin::EditCommand),
    /// Issue new credentials for an intern or demo account (admin)
    Regenerate(commands::admin::RegenerateArgs),
    /// Notification bell
    #[command(subcommand)]
    Notifications(commands::notifications::NotificationsCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report(&e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Layered config: defaults -> YAML (if provided) -> env (`LDP__*`) -> CLI overrides.
fn load_config(cli: &Cli) -> anyhow::Result<PortalConfig> {
    let mut config = PortalConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        base_url: cli.base_url.clone(),
        verbose: cli.verbose,
    })?;
    Ok(config)
}

async fn run(command: Commands, config: PortalConfig) -> anyhow::Result<()> {
    let ctx = AppContext::from_config(config)?;
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Login(args) => args.run(&ctx, &mut out).await,
        Commands::Logout => commands::auth::logout(&ctx, &mut out).await,
        Commands::Whoami => commands::auth::whoami(&ctx, &mut out),
        Commands::Register(args) => args.run(&ctx, &mut out).await,
        Commands::Customers(args) => args.customers(&ctx, &mut out).await,
        Commands::Demos(args) => args.demos(&ctx, &mut out).await,
        Commands::Interns(args) => args.interns(&ctx, &mut out).await,
        Commands::Assign(args) => args.run(&ctx, &mut out).await,
        Commands::Status(args) => args.run(&ctx, &mut out).await,
        Commands::Note(args) => args.run(&ctx, &mut out).await,
        Commands::Delete(args) => args.run(&ctx, &mut out).await,
        Commands::AddIntern(args) => args.run(&ctx, &mut out).await,
        Commands::AddCustomer(args) => args.run(&ctx, &mut out).await,
        Commands::Edit(cmd) => cmd.run(&ctx, &mut out).await,
        Commands::Regenerate(args) => args.run(&ctx, &mut out).await,
        Commands::Notifications(cmd) => cmd.run(&ctx, &mut out).await,
    }
}

fn report(error: &anyhow::Error) {
    eprintln!("{} {error:#}", "error:".red().bold());
    if error
        .downcast_ref::<PortalError>()
        .is_some_and(PortalError::is_unauthorized)
    {
        eprintln!("{} your session ended, run `ld-portal login` again", "hint:".yellow());
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "ld-portal",
            "customers",
            "--status",
            "completed",
            "-vv",
            "--base-url",
            "http://localhost:9000/api",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000/api"));
        assert!(matches!(cli.command, Commands::Customers(_)));
    }

    #[test]
    fn notifications_require_a_subcommand() {
        assert!(Cli::try_parse_from(["ld-portal", "notifications"]).is_err());
        assert!(Cli::try_parse_from(["ld-portal", "notifications", "read", "4"]).is_ok());
        assert!(Cli::try_parse_from(["ld-portal", "notifications", "delete", "4"]).is_ok());
    }

    #[test]
    fn admin_maintenance_commands_parse() {
        let edit = Cli::try_parse_from(["ld-portal", "edit", "intern", "3", "--integration", "Slack"]);
        assert!(matches!(edit.unwrap().command, Commands::Edit(_)));

        let regenerate = Cli::try_parse_from(["ld-portal", "regenerate", "demo", "2"]);
        assert!(matches!(regenerate.unwrap().command, Commands::Regenerate(_)));

        assert!(Cli::try_parse_from(["ld-portal", "add-customer", "--first-name", "Ada"]).is_err());
    }
}

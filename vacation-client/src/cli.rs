//! Command-line front end. Each subcommand stands in for one form or table
//! action of the web application.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::models::{
    Credentials, NewAccount, NewVacation, Requester, ReviewDecision, UserProfile, Vacation,
};
use crate::navigation::{landing_view, Navigator, View};
use crate::services::SessionEvent;
use crate::AppContext;

#[derive(Parser, Debug)]
#[command(name = "vacation", version, about = "Vacation request management client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and persist the session
    Login(LoginArgs),
    /// Create an account (logs in immediately)
    Register(RegisterArgs),
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Account administration
    #[command(subcommand)]
    Users(UsersCommand),
    /// Vacation requests
    #[command(subcommand)]
    Requests(RequestsCommand),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "VACATION_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "VACATION_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Job title
    #[arg(long)]
    pub role: String,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List accounts (only non-admins with --promotable)
    List {
        #[arg(long)]
        promotable: bool,
    },
    /// Grant admin rights to an account
    Promote { user_id: String },
    /// Remove an account
    Delete { user_id: String },
}

#[derive(Subcommand, Debug)]
pub enum RequestsCommand {
    /// Submit a new request
    New {
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        reason: String,
    },
    /// Your own requests
    Mine,
    /// All requests (admin)
    All,
    /// Approve a request (admin)
    Approve { id: String },
    /// Reject a request (admin)
    Reject { id: String },
    /// Delete a request; --admin removes any request
    Delete {
        id: String,
        #[arg(long)]
        admin: bool,
    },
}

/// Prints redirects instead of changing pages.
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, view: View, event: &SessionEvent) {
        if let SessionEvent::Expired { .. } = event {
            eprintln!("Session expired. Run `vacation login` to continue.");
        }
        tracing::debug!(view = view.path(), "Redirect");
    }
}

pub async fn run(context: &AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login(args) => {
            let session = context
                .auth
                .login(&Credentials::new(args.email, args.password))
                .await?;
            println!(
                "Logged in as {} ({})",
                session.user.display_name(),
                landing_view(&session.user).path()
            );
        }
        Command::Register(args) => {
            let session = context
                .auth
                .register(&NewAccount {
                    name: args.name,
                    email: args.email,
                    password: args.password,
                    role: args.role,
                })
                .await?;
            println!("Account created for {}", session.user.display_name());
        }
        Command::Logout => {
            context.auth.logout();
            println!("Logged out");
        }
        Command::Whoami => match context.auth.current_user() {
            Some(user) => print_user(&user),
            None if context.auth.is_authenticated() => println!("Logged in (profile unavailable)"),
            None => println!("Not logged in"),
        },
        Command::Users(command) => run_users(context, command).await?,
        Command::Requests(command) => run_requests(context, command).await?,
    }

    Ok(())
}

async fn run_users(context: &AppContext, command: UsersCommand) -> anyhow::Result<()> {
    match command {
        UsersCommand::List { promotable } => {
            let users = if promotable {
                context.auth.promotable_users().await?
            } else {
                context.auth.list_users().await?
            };
            if users.is_empty() {
                println!("No users");
            }
            for user in &users {
                print_user(user);
            }
        }
        UsersCommand::Promote { user_id } => {
            let user = context.auth.promote(&user_id).await?;
            println!("{} is now an administrator", user.display_name());
        }
        UsersCommand::Delete { user_id } => {
            context.auth.delete_user(&user_id).await?;
            println!("User {} deleted", user_id);
        }
    }

    Ok(())
}

async fn run_requests(context: &AppContext, command: RequestsCommand) -> anyhow::Result<()> {
    match command {
        RequestsCommand::New { start, end, reason } => {
            let created = context
                .vacations
                .create(&NewVacation {
                    start_date: start,
                    end_date: end,
                    reason,
                })
                .await?;
            print_vacation(&created);
        }
        RequestsCommand::Mine => print_vacations(&context.vacations.list_mine().await?),
        RequestsCommand::All => print_vacations(&context.vacations.list_all().await?),
        RequestsCommand::Approve { id } => {
            let updated = context
                .vacations
                .update_status(&id, ReviewDecision::Approve)
                .await?;
            print_vacation(&updated);
        }
        RequestsCommand::Reject { id } => {
            let updated = context
                .vacations
                .update_status(&id, ReviewDecision::Reject)
                .await?;
            print_vacation(&updated);
        }
        RequestsCommand::Delete { id, admin } => {
            if admin {
                context.vacations.delete_any(&id).await?;
            } else {
                context.vacations.delete(&id).await?;
            }
            println!("Request {} deleted", id);
        }
    }

    Ok(())
}

fn print_user(user: &UserProfile) {
    println!(
        "{}\t{}\t{}\t{}{}",
        user.id,
        user.display_name(),
        user.email.as_deref().unwrap_or("-"),
        user.role,
        if user.is_admin { "\tadmin" } else { "" }
    );
}

fn print_vacations(vacations: &[Vacation]) {
    if vacations.is_empty() {
        println!("No requests");
    }
    for vacation in vacations {
        print_vacation(vacation);
    }
}

fn print_vacation(vacation: &Vacation) {
    println!(
        "{}\t{}\t{} → {}\t{}\t{}",
        vacation.id,
        vacation.requester.as_ref().map_or("-", Requester::label),
        vacation.start_date.format("%Y-%m-%d"),
        vacation.end_date.format("%Y-%m-%d"),
        vacation.status,
        vacation.reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_new_request() {
        let cli = Cli::try_parse_from([
            "vacation", "requests", "new", "--start", "2026-07-01", "--end", "2026-07-15",
            "--reason", "Viagem",
        ])
        .unwrap();

        match cli.command {
            Command::Requests(RequestsCommand::New { start, end, reason }) => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2026, 7, 15).unwrap());
                assert_eq!(reason, "Viagem");
            }
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_dates() {
        let result = Cli::try_parse_from([
            "vacation", "requests", "new", "--start", "01/07/2026", "--end", "2026-07-15",
            "--reason", "Viagem",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_admin_delete_flag() {
        let cli = Cli::try_parse_from(["vacation", "requests", "delete", "f1", "--admin"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Requests(RequestsCommand::Delete { admin: true, .. })
        ));
    }
}

use clap::{Args, Subcommand};

use brewbuddy_core::{FileStore, LocalAuth, Session};

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand)]
pub enum AuthSubcommand {
    /// Create an account and sign in
    Register {
        /// Email address
        email: String,

        /// Display name stored in the profile
        #[arg(long)]
        username: Option<String>,

        /// Password (at least 6 characters)
        #[arg(long)]
        password: String,
    },

    /// Sign in to an existing account
    Login {
        /// Email address
        email: String,

        /// Password
        #[arg(long)]
        password: String,
    },

    /// Sign out of the current session
    Logout,

    /// Show the signed-in account
    Whoami,
}

impl AuthCommand {
    pub async fn run(
        &self,
        session: &Session<FileStore, LocalAuth>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Register {
                email,
                username,
                password,
            } => {
                let username = username
                    .clone()
                    .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
                let identity = session.register(&username, email, password).await?;
                println!("Registered {} ({})", identity.email, identity.uid);
                if let Some(warning) = session.auth_error() {
                    eprintln!("Warning: {}", warning);
                }
            }
            AuthSubcommand::Login { email, password } => {
                let identity = session.login(email, password).await?;
                match session.profile() {
                    Some(profile) => println!("Welcome back, {}!", profile.username),
                    None => println!("Logged in as {}", identity.email),
                }
            }
            AuthSubcommand::Logout => {
                session.logout();
                println!("Logged out");
            }
            AuthSubcommand::Whoami => match session.current_identity() {
                Some(identity) => {
                    println!("Email: {}", identity.email);
                    println!("Uid:   {}", identity.uid);
                    if let Some(profile) = session.profile() {
                        println!("Name:  {}", profile.username);
                        println!("Since: {}", profile.created_at.to_rfc3339());
                    }
                }
                None => println!("Not logged in"),
            },
        }

        Ok(())
    }
}

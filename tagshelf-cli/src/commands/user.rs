//! User management commands
//!
//! Credentials are hashed before they reach the store; there is no way to
//! read a password back.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use tagshelf_server::db::UserRepo;
use tagshelf_server::models::NewUser;

use super::{open_catalog, DatabaseArgs};

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a user
    Add {
        /// User name
        name: String,

        /// Password (8-256 characters)
        #[arg(long, env = "TAGSHELF_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Check a user's password; exits non-zero on mismatch
    Verify {
        /// User name
        name: String,

        /// Password to check
        #[arg(long, env = "TAGSHELF_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

pub async fn run_user(args: UserArgs) -> Result<()> {
    let pool = open_catalog(&args.db.url()).await?;
    let repo = UserRepo::new(&pool);

    match args.command {
        UserCommands::Add { name, password } => {
            let user = NewUser::new(&name, &password).context("Invalid user")?;
            let id = repo.create(&user).await?;
            println!("Created user '{}' (id {id})", user.name.as_str());
        }
        UserCommands::Verify { name, password } => {
            if !repo.verify(&name, &password).await? {
                bail!("Invalid credentials for '{name}'");
            }
            println!("Credentials valid for '{name}'");
        }
    }

    pool.close().await;
    Ok(())
}

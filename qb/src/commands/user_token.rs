use clap::{Args, Subcommand};
use eyre::{Result, eyre};
use qbcli_client::resources::user_tokens::CloneUserTokenInput;

use super::{GlobalArgs, UnwrapOrExit};

#[derive(Args)]
pub struct UserTokenCommand {
    #[command(subcommand)]
    command: UserTokenSubcommand,
}

#[derive(Subcommand)]
enum UserTokenSubcommand {
    /// Clone the current user token
    Clone(CloneArgs),

    /// Deactivate a user token
    Deactivate(TokenArg),

    /// Delete a user token
    Delete(TokenArg),
}

#[derive(Args)]
struct CloneArgs {
    /// Name of the new token
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct TokenArg {
    /// The token to act on (defaults to the current user token)
    #[arg(long)]
    token: Option<String>,
}

impl TokenArg {
    fn resolve(&self, global: &GlobalArgs) -> Result<String> {
        match &self.token {
            Some(token) => Ok(token.clone()),
            None => global
                .profile()?
                .user_token
                .ok_or_else(|| eyre!("user token required, pass --token")),
        }
    }
}

impl UserTokenCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        match &self.command {
            UserTokenSubcommand::Clone(args) => {
                let input = CloneUserTokenInput {
                    name: args.name.clone(),
                    description: args.description.clone(),
                };
                global.render_value(&client.clone_user_token(&input).unwrap_or_exit())
            }
            UserTokenSubcommand::Deactivate(args) => {
                let token = args.resolve(global)?;
                global.render_value(&client.deactivate_user_token(&token).unwrap_or_exit())
            }
            UserTokenSubcommand::Delete(args) => {
                let token = args.resolve(global)?;
                global.render_value(&client.delete_user_token(&token).unwrap_or_exit())
            }
        }
    }
}

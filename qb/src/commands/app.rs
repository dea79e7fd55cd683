use clap::{Args, Subcommand};
use eyre::Result;
use qbcli_client::{
    query::parse_key_values,
    resources::apps::{
        CopyAppInput, CopyAppProperties, CreateAppInput, ListAppsInput, UpdateAppInput, Variable,
    },
};

use super::{GlobalArgs, UnwrapOrExit};

#[derive(Args)]
pub struct AppCommand {
    #[command(subcommand)]
    command: AppSubcommand,
}

#[derive(Subcommand)]
enum AppSubcommand {
    /// List the apps the token can access
    List(ListArgs),

    /// Show an app
    Get,

    /// Create an app
    Create(CreateArgs),

    /// Update an app's name, description or variables
    Update(UpdateArgs),

    /// Delete an app
    Delete(DeleteArgs),

    /// Copy an app
    Copy(CopyArgs),

    /// List the automations, pipelines and webhooks of an app
    Events,
}

#[derive(Args)]
struct ListArgs {
    /// Only apps the user administers
    #[arg(long)]
    admin_only: bool,

    /// Leave out parent apps of embedded tables
    #[arg(long)]
    exclude_parents: bool,

    /// Include the apps each app was copied from
    #[arg(long)]
    include_ancestors: bool,

    /// Only apps in the current realm
    #[arg(long)]
    realm_apps_only: bool,

    /// List tables as well as apps
    #[arg(long)]
    with_embedded_tables: bool,
}

#[derive(Args)]
struct CreateArgs {
    /// Name of the new app
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    /// Assign the current user token to the app
    #[arg(long)]
    assign_token: bool,

    /// Variables as name=value pairs, e.g. "theme=dark 'start page'=home"
    #[arg(long)]
    variables: Option<String>,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Variables as name=value pairs
    #[arg(long)]
    variables: Option<String>,
}

#[derive(Args)]
struct DeleteArgs {
    /// Name of the app, required as a confirmation
    #[arg(long)]
    name: String,
}

#[derive(Args)]
struct CopyArgs {
    /// Name of the copy
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: Option<String>,

    /// Assign the current user token to the copy
    #[arg(long)]
    assign_token: bool,

    /// Leave file attachments out of the copy
    #[arg(long)]
    exclude_files: bool,

    /// Copy records as well as the schema
    #[arg(long)]
    keep_data: bool,

    /// Copy users and roles
    #[arg(long)]
    users_and_roles: bool,
}

fn variables(pairs: Option<&str>) -> Vec<Variable> {
    pairs
        .map(parse_key_values)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| Variable { name, value })
        .collect()
}

impl AppCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        let client = global.client()?;
        match &self.command {
            AppSubcommand::List(args) => {
                let input = ListAppsInput {
                    admin_only: args.admin_only,
                    exclude_parents: args.exclude_parents,
                    include_ancestors: args.include_ancestors,
                    realm_apps_only: args.realm_apps_only,
                    with_embedded_tables: args.with_embedded_tables,
                };
                global.render_value(&client.list_apps(&input).unwrap_or_exit())
            }
            AppSubcommand::Get => {
                let app_id = global.app_id()?;
                global.render_value(&client.get_app(&app_id).unwrap_or_exit())
            }
            AppSubcommand::Create(args) => {
                let input = CreateAppInput {
                    name: args.name.clone(),
                    description: args.description.clone(),
                    assign_user_token: args.assign_token,
                    variables: variables(args.variables.as_deref()),
                };
                global.render_value(&client.create_app(&input).unwrap_or_exit())
            }
            AppSubcommand::Update(args) => {
                let app_id = global.app_id()?;
                let input = UpdateAppInput {
                    name: args.name.clone(),
                    description: args.description.clone(),
                    variables: variables(args.variables.as_deref()),
                };
                global.render_value(&client.update_app(&app_id, &input).unwrap_or_exit())
            }
            AppSubcommand::Delete(args) => {
                let app_id = global.app_id()?;
                global.render_value(&client.delete_app(&app_id, &args.name).unwrap_or_exit())
            }
            AppSubcommand::Copy(args) => {
                let app_id = global.app_id()?;
                let input = CopyAppInput {
                    name: args.name.clone(),
                    description: args.description.clone(),
                    properties: CopyAppProperties {
                        assign_user_token: args.assign_token,
                        exclude_files: args.exclude_files,
                        keep_data: args.keep_data,
                        users_and_roles: args.users_and_roles,
                    },
                };
                global.render_value(&client.copy_app(&app_id, &input).unwrap_or_exit())
            }
            AppSubcommand::Events => {
                let app_id = global.app_id()?;
                global.render_value(&client.list_app_events(&app_id).unwrap_or_exit())
            }
        }
    }
}

use std::path::PathBuf;

use clap::{Args, Subcommand};
use dialoguer::{Input, Password, theme::ColorfulTheme};
use eyre::{Context, Result};
use qbcli_client::{Profile, config::validate_hostname};
use serde::Serialize;

use super::{GlobalArgs, UnwrapOrExit};
use crate::reports::Output;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Write a profile to the configuration file interactively
    Setup,

    /// Show the effective configuration, with tokens masked
    Dump,

    /// List the profiles in the configuration file
    Profiles,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigDump {
    profile: String,
    config_file: PathBuf,
    #[serde(flatten)]
    settings: Profile,
}

impl ConfigCommand {
    pub fn run(&self, global: &GlobalArgs) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Setup => Self::setup(global),
            ConfigSubcommand::Dump => global.render_value(&ConfigDump {
                profile: global.profile.clone(),
                config_file: global.config_path()?,
                settings: global.profile()?.masked(),
            }),
            ConfigSubcommand::Profiles => {
                let config = global.config()?;
                let names: Vec<&str> = config.profile_names().collect();
                global.render_value(&names)
            }
        }
    }

    fn setup(global: &GlobalArgs) -> Result<()> {
        let mut config = global.config()?;
        let current = config.profile(&global.profile).cloned().unwrap_or_default();
        let theme = ColorfulTheme::default();

        let mut realm = Input::<String>::with_theme(&theme)
            .with_prompt("Realm hostname")
            .validate_with(|input: &String| validate_hostname(input).map_err(|e| e.to_string()));
        if let Some(hostname) = &current.realm_hostname {
            realm = realm.with_initial_text(hostname);
        }
        let realm_hostname = realm.interact_text().wrap_err("Failed to read realm hostname")?;

        let user_token = Password::with_theme(&theme)
            .with_prompt("User token (leave empty to keep the current one)")
            .allow_empty_password(true)
            .interact()
            .wrap_err("Failed to read user token")?;

        let app_id: String = Input::with_theme(&theme)
            .with_prompt("Default app ID (optional)")
            .with_initial_text(current.app_id.clone().unwrap_or_default())
            .allow_empty(true)
            .interact_text()
            .wrap_err("Failed to read app ID")?;

        let profile = Profile {
            realm_hostname: Some(realm_hostname),
            user_token: Some(user_token).filter(|t| !t.is_empty()),
            app_id: Some(app_id).filter(|id| !id.is_empty()),
            ..Profile::default()
        }
        .or(&current);

        config.set_profile(global.profile.clone(), profile);
        config.save().unwrap_or_exit();

        let path = config.path().display().to_string();
        global
            .output()
            .message(&format!("saved profile '{}' to {path}", global.profile))
    }
}

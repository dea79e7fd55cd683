//! Named connection profiles stored in `~/.config/quickbase/config.toml`.
//!
//! ```toml
//! [default]
//! realm_hostname = "example.quickbase.com"
//! user_token = "b4ab2c_cwv3_..."
//! app_id = "bqx7xxxxx"
//! ```

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use indexmap::IndexMap;
use miette::{NamedSource, SourceSpan};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    security::{mask_secret, mask_tokens},
};

pub const DEFAULT_PROFILE: &str = "default";

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(([a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9\-]*[a-zA-Z0-9])\.)+([A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9])$",
    )
    .expect("hostname pattern is valid")
});

/// Connection settings for one realm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<u32>,
}

impl Profile {
    /// Fill every unset setting from `fallback`.
    pub fn or(self, fallback: &Profile) -> Profile {
        Profile {
            realm_hostname: self.realm_hostname.or_else(|| fallback.realm_hostname.clone()),
            user_token: self.user_token.or_else(|| fallback.user_token.clone()),
            temp_token: self.temp_token.or_else(|| fallback.temp_token.clone()),
            app_id: self.app_id.or_else(|| fallback.app_id.clone()),
            table_id: self.table_id.or_else(|| fallback.table_id.clone()),
            field_id: self.field_id.or(fallback.field_id),
        }
    }

    /// Check the settings every API call needs.
    pub fn validate(&self) -> Result<()> {
        let hostname = self.realm_hostname.as_deref().unwrap_or_default();
        validate_hostname(hostname)?;
        if self.user_token.is_none() && self.temp_token.is_none() {
            return Err(Box::new(Error::InvalidConfig {
                message: "a user token or temporary token is required".into(),
                help: Some("pass --user-token or set QUICKBASE_USER_TOKEN".into()),
            }));
        }
        Ok(())
    }

    /// A copy that is safe to print.
    pub fn masked(&self) -> Profile {
        Profile {
            user_token: self.user_token.as_deref().map(mask_tokens),
            temp_token: self.temp_token.as_deref().map(mask_secret),
            ..self.clone()
        }
    }
}

/// Validate a realm hostname such as `example.quickbase.com`.
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.is_empty() {
        return Err(Box::new(Error::InvalidConfig {
            message: "realm hostname required".into(),
            help: Some("pass --realm-hostname or run 'qb config setup'".into()),
        }));
    }
    if !HOSTNAME.is_match(hostname) {
        return Err(Box::new(Error::InvalidConfig {
            message: format!("invalid realm hostname '{hostname}'"),
            help: Some("expecting a hostname like example.quickbase.com".into()),
        }));
    }
    Ok(())
}

/// A configuration file with its profiles in file order.
#[derive(Debug, Clone)]
pub struct ConfigToml {
    path: PathBuf,
    profiles: IndexMap<String, Profile>,
}

impl ConfigToml {
    /// `~/.config/quickbase/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("quickbase").join("config.toml"))
    }

    /// Open and parse a configuration file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(Error::Io {
                path: path.clone(),
                source: e,
            })
        })?;
        Self::from_str_with_path(&content, path)
    }

    /// Open a configuration file, treating a missing file as empty.
    pub fn open_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                profiles: IndexMap::new(),
            });
        }
        Self::open(path)
    }

    pub fn from_str_with_path(content: &str, path: PathBuf) -> Result<Self> {
        let profiles = toml::from_str(content).map_err(|source: toml::de::Error| {
            let span = source.span().map(SourceSpan::from);
            Box::new(Error::ConfigParse {
                src: NamedSource::new(path.display().to_string(), content.to_string()),
                span,
                source,
            })
        })?;
        Ok(Self { path, profiles })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Insert or replace a profile.
    pub fn set_profile(&mut self, name: impl Into<String>, profile: Profile) {
        self.profiles.insert(name.into(), profile);
    }

    /// Write the profiles back to disk, creating parent directories.
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(&self.profiles)
            .map_err(|source| Box::new(Error::ConfigEncode { source }))?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Box::new(Error::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })
            })?;
        }
        std::fs::write(&self.path, content).map_err(|e| {
            Box::new(Error::Write {
                path: self.path.clone(),
                source: e,
            })
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigToml> {
        ConfigToml::from_str_with_path(content, PathBuf::from("config.toml"))
    }

    #[test]
    fn test_parse_profiles_in_order() {
        let config = parse(
            r#"
            [default]
            realm_hostname = "example.quickbase.com"
            user_token = "b4ab2c_cwv3_d6e5f7g8h9j0k1m2n3p4q5r6s7t8"

            [work]
            realm_hostname = "work.quickbase.com"
            app_id = "bqx7xxxxx"
            field_id = 6
            "#,
        )
        .unwrap();

        let names: Vec<_> = config.profile_names().collect();
        assert_eq!(names, ["default", "work"]);
        let work = config.profile("work").unwrap();
        assert_eq!(work.app_id.as_deref(), Some("bqx7xxxxx"));
        assert_eq!(work.field_id, Some(6));
    }

    #[test]
    fn test_parse_error_has_span() {
        let err = parse("[default]\nrealm_hostname = \n").unwrap_err();
        assert!(matches!(*err, Error::ConfigParse { span: Some(_), .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse("[default]\nrealm = \"x.quickbase.com\"\n").is_err());
    }

    #[test]
    fn test_or_prefers_self() {
        let flags = Profile {
            realm_hostname: Some("flag.quickbase.com".into()),
            ..Profile::default()
        };
        let file = Profile {
            realm_hostname: Some("file.quickbase.com".into()),
            user_token: Some("token".into()),
            ..Profile::default()
        };
        let merged = flags.or(&file);
        assert_eq!(merged.realm_hostname.as_deref(), Some("flag.quickbase.com"));
        assert_eq!(merged.user_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_validate() {
        let mut profile = Profile {
            realm_hostname: Some("example.quickbase.com".into()),
            user_token: Some("token".into()),
            ..Profile::default()
        };
        assert!(profile.validate().is_ok());

        profile.realm_hostname = Some("not a host".into());
        assert!(profile.validate().is_err());

        profile.realm_hostname = Some("example.quickbase.com".into());
        profile.user_token = None;
        assert!(matches!(
            *profile.validate().unwrap_err(),
            Error::InvalidConfig { .. }
        ));
    }

    #[test]
    fn test_masked_hides_tokens() {
        let profile = Profile {
            user_token: Some("b4ab2c_cwv3_d6e5f7g8h9j0k1m2n3p4q5r6s7t8".into()),
            temp_token: Some("temporarytoken".into()),
            ..Profile::default()
        };
        let masked = profile.masked();
        assert_eq!(
            masked.user_token.as_deref(),
            Some("b4ab2c_cwv3_d6e5********************s7t8")
        );
        assert_eq!(masked.temp_token.as_deref(), Some("********oken"));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ConfigToml::open_or_default(&path).unwrap();
        config.set_profile(
            DEFAULT_PROFILE,
            Profile {
                realm_hostname: Some("example.quickbase.com".into()),
                ..Profile::default()
            },
        );
        config.save().unwrap();

        let reopened = ConfigToml::open(&path).unwrap();
        assert_eq!(
            reopened.profile(DEFAULT_PROFILE).unwrap().realm_hostname.as_deref(),
            Some("example.quickbase.com")
        );
    }
}

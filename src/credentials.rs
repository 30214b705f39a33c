use crate::status::Platform;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub const QIITA_ACCESS_TOKEN: &str = "QIITA_ACCESS_TOKEN";
pub const DEVTO_API_KEY: &str = "DEVTO_API_KEY";
pub const HASHNODE_API_TOKEN: &str = "HASHNODE_API_TOKEN";
pub const HASHNODE_PUBLICATION_ID: &str = "HASHNODE_PUBLICATION_ID";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("missing env vars: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// API secrets for the secondary platforms. Empty values count as unset.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    qiita_token: Option<String>,
    devto_api_key: Option<String>,
    hashnode_token: Option<String>,
    hashnode_publication_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |value: &Option<String>| value.as_ref().map(|_| "***");
        f.debug_struct("Credentials")
            .field("qiita_token", &mask(&self.qiita_token))
            .field("devto_api_key", &mask(&self.devto_api_key))
            .field("hashnode_token", &mask(&self.hashnode_token))
            .field("hashnode_publication_id", &self.hashnode_publication_id)
            .finish()
    }
}

impl Credentials {
    /// Process environment first, then `KEY=VALUE` pairs from `env_file`.
    ///
    /// The file is read without touching the process environment. A missing
    /// or unreadable file is not an error; it just contributes nothing.
    pub fn from_env(env_file: Option<&Path>) -> Self {
        let file_vars = env_file.map(read_env_file).unwrap_or_default();
        Self::from_lookup(|name| {
            std::env::var(name)
                .ok()
                .filter(|value| !value.is_empty())
                .or_else(|| file_vars.get(name).cloned())
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            qiita_token: get(QIITA_ACCESS_TOKEN),
            devto_api_key: get(DEVTO_API_KEY),
            hashnode_token: get(HASHNODE_API_TOKEN),
            hashnode_publication_id: get(HASHNODE_PUBLICATION_ID),
        }
    }

    pub fn qiita_token(&self) -> Option<&str> {
        self.qiita_token.as_deref()
    }

    pub fn devto_api_key(&self) -> Option<&str> {
        self.devto_api_key.as_deref()
    }

    pub fn hashnode_token(&self) -> Option<&str> {
        self.hashnode_token.as_deref()
    }

    pub fn hashnode_publication_id(&self) -> Option<&str> {
        self.hashnode_publication_id.as_deref()
    }

    /// Variables `platform` needs that are not set.
    pub fn missing_for(&self, platform: Platform) -> Vec<&'static str> {
        let required = match platform {
            Platform::Qiita => vec![(QIITA_ACCESS_TOKEN, &self.qiita_token)],
            Platform::Devto => vec![(DEVTO_API_KEY, &self.devto_api_key)],
            Platform::Hashnode => vec![
                (HASHNODE_API_TOKEN, &self.hashnode_token),
                (HASHNODE_PUBLICATION_ID, &self.hashnode_publication_id),
            ],
        };
        required
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// Fails naming every missing variable across all of `platforms`.
    pub fn require(&self, platforms: &BTreeSet<Platform>) -> Result<(), CredentialError> {
        let missing: Vec<&'static str> = platforms
            .iter()
            .flat_map(|&platform| self.missing_for(platform))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CredentialError::Missing(missing))
        }
    }
}

fn read_env_file(path: &Path) -> HashMap<String, String> {
    let Ok(iter) = dotenvy::from_path_iter(path) else {
        return HashMap::new();
    };
    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!("skipping unreadable line in {}: {e}", path.display());
            None
        }
    })
    .collect()
}

use std::path::Path;

use ini::Ini;
use thiserror::Error;

use crate::{
    area::AreaRegistry,
    config::{profile::Profile, topic::TopicConfig},
    foundation::error::SwathError,
};

/// Configuration errors. Each is fatal for the current message of one topic only.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Read(#[from] ini::Error),

    /// Failed to parse configuration text.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    /// No section exists for the topic.
    #[error("no configuration section for topic '{0}'")]
    UnknownTopic(String),

    /// A required option is absent.
    #[error("missing required option {section}.{key}")]
    Missing {
        /// Topic section.
        section: String,
        /// Option name.
        key: String,
    },

    /// An option is present but unusable.
    #[error("invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        /// Topic section.
        section: String,
        /// Option name.
        key: String,
        /// Raw configured value.
        value: String,
        /// Human readable explanation.
        reason: String,
    },
}

impl From<ConfigError> for SwathError {
    fn from(err: ConfigError) -> Self {
        SwathError::config(err.to_string())
    }
}

/// Read-only INI configuration store with one section per topic.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    ini: Ini,
}

impl ConfigStore {
    /// Load from an INI file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            ini: Ini::load_from_file(path)?,
        })
    }

    /// Parse INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            ini: Ini::load_from_str(text)?,
        })
    }

    /// Topic names, one per named section, in file order.
    pub fn topics(&self) -> Vec<String> {
        self.ini
            .sections()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    /// Raw option-typed view of one topic section.
    pub fn topic(&self, topic: &str) -> Result<TopicConfig, ConfigError> {
        let section = self
            .ini
            .section(Some(topic))
            .ok_or_else(|| ConfigError::UnknownTopic(topic.to_string()))?;
        TopicConfig::from_section(topic, |key| section.get(key))
    }

    /// Resolve the complete processing profile for `topic`.
    pub fn resolve_profile(
        &self,
        topic: &str,
        areas: &dyn AreaRegistry,
    ) -> Result<Profile, ConfigError> {
        Profile::resolve(self.topic(topic)?, areas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/store.rs"]
mod tests;

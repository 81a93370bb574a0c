//! Per-topic configuration.
//!
//! The INI store holds one section per topic. A section is read into an option-typed
//! [`TopicConfig`] and then resolved into a [`Profile`] with every default applied. Profiles are
//! rebuilt for every notification so configuration edits take effect on the next message.

/// Profile resolution and defaults.
pub mod profile;
/// INI-backed configuration store.
pub mod store;
/// Text annotation settings.
pub mod text;
/// Raw option-typed topic sections.
pub mod topic;

pub use profile::{BackupPolicy, OutputVariant, Profile};
pub use store::{ConfigError, ConfigStore};
pub use text::{HorizontalAnchor, TextAnnotation, TextLocation, TextSettings, VerticalAnchor};
pub use topic::TopicConfig;

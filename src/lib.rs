//! swathscale turns satellite swath images into timestamped, annotated, size-variant products.
//!
//! One notification per source image drives the whole flow:
//!
//! - Resolve the topic's [`Profile`] from the INI [`ConfigStore`]
//! - Search the timeliness window for an existing product ([`detect::check_existing`])
//! - Crop, resize, overlay and annotate per configured size ([`pipeline::save_images`])
//! - Write a new file or merge into the existing one, then refresh the latest composite
//!
//! [`Processor`] runs that flow for each message from a [`NotificationSource`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Text annotation.
pub mod annotate;
/// Area definitions and their registry.
pub mod area;
/// Per-topic configuration.
pub mod config;
/// Existing product detection.
pub mod detect;
/// Font databases.
pub mod fonts;
/// Shared value types and errors.
pub mod foundation;
/// Inbound notifications.
pub mod notification;
/// Overlays and their cache.
pub mod overlay;
/// Filename pattern language.
pub mod pattern;
/// Per-message transform pipeline.
pub mod pipeline;
/// Message loop.
pub mod processor;
/// 8-bit rasters, resampling and merging.
pub mod raster;

pub use crate::area::{AreaDefinition, AreaRegistry, StaticAreaRegistry};
pub use crate::config::{BackupPolicy, ConfigError, ConfigStore, Profile, TextSettings};
pub use crate::detect::{Detection, ExistingProduct};
pub use crate::foundation::core::{CropRect, Rgb8, Size};
pub use crate::foundation::error::{SwathError, SwathResult};
pub use crate::notification::{ChannelSource, Notification, NotificationSource, Poll};
pub use crate::overlay::{Overlay, OverlayCache, OverlayRenderer, SvgOverlayRenderer};
pub use crate::pattern::{FilenameTokens, Pattern, TokenValue};
pub use crate::processor::{ConfigSource, MessageOutcome, Processor, StopHandle};
pub use crate::raster::{ColorMode, Raster};

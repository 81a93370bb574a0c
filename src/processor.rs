//! Message loop: one notification at a time, stopped cooperatively between messages.

use std::{
    borrow::Cow,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tracing::{debug, error, info, warn};

use crate::{
    area::AreaRegistry,
    config::{ConfigError, ConfigStore, Profile},
    detect::{self, Detection, ExistingProduct},
    fonts::FontBook,
    notification::{Notification, NotificationSource, Poll},
    overlay::{OverlayCache, OverlayRenderer, SvgOverlayRenderer},
    pipeline::{self, MessageContext, Services},
    raster::Raster,
};

/// Default bounded wait between stop-flag checks.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Where topic configuration comes from.
#[derive(Clone, Debug)]
pub enum ConfigSource {
    /// Parsed once up front.
    Static(ConfigStore),
    /// Re-read from disk for every message.
    Reloading(PathBuf),
}

impl ConfigSource {
    fn store(&self) -> Result<Cow<'_, ConfigStore>, ConfigError> {
        match self {
            Self::Static(store) => Ok(Cow::Borrowed(store)),
            Self::Reloading(path) => ConfigStore::load_from(path).map(Cow::Owned),
        }
    }
}

/// Clonable handle that asks a running [`Processor`] to stop after its current message.
#[derive(Clone, Debug)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request a stop.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the processor is still meant to run.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// What happened to one notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Outputs written (possibly none when every size failed).
    Written(Vec<PathBuf>),
    /// Backup mode and a product already exists.
    SkippedBackup,
    /// The message could not be processed at all.
    Dropped(String),
}

/// Processes notifications with per-topic profiles.
pub struct Processor {
    config: ConfigSource,
    areas: Arc<dyn AreaRegistry>,
    overlays: OverlayCache,
    renderer: Box<dyn OverlayRenderer>,
    fonts: Arc<FontBook>,
    running: Arc<AtomicBool>,
    poll_timeout: Duration,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("config", &self.config)
            .field("overlays", &self.overlays.len())
            .field("running", &self.running.load(Ordering::SeqCst))
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

impl Processor {
    /// Processor using the SVG overlay renderer and a fresh font book.
    pub fn new(config: ConfigSource, areas: Arc<dyn AreaRegistry>) -> Self {
        let fonts = Arc::new(FontBook::new());
        Self {
            config,
            areas,
            overlays: OverlayCache::new(),
            renderer: Box::new(SvgOverlayRenderer::with_fonts(Arc::clone(&fonts))),
            fonts,
            running: Arc::new(AtomicBool::new(true)),
            poll_timeout: POLL_TIMEOUT,
        }
    }

    /// Replace the overlay renderer.
    pub fn with_renderer(mut self, renderer: Box<dyn OverlayRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the bounded wait used by [`Processor::run`].
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Handle for stopping [`Processor::run`] from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// Overlays rendered so far.
    pub fn overlays(&self) -> &OverlayCache {
        &self.overlays
    }

    /// Poll `source` until stopped or the source closes. Returns the number of messages handled.
    pub fn run(&self, source: &mut dyn NotificationSource) -> usize {
        let mut handled = 0;
        while self.running.load(Ordering::SeqCst) {
            match source.poll(self.poll_timeout) {
                Poll::Message(msg) => {
                    self.process(&msg);
                    handled += 1;
                }
                Poll::Empty => continue,
                Poll::Closed => {
                    info!("notification source closed");
                    break;
                }
            }
        }
        info!(handled, "processor stopped");
        handled
    }

    /// Handle one notification. Errors are logged and reported in the outcome, never returned.
    #[tracing::instrument(skip(self, msg), fields(subject = %msg.subject))]
    pub fn process(&self, msg: &Notification) -> MessageOutcome {
        info!(uri = %msg.data.uri, "new message");

        let profile = match self.profile_for(&msg.subject) {
            Ok(p) => p,
            Err(err) => {
                error!(%err, "no usable configuration, dropping message");
                return MessageOutcome::Dropped(err.to_string());
            }
        };
        let start_time = match msg.start_time() {
            Ok(t) => t,
            Err(err) => {
                error!(%err, "dropping message");
                return MessageOutcome::Dropped(err.to_string());
            }
        };
        let source_path = msg.path();
        let tokens = pipeline::input_tokens(&profile, &source_path, start_time);

        let existing = match detect::check_existing(&profile, &tokens, start_time) {
            Ok(Detection::Skip { path }) => {
                debug!(existing = %path.display(), "skipping backup message");
                return MessageOutcome::SkippedBackup;
            }
            Ok(Detection::Proceed(existing)) => existing,
            Err(err) => {
                warn!(%err, "existing product search failed, creating a new product");
                ExistingProduct::NoneFound
            }
        };

        let source = match Raster::open(&source_path) {
            Ok(r) => r,
            Err(err) => {
                error!(path = %source_path.display(), %err, "cannot read source image");
                return MessageOutcome::Dropped(err.to_string());
            }
        };

        let ctx = MessageContext {
            profile,
            source_path,
            start_time,
            tokens,
            existing,
            source,
        };
        let services = Services {
            overlays: &self.overlays,
            renderer: self.renderer.as_ref(),
            fonts: &self.fonts,
        };
        MessageOutcome::Written(pipeline::save_images(&ctx, services))
    }

    fn profile_for(&self, topic: &str) -> Result<Profile, ConfigError> {
        self.config
            .store()?
            .resolve_profile(topic, self.areas.as_ref())
    }
}

#[cfg(test)]
#[path = "../tests/unit/processor.rs"]
mod tests;

//! Font databases for SVG text, loaded once and shared.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use tracing::{debug, warn};
use usvg::fontdb::Database;

/// Which glyph source text should be drawn with.
#[derive(Clone)]
pub enum FontChoice {
    /// Outline fonts from a database; `family` names the preferred face.
    Outline {
        /// Database holding at least one face.
        db: Arc<Database>,
        /// Family to request in the SVG document.
        family: String,
    },
    /// Built-in 5x7 bitmap font.
    Bitmap,
}

/// Populate-once cache of font databases: one per configured font file plus the system fonts.
#[derive(Default)]
pub struct FontBook {
    system: OnceLock<Option<Arc<Database>>>,
    files: Mutex<HashMap<PathBuf, Option<Arc<Database>>>>,
}

impl FontBook {
    /// Empty book; nothing is loaded until first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the cascade: configured font file, then system fonts, then the bitmap font.
    pub fn select(&self, font: Option<&Path>) -> FontChoice {
        if let Some(path) = font {
            if let Some(db) = self.file_db(path) {
                let family = first_family(&db).unwrap_or_else(|| "sans-serif".to_string());
                return FontChoice::Outline { db, family };
            }
            warn!(font = %path.display(), "font unusable, falling back to system fonts");
        }
        match self.system_db() {
            Some(db) => FontChoice::Outline {
                db,
                family: "sans-serif".to_string(),
            },
            None => {
                warn!("no system fonts found, falling back to built-in bitmap font");
                FontChoice::Bitmap
            }
        }
    }

    /// System font database, or `None` when the host has no fonts.
    pub fn system_db(&self) -> Option<Arc<Database>> {
        self.system
            .get_or_init(|| {
                let mut db = Database::new();
                db.load_system_fonts();
                debug!(faces = db.len(), "loaded system fonts");
                (!db.is_empty()).then(|| Arc::new(db))
            })
            .clone()
    }

    fn file_db(&self, path: &Path) -> Option<Arc<Database>> {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        files
            .entry(path.to_path_buf())
            .or_insert_with(|| {
                let mut db = Database::new();
                if let Err(err) = db.load_font_file(path) {
                    warn!(font = %path.display(), %err, "failed to load font file");
                    return None;
                }
                (!db.is_empty()).then(|| Arc::new(db))
            })
            .clone()
    }
}

impl std::fmt::Debug for FontChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline { db, family } => f
                .debug_struct("Outline")
                .field("faces", &db.len())
                .field("family", family)
                .finish(),
            Self::Bitmap => f.write_str("Bitmap"),
        }
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let files = self.files.lock().map_or(0, |m| m.len());
        f.debug_struct("FontBook")
            .field("system_loaded", &self.system.get().is_some())
            .field("files", &files)
            .finish()
    }
}

fn first_family(db: &Database) -> Option<String> {
    db.faces()
        .next()
        .and_then(|face| face.families.first())
        .map(|(name, _)| name.clone())
}

/// Font resolver that never fails while the database has a face.
pub(crate) fn make_svg_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Monospace);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                ..Default::default()
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

//! Template catalog loading and shared access

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, RwLock};

use log::{debug, warn};

use super::Template;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// In-memory set of card templates loaded from a directory.
///
/// Loading is tolerant: a missing directory yields an empty catalog and
/// unreadable files are skipped, so the full pipeline can run before any
/// templates exist. The catalog is immutable after load; a reload is a new
/// catalog.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Load every supported image file in `dir` as a template, deriving the
    /// card code from the filename stem.
    pub fn load(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut templates = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("template directory {} not readable: {err}", dir.display());
                return Self { templates };
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
                continue;
            };
            if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }
            let Some(stem) = path.file_stem() else {
                continue;
            };
            let code = stem.to_string_lossy().to_string();

            match image::open(&path) {
                Ok(img) => templates.push(Template::new(code, img.to_luma8())),
                Err(err) => {
                    warn!("skipping unreadable template {}: {err}", path.display());
                }
            }
        }

        debug!(
            "loaded {} templates from {}",
            templates.len(),
            dir.display()
        );
        Self { templates }
    }

    /// Construct directly from templates, mainly for tests and calibration
    pub fn from_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn entries(&self) -> &[Template] {
        &self.templates
    }

    pub fn codes(&self) -> BTreeSet<&str> {
        self.templates.iter().map(|t| t.code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Process-wide catalog handle safe for concurrent detection passes.
///
/// Readers take a cheap `Arc` snapshot; a reload builds a complete
/// replacement catalog and swaps the reference, so an in-flight pass never
/// observes a partially populated catalog.
#[derive(Debug)]
pub struct SharedCatalog {
    inner: RwLock<Arc<TemplateCatalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self {
            inner: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Load from a directory, tolerating its absence
    pub fn load(dir: impl AsRef<Path>) -> Self {
        Self::new(TemplateCatalog::load(dir))
    }

    /// Snapshot of the current catalog
    pub fn get(&self) -> Arc<TemplateCatalog> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Rebuild the catalog from `dir` and atomically swap it in
    pub fn reload(&self, dir: impl AsRef<Path>) {
        let fresh = Arc::new(TemplateCatalog::load(dir));
        match self.inner.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => *poisoned.into_inner() = fresh,
        }
    }
}

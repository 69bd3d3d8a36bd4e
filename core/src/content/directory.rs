use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde_json::Value;
use tracing::debug;

use super::{ContentEntry, ContentError, ContentProvider, PLAYERS_ID};

/// Name of the folder whose documents win slug collisions
const PREFERRED_FOLDER: &str = "content";

/// Serves `<root>/**/<id>.json`.
///
/// When two files share a slug, the one directly under `<root>/content/`
/// is used; otherwise the first in path order.
#[derive(Debug, Clone)]
pub struct DirectoryContent {
    root: PathBuf,
}

impl DirectoryContent {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_preferred(&self, path: &Path) -> bool {
        path.parent() == Some(self.root.join(PREFERRED_FOLDER).as_path())
    }

    /// Every document, deduplicated by slug
    fn index(&self) -> Result<HashMap<String, ContentEntry>, ContentError> {
        let mut files = Vec::new();
        if self.root.is_dir() {
            collect_json_files(&self.root, &mut files)?;
        }
        files.sort();

        let mut by_slug: HashMap<String, ContentEntry> = HashMap::new();
        for path in files {
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let entry = ContentEntry {
                slug: slug.to_string(),
                folder: path
                    .parent()
                    .and_then(|p| p.file_name())
                    .and_then(|f| f.to_str())
                    .unwrap_or_default()
                    .to_string(),
                path,
            };

            let keep_existing = by_slug
                .get(&entry.slug)
                .is_some_and(|existing| self.is_preferred(&existing.path) || !self.is_preferred(&entry.path));
            if keep_existing {
                debug!(slug = %entry.slug, skipped = %entry.path.display(), "Duplicate content slug");
            } else {
                by_slug.insert(entry.slug.clone(), entry);
            }
        }
        Ok(by_slug)
    }
}

fn collect_json_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ContentError> {
    let entries = fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            collect_json_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            out.push(path);
        }
    }
    Ok(())
}

impl ContentProvider for DirectoryContent {
    fn fetch_by_identifier(&self, id: &str) -> Result<Option<Value>, ContentError> {
        let index = self.index()?;
        let Some(entry) = index.get(id) else {
            return Ok(None);
        };

        let raw = fs::read_to_string(&entry.path).map_err(|source| ContentError::Io {
            path: entry.path.clone(),
            source,
        })?;
        let value = serde_json::from_str(&raw).map_err(|source| ContentError::Malformed {
            path: entry.path.clone(),
            source,
        })?;
        Ok(Some(value))
    }

    fn list_encounters(&self) -> Result<BTreeMap<String, Vec<ContentEntry>>, ContentError> {
        let mut grouped: BTreeMap<String, Vec<ContentEntry>> = BTreeMap::new();
        for entry in self.index()?.into_values().filter(|e| e.slug != PLAYERS_ID) {
            grouped.entry(entry.folder.clone()).or_default().push(entry);
        }
        for entries in grouped.values_mut() {
            entries.sort_by(|a, b| a.slug.cmp(&b.slug));
        }
        Ok(grouped)
    }
}

/// Curated photos shipped with the site
///
/// Read from a folder of images, walked recursively. Captions come from
/// an optional `captions.json` next to the images, mapping file names to
/// notes:
///
/// ```json
/// { "IMG_8029.jpg": "Save the date!" }
/// ```
///
/// Without a folder, a built-in set of captions is shown on placeholder
/// polaroids so the carousel is never blank on a fresh install.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::carousel::{Provenance, SourceItem};
use crate::config::CuratedConfig;
use crate::error::Result;

/// Image extensions the loader can decode
const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "gif", "bmp"];

const CAPTIONS_FILE: &str = "captions.json";

/// Notes shown when no curated folder exists
const FALLBACK_CAPTIONS: [&str; 8] = [
    "Save the date!",
    "We hope you can make it",
    "Excited to share our special day with you",
    "Let's party!",
    "Cant wait to see you <3",
    "Join us in celebration",
    "Please RSVP by the date",
    "See you at the celebration!",
];

/// Default folder: ~/.local/share/wedding-polaroids/curated on Linux
pub fn default_dir() -> Option<PathBuf> {
    let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
    path.push("wedding-polaroids");
    path.push("curated");
    Some(path)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn read_captions(dir: &Path) -> Result<HashMap<String, String>> {
    let path = dir.join(CAPTIONS_FILE);
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Load every image under `dir`, ordered by path
pub fn load_dir(dir: &Path) -> Result<Vec<SourceItem>> {
    let captions = read_captions(dir)?;

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    paths.sort();

    let items = paths
        .into_iter()
        .map(|path| {
            let filename = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let caption = captions.get(&filename).cloned().unwrap_or_default();
            SourceItem::new(path.to_string_lossy(), caption, Provenance::Curated)
        })
        .collect();

    Ok(items)
}

/// Placeholder polaroids with the built-in notes
pub fn fallback() -> Vec<SourceItem> {
    FALLBACK_CAPTIONS
        .iter()
        .map(|caption| SourceItem::new("", *caption, Provenance::Curated))
        .collect()
}

/// Curated items for the configured (or default) folder.
///
/// Never fails: an unreadable or empty folder falls back to the built-in
/// captions.
pub fn load(config: &CuratedConfig) -> Vec<SourceItem> {
    let Some(dir) = config.dir.clone().or_else(default_dir) else {
        return fallback();
    };

    if !dir.is_dir() {
        log::info!("📁 No curated folder at {}, using built-in notes", dir.display());
        return fallback();
    }

    match load_dir(&dir) {
        Ok(items) if !items.is_empty() => {
            log::info!("📸 Loaded {} curated photos from {}", items.len(), dir.display());
            items
        }
        Ok(_) => {
            log::warn!("⚠️  Curated folder {} has no images", dir.display());
            fallback()
        }
        Err(e) => {
            log::warn!("⚠️  Could not read curated folder {}: {}", dir.display(), e);
            fallback()
        }
    }
}

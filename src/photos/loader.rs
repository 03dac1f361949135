/// Image loading for card photos
///
/// A card's image reference can be:
/// - an http(s) URL (guest photos in the storage bucket)
/// - a `data:` URI (photos embedded directly in the feed)
/// - a local file path (curated photos)
///
/// Images are decoded, cropped into a polaroid frame off the UI thread,
/// then cached as iced handles keyed by the reference.

use base64::Engine;
use iced::widget::image::Handle;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Where the bytes for a reference come from
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Remote(String),
    Inline(String),
    File(PathBuf),
    /// Empty reference; drawn as a placeholder
    Missing,
}

impl ImageSource {
    pub fn classify(image_ref: &str) -> Self {
        let trimmed = image_ref.trim();
        if trimmed.is_empty() {
            ImageSource::Missing
        } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            ImageSource::Remote(trimmed.to_string())
        } else if trimmed.starts_with("data:") {
            ImageSource::Inline(trimmed.to_string())
        } else {
            ImageSource::File(PathBuf::from(trimmed))
        }
    }
}

/// Decode the payload of a base64 `data:` URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::Decode("not a data URI".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::Decode("data URI has no payload".into()))?;

    if !meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(Error::Decode("only base64 data URIs are supported".into()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::Decode(e.to_string()))
}

/// RGBA pixels ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn into_handle(self) -> Handle {
        Handle::from_rgba(self.width, self.height, self.pixels)
    }
}

/// Photo area aspect ratio (width:height = 4:5)
const PHOTO_ASPECT: f32 = 5.0 / 4.0;

/// Photo area size for a given photo width
pub fn photo_size(photo_width: u32) -> (u32, u32) {
    (photo_width, (photo_width as f32 * PHOTO_ASPECT).round() as u32)
}

/// Side/top border and the wider bottom strip, in px
fn borders(photo_width: u32) -> (u32, u32) {
    ((photo_width / 24).max(1), (photo_width / 5).max(1))
}

/// Pixel size of a whole framed polaroid
pub fn framed_size(photo_width: u32) -> (u32, u32) {
    let (w, h) = photo_size(photo_width);
    let (side, bottom) = borders(photo_width);
    (w + 2 * side, h + side + bottom)
}

/// Paste a photo into a white polaroid frame.
///
/// The frame is baked into the pixels so the whole polaroid rotates as
/// one image.
pub fn frame_polaroid(photo: &RgbaImage) -> RgbaImage {
    let (side, bottom) = borders(photo.width());
    let mut framed = RgbaImage::from_pixel(
        photo.width() + 2 * side,
        photo.height() + side + bottom,
        Rgba([255, 255, 255, 255]),
    );
    imageops::overlay(&mut framed, photo, side as i64, side as i64);
    framed
}

fn into_decoded(img: RgbaImage) -> DecodedImage {
    DecodedImage {
        width: img.width(),
        height: img.height(),
        pixels: img.into_raw(),
    }
}

/// Decode image bytes into a framed polaroid whose photo area is
/// `photo_width` wide. The photo is scaled and centre-cropped to fill it.
pub fn decode_polaroid(bytes: &[u8], photo_width: u32) -> Result<DecodedImage> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = photo_size(photo_width);
    let photo = img.resize_to_fill(w, h, FilterType::Triangle).to_rgba8();
    Ok(into_decoded(frame_polaroid(&photo)))
}

/// Blank polaroid used for missing or unloadable photos
pub fn placeholder(photo_width: u32) -> DecodedImage {
    let (w, h) = photo_size(photo_width);
    let photo = RgbaImage::from_pixel(w, h, Rgba([229, 231, 235, 255]));
    into_decoded(frame_polaroid(&photo))
}

async fn fetch_bytes(source: ImageSource, http: &reqwest::Client) -> Result<Vec<u8>> {
    match source {
        ImageSource::Remote(url) => {
            let response = http.get(&url).send().await?.error_for_status()?;
            Ok(response.bytes().await?.to_vec())
        }
        ImageSource::Inline(uri) => decode_data_uri(&uri),
        ImageSource::File(path) => Ok(tokio::fs::read(&path).await?),
        ImageSource::Missing => Err(Error::Decode("empty image reference".into())),
    }
}

/// Load and decode one image reference
pub async fn load(image_ref: String, http: reqwest::Client, photo_width: u32) -> Result<DecodedImage> {
    let bytes = fetch_bytes(ImageSource::classify(&image_ref), &http).await?;

    // Decoding is CPU-bound
    tokio::task::spawn_blocking(move || decode_polaroid(&bytes, photo_width))
        .await
        .map_err(|e| Error::Decode(format!("decode task failed: {}", e)))?
}

/// State of one reference in the cache
#[derive(Debug, Clone)]
pub enum ImageState {
    Loading,
    Ready(Handle),
    Failed,
}

/// Decoded photos by image reference
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, ImageState>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, image_ref: &str) -> Option<&ImageState> {
        self.entries.get(image_ref)
    }

    /// Mark unseen references as loading and return them for fetching.
    /// Empty references never load; they stay placeholders.
    pub fn request<'a, I>(&mut self, refs: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut wanted = Vec::new();
        for image_ref in refs {
            if ImageSource::classify(image_ref) == ImageSource::Missing {
                continue;
            }
            if !self.entries.contains_key(image_ref) {
                self.entries.insert(image_ref.to_string(), ImageState::Loading);
                wanted.push(image_ref.to_string());
            }
        }
        wanted
    }

    /// Record a finished load. Results for refs dropped by `retain` while
    /// loading are discarded.
    pub fn finish(&mut self, image_ref: String, result: std::result::Result<Handle, String>) {
        if !self.entries.contains_key(&image_ref) {
            log::debug!("Discarding photo no longer shown: {}", short_ref(&image_ref));
            return;
        }
        let state = match result {
            Ok(handle) => ImageState::Ready(handle),
            Err(e) => {
                log::warn!("⚠️  Could not load photo {}: {}", short_ref(&image_ref), e);
                ImageState::Failed
            }
        };
        self.entries.insert(image_ref, state);
    }

    /// Forget images no longer in the source list
    pub fn retain<'a, I>(&mut self, refs: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = refs.into_iter().collect();
        self.entries.retain(|key, _| keep.contains(key.as_str()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Data URIs can be megabytes long; keep log lines readable
pub fn short_ref(image_ref: &str) -> String {
    const MAX: usize = 60;
    if image_ref.chars().count() <= MAX {
        image_ref.to_string()
    } else {
        let head: String = image_ref.chars().take(MAX).collect();
        format!("{head}…")
    }
}

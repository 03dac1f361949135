/// Photo sources for the carousel
///
/// - Curated photos from a local folder (curated.rs)
/// - Approved guest photos from the hosted backend (feed.rs)
/// - Image fetching, decoding and caching (loader.rs)

pub mod curated;
pub mod feed;
pub mod loader;

use crate::carousel::SourceItem;
use crate::config::CuratedConfig;
use feed::FeedClient;

/// Load curated items without blocking the UI thread
pub async fn load_curated(config: CuratedConfig) -> Vec<SourceItem> {
    match tokio::task::spawn_blocking(move || curated::load(&config)).await {
        Ok(items) => items,
        Err(e) => {
            log::error!("❌ Curated photo scan panicked: {}", e);
            curated::fallback()
        }
    }
}

/// Fetch guest photos; errors are flattened to strings for the UI message
pub async fn fetch_guest(client: FeedClient) -> Result<Vec<SourceItem>, String> {
    client.fetch_approved().await.map_err(|e| e.to_string())
}

/// Load one card image as an iced handle
pub async fn load_image(
    image_ref: String,
    http: reqwest::Client,
    photo_width: u32,
) -> Result<iced::widget::image::Handle, String> {
    loader::load(image_ref, http, photo_width)
        .await
        .map(loader::DecodedImage::into_handle)
        .map_err(|e| e.to_string())
}

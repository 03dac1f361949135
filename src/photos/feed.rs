/// Approved guest photos from the hosted backend
///
/// The backend exposes the `photos` table through a PostgREST-style API
/// and serves the image objects from a public storage bucket. Only
/// approved rows are listed; moderation happens elsewhere.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::carousel::{Provenance, SourceItem};
use crate::config::FeedConfig;
use crate::error::{Error, Result};

/// A row of the `photos` table
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PhotoRow {
    pub id: String,
    pub storage_path: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    /// Set when the photo was submitted together with an RSVP
    #[serde(default)]
    pub rsvp_id: Option<String>,
}

/// Public URL of an object in a storage bucket
pub fn public_url(base_url: &str, bucket: &str, storage_path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        storage_path.trim_start_matches('/')
    )
}

/// Turn rows into carousel items, newest first, approved only
pub fn rows_to_items(mut rows: Vec<PhotoRow>, base_url: &str, bucket: &str) -> Vec<SourceItem> {
    rows.retain(|row| {
        let keep = row.approved && !row.storage_path.is_empty();
        if !keep {
            log::debug!("Skipping photo {} (not approved or no object)", row.id);
        }
        keep
    });
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    rows.into_iter()
        .map(|row| {
            let provenance = if row.rsvp_id.is_some() {
                Provenance::Rsvp
            } else {
                Provenance::UserSubmitted
            };
            SourceItem::new(
                public_url(base_url, bucket, &row.storage_path),
                row.note.unwrap_or_default(),
                provenance,
            )
        })
        .collect()
}

/// Mix guest photos into the curated set.
///
/// With no guest photos the curated order is kept; otherwise the
/// combined list is shuffled so guest photos turn up throughout.
pub fn combine<R: Rng + ?Sized>(
    guest: Vec<SourceItem>,
    curated: &[SourceItem],
    rng: &mut R,
) -> Vec<SourceItem> {
    if guest.is_empty() {
        return curated.to_vec();
    }
    let mut all = guest;
    all.extend_from_slice(curated);
    all.shuffle(rng);
    all
}

/// Whether a fetched guest list differs from the last one applied.
///
/// Before any list was applied, only a non-empty list counts as a change:
/// an empty feed leaves the curated stack as it is.
pub fn guest_list_changed(previous: Option<&[String]>, refs: &[String]) -> bool {
    match previous {
        Some(previous) => previous != refs,
        None => !refs.is_empty(),
    }
}

/// Thin client for the photo listing
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/rest/v1/photos?select=*&approved=eq.true&order=created_at.desc",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Fetch the approved photos as carousel items
    pub async fn fetch_approved(&self) -> Result<Vec<SourceItem>> {
        let response = self
            .http
            .get(self.endpoint())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Feed {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<PhotoRow> = response.json().await?;
        log::debug!("Photo feed returned {} rows", rows.len());

        Ok(rows_to_items(rows, &self.config.base_url, &self.config.bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ROWS: &str = r#"[
        {
            "id": "7d1c",
            "storage_path": "uploads/older.jpg",
            "note": "Congrats!",
            "approved": true,
            "created_at": "2025-05-01T10:00:00Z",
            "rsvp_id": null
        },
        {
            "id": "9a2f",
            "storage_path": "uploads/newer.jpg",
            "note": null,
            "approved": true,
            "created_at": "2025-06-01T10:00:00+00:00",
            "rsvp_id": "r-1"
        },
        {
            "id": "0000",
            "storage_path": "uploads/pending.jpg",
            "note": "not yet",
            "approved": false,
            "created_at": "2025-07-01T10:00:00Z"
        }
    ]"#;

    #[test]
    fn test_rows_map_to_guest_items() {
        let rows: Vec<PhotoRow> = serde_json::from_str(ROWS).unwrap();
        let items = rows_to_items(rows, "https://abc.supabase.co/", "photos");

        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].image_ref,
            "https://abc.supabase.co/storage/v1/object/public/photos/uploads/newer.jpg"
        );
        assert_eq!(items[0].caption, "");
        assert_eq!(items[1].caption, "Congrats!");
        assert_eq!(items[0].provenance, Provenance::Rsvp);
        assert_eq!(items[1].provenance, Provenance::UserSubmitted);
    }

    #[test]
    fn test_public_url_joins_cleanly() {
        assert_eq!(
            public_url("https://x.co", "photos", "/a/b.png"),
            "https://x.co/storage/v1/object/public/photos/a/b.png"
        );
    }

    #[test]
    fn test_combine_without_guests_keeps_order() {
        let curated = vec![
            SourceItem::new("a.jpg", "a", Provenance::Curated),
            SourceItem::new("b.jpg", "b", Provenance::Curated),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(combine(Vec::new(), &curated, &mut rng), curated);
    }

    #[test]
    fn test_combine_mixes_everything_in() {
        let curated: Vec<SourceItem> = (0..6)
            .map(|i| SourceItem::new(format!("c{i}.jpg"), "", Provenance::Curated))
            .collect();
        let guest: Vec<SourceItem> = (0..4)
            .map(|i| SourceItem::new(format!("g{i}.jpg"), "", Provenance::UserSubmitted))
            .collect();
        let mut rng = StdRng::seed_from_u64(99);

        let all = combine(guest, &curated, &mut rng);

        assert_eq!(all.len(), 10);
        assert_eq!(all.iter().filter(|i| i.provenance.badge().is_some()).count(), 4);
        for item in &curated {
            assert!(all.contains(item));
        }
    }

    #[test]
    fn test_guest_list_changes() {
        let a = vec!["a.jpg".to_string()];
        let ab = vec!["a.jpg".to_string(), "b.jpg".to_string()];

        assert!(!guest_list_changed(None, &[]));
        assert!(guest_list_changed(None, &a));
        assert!(!guest_list_changed(Some(&a), &a));
        assert!(guest_list_changed(Some(&a), &ab));
        assert!(guest_list_changed(Some(&ab), &[]));
    }

    #[test]
    fn test_endpoint_filters_approved() {
        let mut config = FeedConfig::default();
        config.base_url = "https://abc.supabase.co/".to_string();
        let client = FeedClient::new(config).unwrap();

        assert_eq!(
            client.endpoint(),
            "https://abc.supabase.co/rest/v1/photos?select=*&approved=eq.true&order=created_at.desc"
        );
    }
}

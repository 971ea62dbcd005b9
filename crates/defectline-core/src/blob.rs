use serde::{Deserialize, Serialize};

/// Opaque handle to a photo held in external blob storage.
///
/// Either a blob the remote store owns (addressed by storage key) or an
/// externally hosted blob addressed directly by URL. The handle has no
/// identity beyond its storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlobRef {
    Stored { key: String },
    External { url: String },
}

impl BlobRef {
    pub fn from_key(key: impl Into<String>) -> Self {
        BlobRef::Stored { key: key.into() }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        BlobRef::External { url: url.into() }
    }

    /// Storage key, if the store owns this blob.
    pub fn key(&self) -> Option<&str> {
        match self {
            BlobRef::Stored { key } => Some(key),
            BlobRef::External { .. } => None,
        }
    }

    /// Synchronous resolution to a fetchable URL, suitable for display.
    pub fn direct_url(&self, store_base: &str) -> String {
        match self {
            BlobRef::Stored { key } => {
                format!("{}/api/blobs/{key}", store_base.trim_end_matches('/'))
            }
            BlobRef::External { url } => url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_blob_resolves_under_store_base() {
        let blob = BlobRef::from_key("abc-123");
        assert_eq!(
            blob.direct_url("http://127.0.0.1:3620/"),
            "http://127.0.0.1:3620/api/blobs/abc-123"
        );
        assert_eq!(blob.key(), Some("abc-123"));
    }

    #[test]
    fn external_blob_resolves_to_its_own_url() {
        let blob = BlobRef::from_url("https://img.example/defect.png");
        assert_eq!(
            blob.direct_url("http://127.0.0.1:3620"),
            "https://img.example/defect.png"
        );
        assert_eq!(blob.key(), None);
    }

    #[test]
    fn serde_distinguishes_variants_by_field() {
        let stored: BlobRef = serde_json::from_str(r#"{"key":"k1"}"#).unwrap();
        assert_eq!(stored, BlobRef::from_key("k1"));

        let external: BlobRef = serde_json::from_str(r#"{"url":"https://x/y"}"#).unwrap();
        assert_eq!(external, BlobRef::from_url("https://x/y"));
    }
}

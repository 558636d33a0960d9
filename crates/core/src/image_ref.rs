//! Image references attached to projects.
//!
//! Older catalog files store an image as a bare URL string; uploads made
//! through the transcoding pipeline store an `{optimizedUrl, originalUrl}`
//! pair. Both shapes deserialize into [`ImageRef`], and every consumer goes
//! through [`ImageRef::normalize`] instead of inspecting the shape itself.

use serde::{Deserialize, Serialize};

/// The two stored representations of one uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    /// Size-bounded, re-encoded copy used for on-page display.
    pub optimized_url: String,
    /// Untouched upload, used for "download original".
    #[serde(default)]
    pub original_url: String,
}

/// A project image in either of its persisted shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Asset(AssetRef),
    Legacy(String),
}

/// Shape-independent view of an [`ImageRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedImage<'a> {
    pub display_url: &'a str,
    pub original_url: &'a str,
}

impl ImageRef {
    pub fn normalize(&self) -> NormalizedImage<'_> {
        match self {
            ImageRef::Legacy(url) => NormalizedImage {
                display_url: url,
                original_url: url,
            },
            ImageRef::Asset(asset) => {
                let original = if asset.original_url.is_empty() {
                    &asset.optimized_url
                } else {
                    &asset.original_url
                };
                NormalizedImage {
                    display_url: &asset.optimized_url,
                    original_url: original,
                }
            }
        }
    }
}

impl From<AssetRef> for ImageRef {
    fn from(asset: AssetRef) -> Self {
        ImageRef::Asset(asset)
    }
}

impl<'a> NormalizedImage<'a> {
    /// Every distinct, non-empty URL this image occupies in storage.
    pub fn stored_urls(&self) -> Vec<&'a str> {
        let mut urls = Vec::with_capacity(2);
        if !self.display_url.is_empty() {
            urls.push(self.display_url);
        }
        if !self.original_url.is_empty() && self.original_url != self.display_url {
            urls.push(self.original_url);
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_string_deserializes() {
        let image: ImageRef = serde_json::from_str(r#""/uploads/old.jpg""#).unwrap();
        assert_eq!(image, ImageRef::Legacy("/uploads/old.jpg".into()));
        let n = image.normalize();
        assert_eq!(n.display_url, "/uploads/old.jpg");
        assert_eq!(n.original_url, "/uploads/old.jpg");
        assert_eq!(n.stored_urls(), vec!["/uploads/old.jpg"]);
    }

    #[test]
    fn asset_object_deserializes() {
        let image: ImageRef = serde_json::from_str(
            r#"{"optimizedUrl": "/uploads/a-opt.jpg", "originalUrl": "/uploads/a.png"}"#,
        )
        .unwrap();
        let n = image.normalize();
        assert_eq!(n.display_url, "/uploads/a-opt.jpg");
        assert_eq!(n.original_url, "/uploads/a.png");
        assert_eq!(n.stored_urls(), vec!["/uploads/a-opt.jpg", "/uploads/a.png"]);
    }

    #[test]
    fn asset_without_original_falls_back_to_optimized() {
        let image: ImageRef =
            serde_json::from_str(r#"{"optimizedUrl": "/uploads/b-opt.jpg"}"#).unwrap();
        let n = image.normalize();
        assert_eq!(n.original_url, "/uploads/b-opt.jpg");
        assert_eq!(n.stored_urls(), vec!["/uploads/b-opt.jpg"]);
    }

    #[test]
    fn asset_serializes_camel_case() {
        let image = ImageRef::from(AssetRef {
            optimized_url: "/uploads/c-opt.jpg".into(),
            original_url: "/uploads/c.webp".into(),
        });
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["optimizedUrl"], "/uploads/c-opt.jpg");
        assert_eq!(json["originalUrl"], "/uploads/c.webp");
    }
}

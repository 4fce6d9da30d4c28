//! Image listing, share links and gallery filtering.

use repopix_store::{ContentEntry, ContentStore, ContentsResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::category::{is_marker_file, UNCATEGORIZED};
use crate::error::{HostError, Result};
use crate::host::ImageHost;
use crate::validation::validate_path;

/// File extensions recognized as images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp"];

/// Returns true if `name` ends with an allowed image extension.
#[must_use]
pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// An image file in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageItem {
    /// File name.
    pub name: String,
    /// Full repository path.
    pub path: String,
    /// Content hash of the current version.
    pub sha: String,
    /// Size in bytes.
    pub size: u64,
    /// Public download URL.
    pub download_url: String,
    /// Entry type as reported by the store.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Owning category; absent for the implicit default category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ImageItem {
    fn from_entry(entry: ContentEntry, category: Option<String>, fallback_url: String) -> Self {
        Self {
            content_type: entry.content_type.to_string(),
            download_url: entry.download_url.unwrap_or(fallback_url),
            name: entry.name,
            path: entry.path,
            sha: entry.sha,
            size: entry.size,
            category,
        }
    }

    /// Renders a shareable link in the requested format.
    #[must_use]
    pub fn link(&self, format: LinkFormat) -> String {
        format.render(&self.name, &self.download_url)
    }
}

/// Shareable link formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    /// The bare download URL.
    #[default]
    Raw,
    /// `![name](url)`.
    Markdown,
    /// `<img src="url" alt="name" />`.
    Html,
}

impl LinkFormat {
    /// Renders a link for `name` served from `url`.
    #[must_use]
    pub fn render(self, name: &str, url: &str) -> String {
        match self {
            Self::Raw => url.to_string(),
            Self::Markdown => format!("![{name}]({url})"),
            Self::Html => format!("<img src=\"{url}\" alt=\"{name}\" />"),
        }
    }
}

impl fmt::Display for LinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => write!(f, "raw"),
            Self::Markdown => write!(f, "markdown"),
            Self::Html => write!(f, "html"),
        }
    }
}

impl FromStr for LinkFormat {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "raw" | "url" => Ok(Self::Raw),
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(HostError::Validation(format!("unknown link format: {other}"))),
        }
    }
}

/// Narrows a gallery by name and category.
#[derive(Debug, Clone, Default)]
pub struct GalleryFilter {
    /// Case-insensitive substring of the file name.
    pub query: String,
    /// Category display name; [`UNCATEGORIZED`] selects images without one.
    pub category: Option<String>,
}

impl GalleryFilter {
    /// Returns true if `image` passes the filter.
    #[must_use]
    pub fn matches(&self, image: &ImageItem) -> bool {
        let matches_query = image
            .name
            .to_lowercase()
            .contains(&self.query.to_lowercase());

        let matches_category = match self.category.as_deref() {
            None => true,
            Some(UNCATEGORIZED) => image.category.is_none(),
            Some(name) => image.category.as_deref() == Some(name),
        };

        matches_query && matches_category
    }

    /// Applies the filter, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, images: &'a [ImageItem]) -> Vec<&'a ImageItem> {
        images.iter().filter(|image| self.matches(image)).collect()
    }
}

/// Category owning `path`: the first directory segment below `root`.
fn category_of(root: &str, path: &str) -> Option<String> {
    let rest = if root.is_empty() {
        path
    } else {
        path.strip_prefix(root)?.strip_prefix('/')?
    };
    rest.split_once('/').map(|(dir, _)| dir.to_string())
}

impl<S: ContentStore> ImageHost<S> {
    /// Lists images across all categories.
    ///
    /// Order follows category order, then remote listing order. A category
    /// that cannot be read is logged and skipped.
    ///
    /// # Errors
    ///
    /// Fails only if the category listing itself fails.
    pub async fn list_images(&self) -> Result<Vec<ImageItem>> {
        let categories = self.list_categories().await?;
        let mut images = Vec::new();

        for category in &categories {
            let entries = match self.store().get_content(&category.path).await {
                Ok(ContentsResponse::Directory(entries)) => entries,
                Ok(ContentsResponse::File(_)) => continue,
                Err(e) if e.is_not_found() => {
                    debug!(category = %category.name, "category directory is missing");
                    continue;
                }
                Err(e) => {
                    warn!(category = %category.name, error = %e, "failed to list category, skipping");
                    continue;
                }
            };

            let before = images.len();
            images.extend(
                entries
                    .into_iter()
                    .filter(|e| e.is_file() && !is_marker_file(&e.name) && is_image_name(&e.name))
                    .map(|e| {
                        let fallback = self.config().raw_url(&e.path);
                        let name = (!category.is_default()).then(|| category.name.clone());
                        ImageItem::from_entry(e, name, fallback)
                    }),
            );
            debug!(category = %category.name, count = images.len() - before, "listed images");
        }

        Ok(images)
    }

    /// Resolves the image at `path`, including images in nested subfolders.
    ///
    /// The category is the first directory below the root, if any.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::NotFound`] if nothing exists at `path`,
    /// [`HostError::NotAFile`] for a directory and [`HostError::Validation`]
    /// for a file that is not an image.
    pub async fn find_image(&self, path: &str) -> Result<ImageItem> {
        self.config().ensure_readable()?;
        let path = path.trim().trim_matches('/');
        validate_path(path)?;

        let entry = match self.store().get_content(path).await? {
            ContentsResponse::File(entry) if entry.is_file() => entry,
            _ => return Err(HostError::NotAFile(path.to_string())),
        };
        if is_marker_file(&entry.name) || !is_image_name(&entry.name) {
            return Err(HostError::Validation(format!("not an image: {path}")));
        }

        let category = category_of(&self.config().root, &entry.path);
        let fallback = self.config().raw_url(&entry.path);
        Ok(ImageItem::from_entry(entry, category, fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepositoryConfig;
    use proptest::prelude::*;
    use repopix_store::MemoryStore;
    use std::sync::Arc;

    fn host(store: &Arc<MemoryStore>) -> ImageHost<Arc<MemoryStore>> {
        ImageHost::new(RepositoryConfig::new("octo", "pics"), Arc::clone(store))
    }

    fn item(name: &str, category: Option<&str>) -> ImageItem {
        ImageItem {
            name: name.to_string(),
            path: format!("images/{name}"),
            sha: "abc".to_string(),
            size: 1,
            download_url: format!("https://raw.githubusercontent.com/o/r/main/images/{name}"),
            content_type: "file".to_string(),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_is_image_name() {
        assert!(is_image_name("cat.png"));
        assert!(is_image_name("IMG.PNG"));
        assert!(is_image_name("photo.JpEg"));
        assert!(is_image_name("vector.svg"));

        assert!(!is_image_name("doc.pdf"));
        assert!(!is_image_name("png"));
        assert!(!is_image_name(".keep"));
        assert!(!is_image_name("archive.png.zip"));
    }

    proptest! {
        #[test]
        fn prop_extension_check_ignores_case(stem in "[a-zA-Z0-9_-]{1,12}", idx in 0usize..7, upper: bool) {
            let ext = IMAGE_EXTENSIONS[idx];
            let ext = if upper { ext.to_uppercase() } else { ext.to_string() };
            let name = format!("{stem}.{ext}");
            prop_assert!(is_image_name(&name));
        }

        #[test]
        fn prop_other_extensions_rejected(stem in "[a-z]{1,8}", ext in "(pdf|txt|zip|heic|tiff|mp4)") {
            let name = format!("{stem}.{ext}");
            prop_assert!(!is_image_name(&name));
        }
    }

    #[test]
    fn test_link_formats() {
        let image = item("cat.png", None);
        let url = "https://raw.githubusercontent.com/o/r/main/images/cat.png";

        assert_eq!(image.link(LinkFormat::Raw), url);
        assert_eq!(image.link(LinkFormat::Markdown), format!("![cat.png]({url})"));
        assert_eq!(
            image.link(LinkFormat::Html),
            format!("<img src=\"{url}\" alt=\"cat.png\" />")
        );
        assert_eq!("MD".parse::<LinkFormat>().unwrap(), LinkFormat::Markdown);
        assert!("bbcode".parse::<LinkFormat>().is_err());
    }

    #[test]
    fn test_gallery_filter() {
        let images = vec![
            item("Cat.png", Some("Pets")),
            item("dog.png", Some("Pets")),
            item("beach.jpg", None),
        ];

        let all = GalleryFilter::default().apply(&images);
        assert_eq!(all.len(), 3);

        let cats = GalleryFilter { query: "cat".into(), category: None }.apply(&images);
        assert_eq!(cats.len(), 1);

        let uncategorized = GalleryFilter {
            query: String::new(),
            category: Some(UNCATEGORIZED.into()),
        }
        .apply(&images);
        assert_eq!(uncategorized[0].name, "beach.jpg");

        let pets = GalleryFilter { query: "O".into(), category: Some("Pets".into()) }.apply(&images);
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].name, "dog.png");
    }

    #[tokio::test]
    async fn test_list_images_filters_and_stamps_categories() {
        let store = Arc::new(MemoryStore::new());
        store.insert("images/.keep", "");
        store.insert("images/top.png", "t");
        store.insert("images/notes.pdf", "n");
        store.insert("images/Pets/.keep", "");
        store.insert("images/Pets/IMG.PNG", "p");
        store.insert("images/Pets/.gitkeep", "");
        store.insert("images/Pets/2024/nested.png", "n");

        let images = host(&store).list_images().await.unwrap();
        let listed: Vec<_> = images
            .iter()
            .map(|i| (i.name.as_str(), i.category.as_deref()))
            .collect();

        assert_eq!(listed, vec![("top.png", None), ("IMG.PNG", Some("Pets"))]);
        assert_eq!(
            images[1].download_url,
            "https://raw.githubusercontent.com/octo/pics/main/images/Pets/IMG.PNG"
        );
        assert_eq!(images[1].content_type, "file");
    }

    #[tokio::test]
    async fn test_list_images_skips_unreachable_category() {
        let store = Arc::new(MemoryStore::new());
        store.insert("images/a.png", "a");
        store.insert("images/Broken/b.png", "b");
        store.insert("images/Fine/c.png", "c");
        store.fail_reads("images/Broken", 500);

        let images = host(&store).list_images().await.unwrap();
        let names: Vec<_> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
    }

    #[tokio::test]
    async fn test_list_images_with_missing_root_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let images = host(&store).list_images().await.unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_category_of() {
        assert_eq!(category_of("images", "images/a.png"), None);
        assert_eq!(category_of("images", "images/Pets/a.png"), Some("Pets".into()));
        assert_eq!(
            category_of("images", "images/Pets/2024/trip/a.png"),
            Some("Pets".into())
        );
        assert_eq!(category_of("", "Pets/a.png"), Some("Pets".into()));
        assert_eq!(category_of("images", "imagesX/a.png"), None);
    }

    #[tokio::test]
    async fn test_find_image() {
        let store = Arc::new(MemoryStore::new());
        store.insert("images/Pets/cat.png", "c");
        store.insert("images/top.png", "t");

        let host = host(&store);
        let found = host.find_image("/images/Pets/cat.png").await.unwrap();
        assert_eq!(found.category.as_deref(), Some("Pets"));

        let top = host.find_image("images/top.png").await.unwrap();
        assert_eq!(top.category, None);
        assert!(matches!(
            host.find_image("images/none.png").await,
            Err(HostError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_find_image_in_nested_subfolder() {
        let store = Arc::new(MemoryStore::new());
        store.insert("images/Pets/2024/trip/.keep", "");
        store.insert("images/Pets/2024/trip/1-dog.png", "d");

        let host = host(&store);
        let found = host
            .find_image("images/Pets/2024/trip/1-dog.png")
            .await
            .unwrap();
        assert_eq!(found.category.as_deref(), Some("Pets"));
        assert_eq!(
            found.link(LinkFormat::Raw),
            "https://raw.githubusercontent.com/octo/pics/main/images/Pets/2024/trip/1-dog.png"
        );

        assert!(matches!(
            host.find_image("images/Pets/2024").await,
            Err(HostError::NotAFile(_))
        ));
        assert!(matches!(
            host.find_image("images/Pets/2024/trip/.keep").await,
            Err(HostError::Validation(_))
        ));
    }
}

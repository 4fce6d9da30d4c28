//! # Repopix Core
//!
//! Image hosting on top of a repository content store. Images are plain files
//! under a configured root directory; each immediate subdirectory of the root
//! is a category.
//!
//! ## Features
//!
//! - **Categories**: list and create folder-backed categories
//! - **Gallery**: aggregate images across categories, filter them, render share links
//! - **Uploads**: commit files under timestamped names, provisioning nested folders
//! - **Deletion**: remove a file by resolving its current content hash
//! - **Batches**: walk dropped folders and upload the result one file at a time
//! - **Settings**: local presentation settings and an optional access gate
//!
//! ## Example
//!
//! ```rust,ignore
//! use repopix_core::{ImageHost, RepositoryConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let host = ImageHost::github(RepositoryConfig::from_env()?)?;
//!
//!     host.create_category("Pets").await?;
//!     let url = host
//!         .upload(&std::fs::read("cat.png")?, "cat.png", Some("Pets"), Some("2024"))
//!         .await?;
//!     println!("{url}");
//!
//!     for image in host.list_images().await? {
//!         println!("{} {}", image.name, image.download_url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod category;
pub mod config;
pub mod delete;
pub mod error;
pub mod host;
pub mod image;
pub mod queue;
pub mod settings;
pub mod upload;
pub mod validation;

pub use auth::{enable_two_factor, AccessGate, AuthError};
pub use category::{Category, DEFAULT_CATEGORY_ID, MARKER_FILE, UNCATEGORIZED};
pub use config::RepositoryConfig;
pub use error::{HostError, Result};
pub use host::ImageHost;
pub use image::{is_image_name, GalleryFilter, ImageItem, LinkFormat, IMAGE_EXTENSIONS};
pub use queue::{collect_uploads, ProgressCallback, UploadItem, UploadQueue, UploadStatus, UploadSummary};
pub use settings::{AnimationSpeed, Settings, SettingsPatch, SettingsStore};
pub use upload::derive_file_name;

/// Version of the core library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

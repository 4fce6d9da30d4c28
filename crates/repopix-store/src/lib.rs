//! # Repopix Content Store
//!
//! Client side of the repository content store that backs repopix.
//!
//! This crate provides:
//! - **Wire types**: file and directory descriptors returned by the Contents API
//! - **[`ContentStore`]**: the three primitives every higher layer is written against
//! - **[`GitHubStore`]**: the GitHub Contents API implementation
//! - **[`MemoryStore`]**: an in-memory implementation for tests and dry runs
//!
//! ## Example
//!
//! ```rust
//! use repopix_store::{ContentStore, MemoryStore};
//!
//! # tokio_test_block(async {
//! let store = MemoryStore::new();
//! store.put_file("images/cat.png", b"\x89PNG", "Upload image: cat.png", None).await.unwrap();
//!
//! let listing = store.get_content("images").await.unwrap();
//! assert_eq!(listing.into_directory().unwrap().len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Errors
//!
//! Missing paths surface as [`StoreError::NotFound`], which callers probing
//! for existence treat as a signal rather than a failure. Credential problems
//! surface as [`StoreError::Unauthorized`]; everything else carries the
//! remote status.

pub mod error;
pub mod github;
pub mod memory;
pub mod traits;
pub mod types;

pub use error::{Result, StoreError};
pub use github::{GitHubStore, DEFAULT_API_URL};
pub use memory::{MemoryStore, StoreCall};
pub use traits::ContentStore;
pub use types::{
    CommitRef, ContentEntry, ContentType, ContentsResponse, DeleteFileRequest, PutFileRequest,
    PutFileResponse,
};

mod error;
mod hash;
mod path;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use hash::ContentHash;
pub use path::BlobPath;
pub use traits::{BlobStore, StoredBlob};

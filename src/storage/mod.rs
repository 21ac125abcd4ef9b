//! Archive of downloaded plan documents.
//!
//! ## Layout
//!
//! ```text
//! {dir}/
//! ├── Schedule-24.3-2023_2024.pdf    # document as downloaded
//! └── Schedule-24.3-2023_2024.json   # parsed plan
//! ```
//!
//! The school year pair keeps names unique across years; a document that is
//! re-published for the same day overwrites the previous copy.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{TableInformation, TimeInfo};

pub use local::LocalArchive;

/// Storage for plan documents and their parsed form.
#[async_trait]
pub trait PlanArchive: Send + Sync {
    /// Store `document` next to `plan`, returning the document's path.
    async fn store(&self, document: &[u8], plan: &TableInformation) -> Result<PathBuf>;
}

/// File name stem for a plan, e.g. `Schedule-24.3-2023_2024`.
pub fn file_stem(time: &TimeInfo) -> String {
    format!(
        "Schedule-{}.{}-{}_{}",
        time.day_numerical, time.month_numerical, time.year_one, time.year_two
    )
}

/// Hex SHA-256 of a document.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

//! External catalog lookup types

use serde::{Deserialize, Serialize};

/// A candidate album returned by the external catalog for a title search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Id in the external catalog, usable with `MetadataLookup::detail`
    pub external_id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub cover: String,
}

//! The metadata catalog seam

use std::sync::Arc;

use async_trait::async_trait;
use watchstat_common::{CatalogEntry, Result};

/// A searchable movie metadata catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    /// All candidates the catalog returns for a title search
    async fn search_movies(&self, title: &str) -> Result<Vec<CatalogEntry>>;
}

#[async_trait]
impl<C> MetadataCatalog for Arc<C>
where
    C: MetadataCatalog + ?Sized,
{
    async fn search_movies(&self, title: &str) -> Result<Vec<CatalogEntry>> {
        (**self).search_movies(title).await
    }
}

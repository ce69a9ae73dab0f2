mod index;
mod model;
mod stats;
mod storage;
mod store;

pub use index::{build_reverse_index, IndexRecord, ReverseIndex};
pub use model::{entry_path, slug, Catalog, CatalogEntry, CatalogMetadata, Level};
pub use stats::{brand_detail, BrandCount, CatalogStats, ModelLine};
pub use storage::{atomic_write_json, CatalogStorage, JsonCatalogStorage};
pub use store::CatalogStore;

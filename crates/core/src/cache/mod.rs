pub mod catalog;
pub mod detail;

pub use catalog::CatalogCache;
pub use detail::DetailCache;

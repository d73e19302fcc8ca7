pub mod error;
pub mod images;
pub mod tmdb;
pub mod traits;

pub use error::CatalogError;
pub use images::ImageUrls;
pub use tmdb::TmdbClient;
pub use traits::MovieCatalog;

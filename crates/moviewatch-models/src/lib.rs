pub mod catalog;
pub mod movie;
pub mod watchlist;

pub use catalog::{CastMember, Credits, Genre, MovieCategory, MovieDetails, MoviePage, ProductionCompany};
pub use movie::{MovieId, MovieSummary};
pub use watchlist::WatchlistEntry;

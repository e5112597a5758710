//! Headless core for a Netflix-style movie streaming client: typed
//! movie-metadata clients, concurrent catalog aggregation, a session store
//! over a hosted identity provider, account flows, and embed-URL builders.
//! Rendering and navigation live elsewhere; everything here is driveable
//! from tests and from the thin binary.

pub mod detail;
pub mod embed;
pub mod error;
pub mod home;
pub mod identity;
pub mod media;
pub mod profile;
pub mod screen;
pub mod search;
pub mod session;
pub mod settings;
pub mod tmdb;

pub use error::{IdentityError, TmdbError};
pub use session::{Session, SessionState, SessionStore};
pub use tmdb::{CatalogClient, CatalogSource, TmdbClient};

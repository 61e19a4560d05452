//! URL helpers for repository crawling
//!
//! Directory listings are addressed by plain strings throughout the crawl;
//! these helpers keep them well formed (single slashes, trailing `/` on
//! directories) and build the repository references handed to consumers.

mod auth;
mod normalize;

pub use auth::{add_auth_to_url, with_optional_auth};
pub use normalize::{collapse_slashes, ensure_trailing_slash, go_up, resolve_href};

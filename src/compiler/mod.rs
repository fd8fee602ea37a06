mod compilers;
mod download_cache;
mod fetcher;
mod list_fetcher;
mod version;

pub use compilers::{Compilers, Error};
pub use download_cache::DownloadCache;
pub use fetcher::{FetchError, Fetcher};
pub use list_fetcher::ListFetcher;
pub use version::{ParseError, Version};

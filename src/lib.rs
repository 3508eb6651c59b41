pub mod directory;
pub mod export;
pub mod fake_feed;
pub mod feed;
pub mod gamelog;
pub mod http_cache;
pub mod http_client;
pub mod persist;
pub mod state;
pub mod trend;

pub mod key;
pub mod store;

pub use key::make_cache_key;
pub use store::ResponseCache;

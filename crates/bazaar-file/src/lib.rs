//! bazaar-file - Session persistence on the local filesystem.

mod store;

pub use store::FileStore;

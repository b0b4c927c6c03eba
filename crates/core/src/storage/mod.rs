pub mod format;
pub mod memory;
pub mod file;
pub mod traits;

pub use memory::MemoryStore;
pub use file::FileStore;
pub use traits::KeyValueStore;

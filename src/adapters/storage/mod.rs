pub mod in_memory;
pub mod json_file;
pub mod table;

pub use in_memory::InMemoryStore;
pub use json_file::JsonFileStore;
pub use table::Table;

pub mod http;
pub mod json_file;
pub mod memory;

pub use http::HttpStorage;
pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

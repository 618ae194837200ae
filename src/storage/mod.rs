pub mod sqlite_sink;

pub use sqlite_sink::SqliteSink;

pub mod session_store;
pub mod text_source;

pub use session_store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use text_source::{Lines, MemoryTextSource, PlainTextSource, TextSource};

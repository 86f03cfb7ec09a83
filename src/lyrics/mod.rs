// lyrics/mod.rs - top-level lyrics module re-exporting submodules
pub mod cursor;
pub mod parse;

pub use cursor::select_active_line;
pub use parse::{LyricEntry, parse_lyric_document};

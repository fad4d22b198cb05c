//! WikiLinks Core Library
//!
//! Link detection, note matching, candidate ranking and note creation for
//! `[[wiki-link]]` style notes. Synchronous; file access goes through
//! [`vfs::FileSystem`] so editors can plug in their own view of the disk.
//!

mod cache;
pub mod config;
mod discovery;
pub mod error;
pub mod line_map;
pub mod matcher;
pub mod model;
pub mod parser;
pub mod ranker;
pub mod utils;
pub mod vfs;
pub mod workspace;

pub use config::{ConfigError, NewNoteConfig, NoteDirectory, WikiLinksConfig};
pub use error::NoteError;
pub use model::NamingConvention;
pub use utils::{
    names_match, normalize_note_name, note_file_name_from_title, slugify_title, strip_extension,
};
pub use vfs::{FileSystem, PhysicalFileSystem};
pub use workspace::{NewNote, Workspace};

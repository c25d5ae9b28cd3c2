//! dirsort - sorts the entries of a directory into category and extension folders
//!
//! Files are classified by extension and moved to `CATEGORY/EXT/` below a destination root.
//! Folders are grouped into `FOLDERS`, or merged into the category tree when their name
//! shows they were made by an earlier run. Name collisions never overwrite: a
//! `" - dup (N)"` suffix is added instead. Custom groups collect everything under one
//! name and carry a marker file so later runs leave them alone.

pub mod cli;
pub mod config;
pub mod context;
pub mod entry;
pub mod error;
pub mod file_category;
pub mod file_entry;
pub mod file_organizer;
pub mod folder_entry;
pub mod fs_ops;
pub mod hidden;
pub mod history;
pub mod naming;
pub mod output;
pub mod path_entry;

pub use config::{CompiledFilters, ConfigError, SorterConfig};
pub use context::SortContext;
pub use entry::Entry;
pub use error::{SortError, SortResult};
pub use file_category::{Classifier, TypeGroups};
pub use file_entry::{FileEntry, FileKind};
pub use file_organizer::{FileOrganizer, OrganizeOptions, OrganizeReport};
pub use folder_entry::{FolderEntry, FolderKind};
pub use history::{JsonHistory, Tracker};
pub use naming::NameResolver;
pub use path_entry::PathEntry;

pub use cli::{Cli, run_cli};

//! Filesystem binding: items are files and directories, generators are `path`,
//! `size`, `regex`, `symlink`, `recurse` and `realpath`.
//!
//! ```no_run
//! use query_pt::examples::filesystem;
//! use query_pt::QueryParser;
//!
//! let env = filesystem::environment();
//! let tree = QueryParser::new()
//!     .parse("path:/etc/alternatives and not symlink")
//!     .unwrap();
//! for item in tree.evaluate(&env).unwrap() {
//!     println!("{}", item.unwrap().path().display());
//! }
//! ```

mod generators;
mod objects;

pub use generators::{
    environment, PathGenerator, RealpathFilter, RecurseFilter, RegexFilter, SizeFilter,
    SymlinkFilter,
};
pub use objects::{FileWalk, FsItem};

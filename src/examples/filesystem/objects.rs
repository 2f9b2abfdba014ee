use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
/// A file or directory in the filesystem universe.
///
/// Identity is the path alone: a file and a directory at the same path compare
/// equal and hash identically, which is what the union dedup relies on.
pub enum FsItem {
    File(PathBuf),
    Dir(PathBuf),
}

impl FsItem {
    /// Classify an existing path; anything that is not a regular file counts as
    /// a directory.
    pub fn from_path(path: PathBuf) -> FsItem {
        if path.is_file() {
            FsItem::File(path)
        } else {
            FsItem::Dir(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            FsItem::File(path) | FsItem::Dir(path) => path,
        }
    }

    pub fn size(&self) -> io::Result<u64> {
        fs::metadata(self.path()).map(|metadata| metadata.len())
    }

    /// All files contained in the item: the item itself for a file, a lazy
    /// recursive walk for a directory.
    pub fn file_items(&self) -> FileWalk {
        match self {
            FsItem::File(path) => FileWalk {
                emit_self: Some(FsItem::File(path.clone())),
                pending: Vec::new(),
                current: None,
            },
            FsItem::Dir(path) => FileWalk {
                emit_self: None,
                pending: vec![path.clone()],
                current: None,
            },
        }
    }
}

impl PartialEq for FsItem {
    fn eq(&self, other: &Self) -> bool {
        self.path() == other.path()
    }
}

impl Eq for FsItem {}

impl Hash for FsItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path().hash(state);
    }
}

/// Depth-first walk over the files under a directory.
///
/// Unreadable directories and entries are skipped silently. Symlinks to files
/// are yielded; symlinked directories are not followed.
pub struct FileWalk {
    emit_self: Option<FsItem>,
    pending: Vec<PathBuf>,
    current: Option<fs::ReadDir>,
}

impl Iterator for FileWalk {
    type Item = FsItem;

    fn next(&mut self) -> Option<FsItem> {
        if let Some(item) = self.emit_self.take() {
            return Some(item);
        }
        loop {
            if let Some(entries) = self.current.as_mut() {
                for entry in entries.by_ref() {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(_) => continue,
                    };
                    let file_type = match entry.file_type() {
                        Ok(file_type) => file_type,
                        Err(_) => continue,
                    };
                    let path = entry.path();
                    if file_type.is_dir() {
                        self.pending.push(path);
                    } else if file_type.is_file() {
                        return Some(FsItem::File(path));
                    } else if file_type.is_symlink() && path.is_file() {
                        return Some(FsItem::File(path));
                    }
                }
                self.current = None;
            }
            let dir = self.pending.pop()?;
            self.current = fs::read_dir(dir).ok();
        }
    }
}

use super::objects::FsItem;
use crate::{DefaultEnvironment, EvalError, IGenerator, ItemStream, Opts};
use regex::Regex;
use std::fs;
use std::iter;
use std::path::PathBuf;
use std::rc::Rc;

/// A [DefaultEnvironment] with every filesystem generator registered.
pub fn environment() -> DefaultEnvironment<FsItem> {
    let mut env = DefaultEnvironment::new();
    env.add_generator(Rc::new(PathGenerator)).unwrap();
    env.add_generator(Rc::new(SizeFilter)).unwrap();
    env.add_generator(Rc::new(RegexFilter)).unwrap();
    env.add_generator(Rc::new(SymlinkFilter)).unwrap();
    env.add_generator(Rc::new(RecurseFilter)).unwrap();
    env.add_generator(Rc::new(RealpathFilter)).unwrap();
    env
}

/// Expand every item of `source` into the files it contains, passing upstream
/// errors through.
fn recurse_files<'i>(
    source: ItemStream<'i, FsItem>,
) -> impl Iterator<Item = Result<FsItem, EvalError>> + 'i {
    source.flat_map(|entry| -> Box<dyn Iterator<Item = Result<FsItem, EvalError>>> {
        match entry {
            Ok(item) => Box::new(item.file_items().map(Ok)),
            Err(err) => Box::new(iter::once(Err(err))),
        }
    })
}

/// `path:P` — as a source, yields the directory item `P`; as a filter, keeps
/// items whose path equals `P` or is rooted under `P/`.
pub struct PathGenerator;

impl IGenerator for PathGenerator {
    type Item = FsItem;

    fn key(&self) -> &'static str {
        "path"
    }

    fn generate<'g>(
        &'g self,
        value: &str,
        _opts: &Opts,
        positive: bool,
    ) -> Result<ItemStream<'g, FsItem>, EvalError> {
        if !positive {
            return Err(EvalError::not_supported(
                "generator 'path' does not support negative generation",
            ));
        }
        let item = FsItem::Dir(PathBuf::from(value));
        Ok(Box::new(iter::once(Ok(item))))
    }

    fn filter<'g>(
        &'g self,
        source: ItemStream<'g, FsItem>,
        value: &str,
        _opts: &Opts,
        positive: bool,
    ) -> Result<ItemStream<'g, FsItem>, EvalError> {
        let target = value.to_string();
        let prefix = if target.ends_with('/') {
            target.clone()
        } else {
            format!("{}/", target)
        };
        Ok(Box::new(source.filter(move |entry| match entry {
            Ok(item) => {
                let path = item.path().to_string_lossy();
                let matched = path == target.as_str() || path.starts_with(prefix.as_str());
                matched == positive
            }
            Err(_) => true,
        })))
    }
}

/// `size:N`, `size:MIN-MAX`, `size:-MAX`, `size:MIN-` — keeps contained files
/// whose size is inside the bounds.
pub struct SizeFilter;

fn parse_size_spec(spec: &str) -> Result<(Option<u64>, Option<u64>), String> {
    if !spec.contains('-') {
        let size: u64 = spec
            .parse()
            .map_err(|_| format!("invalid size specification: {}", spec))?;
        return Ok((Some(size), Some(size)));
    }
    let bounds: Vec<&str> = spec.split('-').collect();
    if bounds.len() != 2 {
        return Err(format!("invalid size specification: {}", spec));
    }
    let parse_bound = |bound: &str| -> Result<Option<u64>, String> {
        if bound.is_empty() {
            Ok(None)
        } else {
            bound
                .parse()
                .map(Some)
                .map_err(|_| format!("invalid size specification: {}", spec))
        }
    };
    Ok((parse_bound(bounds[0])?, parse_bound(bounds[1])?))
}

impl IGenerator for SizeFilter {
    type Item = FsItem;

    fn key(&self) -> &'static str {
        "size"
    }

    fn filter<'g>(
        &'g self,
        source: ItemStream<'g, FsItem>,
        value: &str,
        _opts: &Opts,
        positive: bool,
    ) -> Result<ItemStream<'g, FsItem>, EvalError> {
        let (min_size, max_size) =
            parse_size_spec(value).map_err(|message| EvalError::generator("size", message))?;
        Ok(Box::new(recurse_files(source).filter_map(move |entry| {
            let item = match entry {
                Ok(item) => item,
                Err(err) => return Some(Err(err)),
            };
            let size = match item.size() {
                Ok(size) => size,
                Err(err) => return Some(Err(EvalError::generator("size", err))),
            };
            let matched = min_size.map_or(true, |min| min <= size)
                && max_size.map_or(true, |max| size <= max);
            if matched == positive {
                Some(Ok(item))
            } else {
                None
            }
        })))
    }
}

/// `regex:RE` — keeps contained files whose path matches the pattern anywhere.
pub struct RegexFilter;

impl IGenerator for RegexFilter {
    type Item = FsItem;

    fn key(&self) -> &'static str {
        "regex"
    }

    fn filter<'g>(
        &'g self,
        source: ItemStream<'g, FsItem>,
        value: &str,
        _opts: &Opts,
        positive: bool,
    ) -> Result<ItemStream<'g, FsItem>, EvalError> {
        let pattern = Regex::new(value).map_err(|err| EvalError::generator("regex", err))?;
        Ok(Box::new(recurse_files(source).filter_map(move |entry| {
            let item = match entry {
                Ok(item) => item,
                Err(err) => return Some(Err(err)),
            };
            let matched = pattern.is_match(item.path().to_string_lossy().as_ref());
            if matched == positive {
                Some(Ok(item))
            } else {
                None
            }
        })))
    }
}

/// `symlink` — keeps contained files whose path is a symbolic link.
pub struct SymlinkFilter;

impl IGenerator for SymlinkFilter {
    type Item = FsItem;

    fn key(&self) -> &'static str {
        "symlink"
    }

    fn filter<'g>(
        &'g self,
        source: ItemStream<'g, FsItem>,
        _value: &str,
        _opts: &Opts,
        positive: bool,
    ) -> Result<ItemStream<'g, FsItem>, EvalError> {
        Ok(Box::new(recurse_files(source).filter_map(move |entry| {
            let item = match entry {
                Ok(item) => item,
                Err(err) => return Some(Err(err)),
            };
            // Stat failure counts as "not a symlink".
            let matched = fs::symlink_metadata(item.path())
                .map(|metadata| metadata.file_type().is_symlink())
                .unwrap_or(false);
            if matched == positive {
                Some(Ok(item))
            } else {
                None
            }
        })))
    }
}

/// `recurse` — expands every directory into the files it contains. Positive
/// only.
pub struct RecurseFilter;

impl IGenerator for RecurseFilter {
    type Item = FsItem;

    fn key(&self) -> &'static str {
        "recurse"
    }

    fn filter<'g>(
        &'g self,
        source: ItemStream<'g, FsItem>,
        _value: &str,
        _opts: &Opts,
        positive: bool,
    ) -> Result<ItemStream<'g, FsItem>, EvalError> {
        if !positive {
            return Err(EvalError::not_supported(
                "generator 'recurse' does not support negative filtering",
            ));
        }
        Ok(Box::new(recurse_files(source)))
    }
}

/// `realpath` — replaces every item with the item at its canonical path.
/// Positive only.
pub struct RealpathFilter;

impl IGenerator for RealpathFilter {
    type Item = FsItem;

    fn key(&self) -> &'static str {
        "realpath"
    }

    fn filter<'g>(
        &'g self,
        source: ItemStream<'g, FsItem>,
        _value: &str,
        _opts: &Opts,
        positive: bool,
    ) -> Result<ItemStream<'g, FsItem>, EvalError> {
        if !positive {
            return Err(EvalError::not_supported(
                "generator 'realpath' does not support negative filtering",
            ));
        }
        Ok(Box::new(source.map(|entry| {
            let item = entry?;
            // Best effort: a path that cannot be canonicalized passes through
            // unresolved.
            let resolved =
                fs::canonicalize(item.path()).unwrap_or_else(|_| item.path().to_path_buf());
            Ok(FsItem::from_path(resolved))
        })))
    }
}

use crate::examples::filesystem::{environment, FsItem};
use crate::{DefaultEnvironment, EvalError, QueryParser};
use std::fs;
use std::path::{Path, PathBuf};

fn build_tree(root: &Path) {
    fs::create_dir_all(root.join("sub")).unwrap();
    fs::write(root.join("a.log"), vec![0u8; 1024]).unwrap();
    fs::write(root.join("b.log"), vec![0u8; 2048]).unwrap();
    fs::write(root.join("c.txt"), b"").unwrap();
    fs::write(root.join("sub").join("d.log"), b"").unwrap();
}

fn run(query: &str, env: &DefaultEnvironment<FsItem>) -> Vec<PathBuf> {
    let tree = QueryParser::new().parse(query).unwrap();
    let mut paths: Vec<PathBuf> = tree
        .evaluate(env)
        .unwrap()
        .map(|entry| entry.unwrap().path().to_path_buf())
        .collect();
    paths.sort();
    paths
}

#[test]
fn size_zero_finds_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{} and size:0", root.display());
    assert_eq!(
        run(&query, &env),
        vec![root.join("c.txt"), root.join("sub").join("d.log")]
    );
}

#[test]
fn size_alternatives_union() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{} and ( size:1024 or size:2048 )", root.display());
    assert_eq!(
        run(&query, &env),
        vec![root.join("a.log"), root.join("b.log")]
    );
}

#[test]
fn open_ended_size_ranges() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{} and size:1025-", root.display());
    assert_eq!(run(&query, &env), vec![root.join("b.log")]);

    let query = format!("path:{} and size:-1024", root.display());
    assert_eq!(
        run(&query, &env),
        vec![
            root.join("a.log"),
            root.join("c.txt"),
            root.join("sub").join("d.log"),
        ]
    );

    let query = format!("path:{} and size:1024-2048", root.display());
    assert_eq!(
        run(&query, &env),
        vec![root.join("a.log"), root.join("b.log")]
    );
}

#[test]
fn regex_matches_anywhere_in_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    // Single quotes keep the backslash away from the tokenizer.
    let query = format!(r"path:{} and regex:'\.log$'", root.display());
    assert_eq!(
        run(&query, &env),
        vec![
            root.join("a.log"),
            root.join("b.log"),
            root.join("sub").join("d.log"),
        ]
    );

    // Unquoted, the tokenizer consumes the backslash; `.` still matches.
    let query = format!(r"path:{} and regex:.*\.log$", root.display());
    assert_eq!(
        run(&query, &env),
        vec![
            root.join("a.log"),
            root.join("b.log"),
            root.join("sub").join("d.log"),
        ]
    );
}

#[test]
fn negated_regex_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!(r"path:{} and not regex:'\.log$'", root.display());
    assert_eq!(run(&query, &env), vec![root.join("c.txt")]);
}

#[test]
fn subtraction_removes_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{} - size:0", root.display());
    assert_eq!(
        run(&query, &env),
        vec![root.join("a.log"), root.join("b.log")]
    );
}

#[test]
fn path_filter_keeps_rooted_items() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!(
        "path:{} and recurse and path:{}",
        root.display(),
        root.join("sub").display()
    );
    assert_eq!(run(&query, &env), vec![root.join("sub").join("d.log")]);

    // Sibling directories sharing a name prefix are not rooted under the value.
    fs::create_dir_all(dir.path().join("tx")).unwrap();
    fs::write(dir.path().join("tx").join("e.log"), b"").unwrap();
    let query = format!(
        "path:{} and recurse and path:{}",
        dir.path().display(),
        root.display()
    );
    let matched = run(&query, &env);
    assert!(!matched.contains(&dir.path().join("tx").join("e.log")));
}

#[test]
fn path_filter_keeps_exact_matches() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{0} and path:{0}", root.display());
    assert_eq!(run(&query, &env), vec![root.clone()]);
}

#[test]
fn union_does_not_duplicate_items() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    // a.log satisfies both alternatives but is yielded once.
    let query = format!("path:{} and ( size:1024 or regex:'a.log$' )", root.display());
    assert_eq!(run(&query, &env), vec![root.join("a.log")]);
}

#[cfg(unix)]
#[test]
fn symlink_filter_splits_links_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    std::os::unix::fs::symlink(root.join("a.log"), root.join("link")).unwrap();
    let env = environment();

    let query = format!("path:{} and symlink", root.display());
    assert_eq!(run(&query, &env), vec![root.join("link")]);

    let query = format!("path:{} and not symlink", root.display());
    assert_eq!(
        run(&query, &env),
        vec![
            root.join("a.log"),
            root.join("b.log"),
            root.join("c.txt"),
            root.join("sub").join("d.log"),
        ]
    );
}

#[cfg(unix)]
#[test]
fn realpath_dereferences_into_the_target_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let bin = dir.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    fs::write(bin.join("tool"), b"#!").unwrap();
    std::os::unix::fs::symlink(bin.join("tool"), root.join("ln")).unwrap();
    let env = environment();

    let canonical_bin = fs::canonicalize(&bin).unwrap();
    let query = format!(
        "path:{} and recurse and realpath and path:{}",
        root.display(),
        canonical_bin.display()
    );
    assert_eq!(run(&query, &env), vec![canonical_bin.join("tool")]);
}

#[test]
fn recurse_rejects_negative_polarity() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{} and not recurse", root.display());
    let tree = QueryParser::new().parse(&query).unwrap();
    match tree.evaluate(&env) {
        Err(EvalError::NotSupported { message }) => {
            assert!(message.contains("recurse"), "{}", message);
        }
        other => panic!("expected NotSupported, got {:?}", other.map(|_| "stream")),
    };
}

#[test]
fn invalid_regex_surfaces_as_generator_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{} and regex:'('", root.display());
    let tree = QueryParser::new().parse(&query).unwrap();
    match tree.evaluate(&env) {
        Err(EvalError::Generator { key, .. }) => assert_eq!(key, "regex"),
        other => panic!("expected a generator error, got {:?}", other.map(|_| "stream")),
    };
}

#[test]
fn invalid_size_spec_surfaces_as_generator_error() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("t");
    build_tree(&root);
    let env = environment();

    let query = format!("path:{} and size:1-2-3", root.display());
    let tree = QueryParser::new().parse(&query).unwrap();
    match tree.evaluate(&env) {
        Err(EvalError::Generator { key, .. }) => assert_eq!(key, "size"),
        other => panic!("expected a generator error, got {:?}", other.map(|_| "stream")),
    };
}

use std::fs::{self, File};
use tempfile::tempdir;
use crate::utils::fs::{any_file_matches, find_files, list_files, file_name_str};
use crate::utils::ends_with_ignore_case;

#[test]
fn test_find_files_recurses_and_sorts() {
    let temp_dir = tempdir().unwrap();
    let base_path = temp_dir.path();

    let nested = base_path.join("a/b");
    fs::create_dir_all(&nested).unwrap();
    File::create(base_path.join("z.dll")).unwrap();
    File::create(base_path.join("a/y.DLL")).unwrap();
    File::create(nested.join("x.dll")).unwrap();
    File::create(nested.join("readme.txt")).unwrap();

    let dlls = find_files(base_path, &|p: &std::path::Path| {
        file_name_str(p).is_some_and(|n| ends_with_ignore_case(n, ".dll"))
    })
    .unwrap();

    assert_eq!(dlls.len(), 3, "Should find .dll files at every depth, any case");
    assert!(dlls.contains(&nested.join("x.dll")));
    assert!(dlls.contains(&base_path.join("a/y.DLL")));
    let mut sorted = dlls.clone();
    sorted.sort();
    assert_eq!(dlls, sorted);
}

#[test]
fn test_find_files_missing_path_is_empty() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope");
    let found = find_files(&missing, &|_: &std::path::Path| true).unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_any_file_matches_deep_hit() {
    let temp_dir = tempdir().unwrap();
    let deep = temp_dir.path().join("one/two/three");
    fs::create_dir_all(&deep).unwrap();
    File::create(deep.join("core.dll.disabled")).unwrap();

    let pred = |p: &std::path::Path| {
        file_name_str(p).is_some_and(|n| ends_with_ignore_case(n, ".disabled"))
    };
    assert!(any_file_matches(temp_dir.path(), &pred).unwrap());

    fs::remove_file(deep.join("core.dll.disabled")).unwrap();
    assert!(!any_file_matches(temp_dir.path(), &pred).unwrap());
}

#[test]
fn test_list_files_is_not_recursive() {
    let temp_dir = tempdir().unwrap();
    let base_path = temp_dir.path();
    fs::create_dir(base_path.join("sub")).unwrap();
    File::create(base_path.join("top.dll")).unwrap();
    File::create(base_path.join("sub/inner.dll")).unwrap();

    let files = list_files(base_path, &|_: &std::path::Path| true).unwrap();
    assert_eq!(files, vec![base_path.join("top.dll")]);
}

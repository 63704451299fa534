//! Integration tests for release range resolution.

mod common;

use common::TestRepo;
use librarian::git::{find_tag, resolve_reference, resolve_release_range, tag_exists};

#[test]
fn test_range_starts_at_release_tag() {
    let test_repo = TestRepo::new();
    let released = test_repo.commit("feat: released");
    let head = test_repo.commit("fix: after release");
    test_repo.tag_annotated("google-cloud-kms-v1-v1.0.0", released, "Release 1.0.0");

    let range = resolve_release_range(&test_repo.repo, Some("google-cloud-kms-v1-v1.0.0"))
        .expect("Failed to resolve range");

    assert_eq!(range.from, Some(released));
    assert_eq!(range.to, head);
    assert_eq!(range.from_ref, "google-cloud-kms-v1-v1.0.0");
}

#[test]
fn test_missing_tag_falls_back_to_full_history() {
    let test_repo = TestRepo::new();
    test_repo.commit("feat: first");
    let head = test_repo.commit("feat: second");

    let range = resolve_release_range(&test_repo.repo, Some("never-tagged-1.0.0")).unwrap();

    assert_eq!(range.from, None);
    assert_eq!(range.to, head);
    assert_eq!(range.from_ref, "root");
}

#[test]
fn test_no_tag_requested() {
    let test_repo = TestRepo::new();
    let head = test_repo.commit("feat: first");

    let range = resolve_release_range(&test_repo.repo, None).unwrap();
    assert_eq!(range.from, None);
    assert_eq!(range.to, head);
}

#[test]
fn test_lightweight_and_annotated_tags_resolve_to_commits() {
    let test_repo = TestRepo::new();
    let first = test_repo.commit("feat: first");
    let second = test_repo.commit("feat: second");
    test_repo.tag_lightweight("light", first);
    test_repo.tag_annotated("annotated", second, "msg");

    assert_eq!(find_tag(&test_repo.repo, "light").unwrap(), Some(first));
    assert_eq!(find_tag(&test_repo.repo, "annotated").unwrap(), Some(second));
    assert_eq!(find_tag(&test_repo.repo, "missing").unwrap(), None);
    assert!(tag_exists(&test_repo.repo, "light").unwrap());
    assert!(!tag_exists(&test_repo.repo, "missing").unwrap());
}

#[test]
fn test_resolve_reference_by_branch_and_hash() {
    let test_repo = TestRepo::new();
    let first = test_repo.commit("feat: first");
    test_repo.commit("feat: second");
    test_repo.branch("release-base", first);

    assert_eq!(resolve_reference(&test_repo.repo, "release-base").unwrap(), first);
    assert_eq!(resolve_reference(&test_repo.repo, &first.to_string()).unwrap(), first);
    assert!(resolve_reference(&test_repo.repo, "no-such-ref").is_err());
}

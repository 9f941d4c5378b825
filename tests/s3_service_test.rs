//! S3 Service Tests
//!
//! URL construction, reads and deletes through `S3Service` with an
//! in-memory object store.

mod common;

#[cfg(test)]
mod tests {
    use super::common::FakeObjectStore;
    use aws_wrapper::s3::{S3Service, StorageError};

    // ========================================================================
    // TEST: URL Construction
    // ========================================================================

    #[test]
    fn test_url_makes_no_remote_call() {
        let s3 = S3Service::new(FakeObjectStore::default());
        assert_eq!(
            s3.url("my-bucket/path/to/folder/file.txt"),
            "https://s3.amazonaws.com/my-bucket/path/to/folder/file.txt"
        );
        assert!(s3.store().calls().is_empty());
    }

    // ========================================================================
    // TEST: Read
    // ========================================================================

    #[tokio::test]
    async fn test_get_file_contents() {
        let store = FakeObjectStore::with_buckets(&["notes"]);
        store.insert_object("notes", "2024/todo.txt", "buy milk");
        let s3 = S3Service::new(store);

        let text = s3.get_file_contents("notes/2024/todo.txt").await.unwrap();
        assert_eq!(text, "buy milk");
        assert_eq!(s3.store().calls(), vec!["GetObject notes/2024/todo.txt"]);
    }

    #[tokio::test]
    async fn test_get_file_contents_missing_object_propagates() {
        let s3 = S3Service::new(FakeObjectStore::with_buckets(&["notes"]));

        let err = s3.get_file_contents("notes/absent.txt").await.unwrap_err();
        match err {
            StorageError::Remote(remote) => {
                assert_eq!(remote.operation(), "GetObject");
                assert_eq!(remote.code(), Some("NoSuchKey"));
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_file_contents_invalid_path() {
        let s3 = S3Service::new(FakeObjectStore::default());
        let err = s3.get_file_contents("notes").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
        assert!(s3.store().calls().is_empty());
    }

    // ========================================================================
    // TEST: Delete
    // ========================================================================

    #[tokio::test]
    async fn test_delete_file() {
        let store = FakeObjectStore::with_buckets(&["notes"]);
        store.insert_object("notes", "old.txt", "stale");
        let s3 = S3Service::new(store);

        s3.delete_file("notes/old.txt").await.unwrap();

        assert!(s3.store().object("notes", "old.txt").is_none());
        assert_eq!(s3.store().calls(), vec!["DeleteObject notes/old.txt"]);
    }

    #[tokio::test]
    async fn test_delete_file_remote_error_unchanged() {
        let s3 = S3Service::new(FakeObjectStore::default());

        let err = s3.delete_file("ghost-bucket/file.txt").await.unwrap_err();
        match err {
            StorageError::Remote(remote) => {
                assert_eq!(remote.code(), Some("NoSuchBucket"));
                assert_eq!(
                    remote.to_string(),
                    "DeleteObject failed: The specified bucket does not exist"
                );
            }
            other => panic!("expected remote error, got {:?}", other),
        }
        assert_eq!(s3.store().call_count("DeleteObject"), 1);
    }

    #[tokio::test]
    async fn test_delete_rejects_malformed_paths_without_remote_call() {
        let s3 = S3Service::new(FakeObjectStore::with_buckets(&["notes"]));

        assert!(matches!(
            s3.delete_file("").await,
            Err(StorageError::MissingArgument(_))
        ));
        for path in ["notes", "notes/", "notes/a/.."] {
            assert!(matches!(
                s3.delete_file(path).await,
                Err(StorageError::InvalidPath(_))
            ));
        }
        assert!(s3.store().calls().is_empty());
    }
}

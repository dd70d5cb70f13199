use bytes::Bytes;

use edemy_domain::id::UserId;

use edemy_marketplace::domain::types::ObjectRef;
use edemy_marketplace::error::MarketplaceError;
use edemy_marketplace::usecase::media::{
    RemoveImageUseCase, RemoveVideoUseCase, UploadImageUseCase, UploadVideoUseCase, VideoUpload,
};

use crate::helpers::{MockStorage, TEST_BUCKET};

fn object(bucket: &str, key: &str) -> ObjectRef {
    ObjectRef {
        bucket: bucket.to_owned(),
        key: key.to_owned(),
    }
}

#[tokio::test]
async fn should_store_decoded_image_under_random_key() {
    let storage = MockStorage::new();
    let usecase = UploadImageUseCase {
        storage: storage.clone(),
    };

    let first = usecase
        .execute("data:image/png;base64,aGVsbG8=")
        .await
        .unwrap();
    let second = usecase
        .execute("data:image/png;base64,aGVsbG8=")
        .await
        .unwrap();

    assert_eq!(first.bucket, TEST_BUCKET);
    assert!(first.key.ends_with(".png"));
    assert_ne!(first.key, second.key);
    let puts = storage.puts.lock().unwrap();
    assert_eq!(puts[0], (first.key.clone(), "image/png".to_owned(), 5));
}

#[tokio::test]
async fn should_reject_image_that_is_not_a_data_url() {
    let storage = MockStorage::new();
    let err = UploadImageUseCase {
        storage: storage.clone(),
    }
    .execute("https://example.com/cat.png")
    .await
    .unwrap_err();

    assert!(matches!(err, MarketplaceError::Validation(_)));
    assert!(storage.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_remove_image_only_from_own_bucket() {
    let storage = MockStorage::new();
    let usecase = RemoveImageUseCase {
        storage: storage.clone(),
    };

    let err = usecase
        .execute(&object("someone-else", "a.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::Validation(_)));

    usecase.execute(&object(TEST_BUCKET, "a.png")).await.unwrap();
    assert_eq!(*storage.deletes.lock().unwrap(), vec!["a.png".to_owned()]);
}

#[tokio::test]
async fn should_upload_video_with_extension_from_file_name() {
    let storage = MockStorage::new();
    let instructor = UserId::new();

    let stored = UploadVideoUseCase {
        storage: storage.clone(),
    }
    .execute(
        instructor,
        instructor,
        VideoUpload {
            file_name: Some("Lesson-1.MOV".to_owned()),
            bytes: Bytes::from_static(b"frames"),
        },
    )
    .await
    .unwrap();

    assert!(stored.key.ends_with(".mov"));
    let puts = storage.puts.lock().unwrap();
    assert_eq!(puts[0].1, "video/mov");
}

#[tokio::test]
async fn should_default_video_extension_to_mp4() {
    let storage = MockStorage::new();
    let instructor = UserId::new();

    let stored = UploadVideoUseCase { storage }
        .execute(
            instructor,
            instructor,
            VideoUpload {
                file_name: None,
                bytes: Bytes::from_static(b"frames"),
            },
        )
        .await
        .unwrap();
    assert!(stored.key.ends_with(".mp4"));
}

#[tokio::test]
async fn should_reject_empty_or_foreign_video_upload() {
    let storage = MockStorage::new();
    let instructor = UserId::new();
    let usecase = UploadVideoUseCase {
        storage: storage.clone(),
    };

    let err = usecase
        .execute(
            instructor,
            instructor,
            VideoUpload {
                file_name: Some("a.mp4".to_owned()),
                bytes: Bytes::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No video");

    let err = usecase
        .execute(
            UserId::new(),
            instructor,
            VideoUpload {
                file_name: Some("a.mp4".to_owned()),
                bytes: Bytes::from_static(b"frames"),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotOwner));
    assert!(storage.puts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_remove_video_for_owner_only() {
    let storage = MockStorage::new();
    let instructor = UserId::new();
    let usecase = RemoveVideoUseCase {
        storage: storage.clone(),
    };

    let err = usecase
        .execute(UserId::new(), instructor, &object(TEST_BUCKET, "v.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotOwner));

    usecase
        .execute(instructor, instructor, &object(TEST_BUCKET, "v.mp4"))
        .await
        .unwrap();
    assert_eq!(*storage.deletes.lock().unwrap(), vec!["v.mp4".to_owned()]);
}

#[tokio::test]
async fn should_surface_storage_failure_on_upload() {
    let err = UploadImageUseCase {
        storage: MockStorage::failing(),
    }
    .execute("data:image/jpeg;base64,aGVsbG8=")
    .await
    .unwrap_err();
    assert!(matches!(err, MarketplaceError::Upstream(_)));
}

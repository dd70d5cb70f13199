use edemy_domain::id::LessonId;
use edemy_domain::pagination::PageRequest;

use edemy_marketplace::domain::repository::CourseRepository;
use edemy_marketplace::domain::types::StoredObject;
use edemy_marketplace::error::MarketplaceError;
use edemy_marketplace::usecase::course::{
    CreateCourseInput, CreateCourseUseCase, InstructorCoursesUseCase, ListCoursesUseCase,
    PublishCourseUseCase, ReadCourseUseCase, ReadFullCourseUseCase, RemoveCourseImageUseCase,
    UpdateCourseInput, UpdateCourseUseCase,
};

use crate::helpers::{
    InMemoryStore, MockStorage, TEST_BUCKET, seed_course, seed_instructor, seed_lesson, seed_user,
};

fn create_input(title: &str) -> CreateCourseInput {
    CreateCourseInput {
        title: title.to_owned(),
        description: "Learn by building".to_owned(),
        price: None,
        image: None,
        category: None,
        paid: None,
    }
}

fn image(key: &str) -> StoredObject {
    StoredObject {
        bucket: TEST_BUCKET.to_owned(),
        key: key.to_owned(),
        url: format!("https://{TEST_BUCKET}.s3.test/{key}"),
    }
}

// ── Create ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_course_creation_by_subscriber() {
    let store = InMemoryStore::new();
    let user = seed_user(&store, "Ana", "ana@x.com").await;
    let usecase = CreateCourseUseCase {
        users: store.clone(),
        courses: store,
    };

    let err = usecase
        .execute(user.id, create_input("Intro to Rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotInstructor));
}

#[tokio::test]
async fn should_create_unpublished_paid_course_with_default_price() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let usecase = CreateCourseUseCase {
        users: store.clone(),
        courses: store,
    };

    let course = usecase
        .execute(instructor.id, create_input("  Intro to Rust "))
        .await
        .unwrap();

    assert_eq!(course.slug, "intro-to-rust");
    assert_eq!(course.title, "Intro to Rust");
    assert_eq!(course.price.cents(), 999);
    assert!(course.paid);
    assert!(!course.published);
    assert_eq!(course.instructor.id, instructor.id);
    assert_eq!(course.instructor.name, "Ryan");

    let body = serde_json::to_value(&course).unwrap();
    assert_eq!(body["price"], serde_json::json!(9.99));
}

#[tokio::test]
async fn should_reject_title_that_slugs_to_existing_course() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let usecase = CreateCourseUseCase {
        users: store.clone(),
        courses: store,
    };
    usecase
        .execute(instructor.id, create_input("Intro to Rust"))
        .await
        .unwrap();

    let err = usecase
        .execute(instructor.id, create_input("INTRO TO RUST"))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::SlugTaken));
}

#[tokio::test]
async fn should_reject_negative_price() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let usecase = CreateCourseUseCase {
        users: store.clone(),
        courses: store,
    };

    let err = usecase
        .execute(
            instructor.id,
            CreateCourseInput {
                price: Some(-5.0),
                ..create_input("Intro to Rust")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::Validation(_)));
}

#[tokio::test]
async fn should_reject_price_above_processor_limit() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let usecase = CreateCourseUseCase {
        users: store.clone(),
        courses: store.clone(),
    };

    let err = usecase
        .execute(
            instructor.id,
            CreateCourseInput {
                price: Some(1e17),
                ..create_input("Intro to Rust")
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MarketplaceError::Validation(ref m) if m.contains("999999.99")));
    assert!(store.state.lock().unwrap().courses.is_empty());
}

#[tokio::test]
async fn should_reject_title_that_shadows_a_course_route() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let usecase = CreateCourseUseCase {
        users: store.clone(),
        courses: store.clone(),
    };

    let err = usecase
        .execute(instructor.id, create_input("Upload Image"))
        .await
        .unwrap_err();

    assert!(matches!(err, MarketplaceError::Validation(ref m) if m.contains("upload-image")));
    assert!(store.state.lock().unwrap().courses.is_empty());
}

// ── Update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_keep_slug_when_owner_renames_course() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    let usecase = UpdateCourseUseCase {
        courses: store.clone(),
    };

    let updated = usecase
        .execute(
            instructor.id,
            &course.slug,
            UpdateCourseInput {
                title: Some("Advanced Rust".to_owned()),
                price: Some(19.5),
                ..UpdateCourseInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Advanced Rust");
    assert_eq!(updated.slug, "intro-to-rust");
    assert_eq!(updated.price.cents(), 1950);
}

#[tokio::test]
async fn should_reject_update_by_non_owner() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let other = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    let usecase = UpdateCourseUseCase {
        courses: store.clone(),
    };

    let err = usecase
        .execute(
            other.id,
            &course.slug,
            UpdateCourseInput {
                title: Some("Hijacked".to_owned()),
                ..UpdateCourseInput::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MarketplaceError::NotOwner));
    let stored = store.find_by_slug(&course.slug).await.unwrap().unwrap();
    assert_eq!(stored.title, "Intro to Rust");
}

// ── Publish / list ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_only_published_courses() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let draft = seed_course(&store, instructor.id, "Draft Course", 999, true).await;
    let live = seed_course(&store, instructor.id, "Live Course", 999, true).await;

    let publish = PublishCourseUseCase {
        courses: store.clone(),
    };
    let published = publish.execute(instructor.id, live.id, true).await.unwrap();
    assert!(published.published);

    let list = ListCoursesUseCase {
        courses: store.clone(),
    };
    let courses = list.execute(PageRequest::default()).await.unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, live.id);
    assert!(courses.iter().all(|c| c.id != draft.id));

    publish.execute(instructor.id, live.id, false).await.unwrap();
    assert!(list.execute(PageRequest::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_publish_by_non_owner() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let other = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;

    let err = PublishCourseUseCase { courses: store }
        .execute(other.id, course.id, true)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketplaceError::NotOwner));
}

#[tokio::test]
async fn should_redact_lessons_in_public_views() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    let preview = seed_lesson(&store, course.id, "Welcome", true).await;
    let locked = seed_lesson(&store, course.id, "Ownership", false).await;
    store.set_published(course.id, true).await.unwrap();

    let read = ReadCourseUseCase {
        courses: store.clone(),
    };
    let course = read.execute("intro-to-rust").await.unwrap();
    let lesson = |id: LessonId| course.lessons.iter().find(|l| l.id == id).unwrap();
    assert_eq!(lesson(preview).content.as_deref(), Some("Welcome body"));
    assert!(lesson(locked).content.is_none());

    let listed = ListCoursesUseCase { courses: store }
        .execute(PageRequest::default())
        .await
        .unwrap();
    assert!(listed[0].lessons.iter().all(|l| l.free_preview || l.content.is_none()));
}

#[tokio::test]
async fn should_fail_read_for_unknown_slug() {
    let err = ReadCourseUseCase {
        courses: InMemoryStore::new(),
    }
    .execute("missing")
    .await
    .unwrap_err();
    assert!(matches!(err, MarketplaceError::CourseNotFound));
}

// ── Full read ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_gate_full_course_on_enrollment_or_ownership() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    seed_lesson(&store, course.id, "Ownership", false).await;
    let usecase = ReadFullCourseUseCase {
        courses: store.clone(),
        enrollments: store.clone(),
    };

    let err = usecase.execute(student.id, &course.slug).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::NotEnrolled));

    let owned = usecase.execute(instructor.id, &course.slug).await.unwrap();
    assert!(owned.lessons[0].content.is_some());

    edemy_marketplace::domain::repository::EnrollmentRepository::enroll(
        &store, student.id, course.id,
    )
    .await
    .unwrap();
    let full = usecase.execute(student.id, &course.slug).await.unwrap();
    assert_eq!(full.lessons[0].content.as_deref(), Some("Ownership body"));
}

// ── Image removal ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_image_then_clear_it() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    store
        .set_image(course.id, Some(image("cover.png")))
        .await
        .unwrap();
    let storage = MockStorage::new();

    let updated = RemoveCourseImageUseCase {
        courses: store.clone(),
        storage: storage.clone(),
    }
    .execute(instructor.id, &course.slug)
    .await
    .unwrap();

    assert!(updated.image.is_none());
    assert_eq!(*storage.deletes.lock().unwrap(), vec!["cover.png".to_owned()]);
}

#[tokio::test]
async fn should_keep_image_when_storage_delete_fails() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 999, true).await;
    store
        .set_image(course.id, Some(image("cover.png")))
        .await
        .unwrap();

    let err = RemoveCourseImageUseCase {
        courses: store.clone(),
        storage: MockStorage::failing(),
    }
    .execute(instructor.id, &course.slug)
    .await
    .unwrap_err();

    assert!(matches!(err, MarketplaceError::Upstream(_)));
    let stored = store.find_by_slug(&course.slug).await.unwrap().unwrap();
    assert_eq!(stored.image, Some(image("cover.png")));
}

// ── Instructor listing ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_instructor_courses_including_drafts() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    seed_course(&store, instructor.id, "First Course", 999, true).await;
    seed_course(&store, instructor.id, "Second Course", 0, false).await;
    let usecase = InstructorCoursesUseCase {
        users: store.clone(),
        courses: store,
    };

    let courses = usecase.execute(instructor.id).await.unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].title, "Second Course");

    let err = usecase.execute(student.id).await.unwrap_err();
    assert!(matches!(err, MarketplaceError::NotInstructor));
}

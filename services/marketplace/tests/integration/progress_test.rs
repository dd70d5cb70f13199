use edemy_domain::id::LessonId;

use edemy_marketplace::error::MarketplaceError;
use edemy_marketplace::usecase::progress::{
    ListCompletedUseCase, MarkCompletedUseCase, MarkIncompletedUseCase,
};

use crate::helpers::{InMemoryStore, seed_course, seed_instructor, seed_lesson, seed_user};

#[tokio::test]
async fn should_track_completion_idempotently() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 0, false).await;
    let first = seed_lesson(&store, course.id, "Welcome", true).await;
    let second = seed_lesson(&store, course.id, "Ownership", false).await;
    let mark = MarkCompletedUseCase {
        courses: store.clone(),
        progress: store.clone(),
    };
    let list = ListCompletedUseCase {
        progress: store.clone(),
    };

    mark.execute(student.id, course.id, first).await.unwrap();
    mark.execute(student.id, course.id, first).await.unwrap();
    mark.execute(student.id, course.id, second).await.unwrap();

    assert_eq!(list.execute(student.id, course.id).await.unwrap(), vec![first, second]);

    let unmark = MarkIncompletedUseCase {
        progress: store.clone(),
    };
    unmark.execute(student.id, course.id, first).await.unwrap();
    unmark.execute(student.id, course.id, first).await.unwrap();

    assert_eq!(list.execute(student.id, course.id).await.unwrap(), vec![second]);
}

#[tokio::test]
async fn should_keep_progress_per_user() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let ana = seed_user(&store, "Ana", "ana@x.com").await;
    let bob = seed_user(&store, "Bob", "bob@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 0, false).await;
    let lesson = seed_lesson(&store, course.id, "Welcome", true).await;

    MarkCompletedUseCase {
        courses: store.clone(),
        progress: store.clone(),
    }
    .execute(ana.id, course.id, lesson)
    .await
    .unwrap();

    let list = ListCompletedUseCase {
        progress: store.clone(),
    };
    assert_eq!(list.execute(ana.id, course.id).await.unwrap(), vec![lesson]);
    assert!(list.execute(bob.id, course.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_lesson_outside_course() {
    let store = InMemoryStore::new();
    let instructor = seed_instructor(&store).await;
    let student = seed_user(&store, "Ana", "ana@x.com").await;
    let course = seed_course(&store, instructor.id, "Intro to Rust", 0, false).await;

    let err = MarkCompletedUseCase {
        courses: store.clone(),
        progress: store.clone(),
    }
    .execute(student.id, course.id, LessonId::new())
    .await
    .unwrap_err();
    assert!(matches!(err, MarketplaceError::LessonNotFound));
}

use std::collections::HashMap;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionError,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use edemy_domain::id::{CourseId, LessonId, UserId};
use edemy_domain::pagination::PageRequest;
use edemy_domain::price::Price;
use edemy_domain::user::Role;
use edemy_marketplace_schema::{
    completed_lessons, courses, enrollments, lessons, user_roles, users,
};

use crate::domain::repository::{
    CourseRepository, EnrollmentRepository, ProgressRepository, UserRepository,
};
use crate::domain::types::{
    Course, CoursePatch, Credentials, DEFAULT_PICTURE, Instructor, Lesson, LessonUpdate,
    NewCourse, NewLesson, NewUser, StoredObject, User,
};
use crate::error::MarketplaceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn object_to_json(object: &StoredObject) -> serde_json::Value {
    serde_json::json!({
        "bucket": object.bucket,
        "key": object.key,
        "url": object.url,
    })
}

fn object_from_json(value: Option<serde_json::Value>) -> Option<StoredObject> {
    value.and_then(|v| serde_json::from_value(v).ok())
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

async fn load_roles<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Vec<Role>, DbErr> {
    let rows = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    let mut roles: Vec<Role> = rows
        .into_iter()
        .filter_map(|row| match row.role.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "ignoring stored role");
                None
            }
        })
        .collect();
    roles.sort();
    Ok(roles)
}

async fn load_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<User>, DbErr> {
    let Some(model) = users::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let roles = load_roles(db, id).await?;
    Ok(Some(user_from_model(model, roles)))
}

fn user_from_model(model: users::Model, roles: Vec<Role>) -> User {
    User {
        id: UserId(model.id),
        name: model.name,
        email: model.email,
        picture: model.picture,
        roles,
        stripe_account_id: model.stripe_account_id,
        stripe_seller: model.stripe_seller,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

impl UserRepository for DbUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, MarketplaceError> {
        let user = user.clone();
        let result = self
            .db
            .transaction::<_, users::Model, DbErr>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let model = users::ActiveModel {
                        id: Set(user.id.0),
                        name: Set(user.name),
                        email: Set(user.email),
                        password_hash: Set(user.password_hash),
                        picture: Set(DEFAULT_PICTURE.to_owned()),
                        stripe_account_id: Set(None),
                        stripe_seller: Set(None),
                        stripe_session_id: Set(None),
                        password_reset_code: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;
                    user_roles::ActiveModel {
                        user_id: Set(model.id),
                        role: Set(Role::Subscriber.as_str().to_owned()),
                    }
                    .insert(txn)
                    .await?;
                    Ok(model)
                })
            })
            .await;

        match result {
            Ok(model) => Ok(user_from_model(model, vec![Role::Subscriber])),
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                Err(MarketplaceError::EmailTaken)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, MarketplaceError> {
        Ok(load_user(&self.db, id.0).await.context("find user by id")?)
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<Credentials>, MarketplaceError> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?
        else {
            return Ok(None);
        };
        let roles = load_roles(&self.db, model.id)
            .await
            .context("load user roles")?;
        let password_hash = model.password_hash.clone();
        Ok(Some(Credentials {
            user: user_from_model(model, roles),
            password_hash,
        }))
    }

    async fn set_reset_code(&self, email: &str, code: &str) -> Result<bool, MarketplaceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordResetCode, Expr::value(code))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Email.eq(email))
            .exec(&self.db)
            .await
            .context("set password reset code")?;
        Ok(result.rows_affected > 0)
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        password_hash: &str,
    ) -> Result<bool, MarketplaceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(
                users::Column::PasswordResetCode,
                Expr::value(Option::<String>::None),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::PasswordResetCode.eq(code))
            .exec(&self.db)
            .await
            .context("reset password")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_stripe_account(
        &self,
        id: UserId,
        account_id: &str,
    ) -> Result<(), MarketplaceError> {
        users::Entity::update_many()
            .col_expr(users::Column::StripeAccountId, Expr::value(account_id))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id.0))
            .exec(&self.db)
            .await
            .context("set stripe account")?;
        Ok(())
    }

    async fn promote_instructor(
        &self,
        id: UserId,
        seller: serde_json::Value,
    ) -> Result<User, MarketplaceError> {
        let user = self
            .db
            .transaction::<_, Option<User>, DbErr>(|txn| {
                Box::pin(async move {
                    user_roles::Entity::insert(user_roles::ActiveModel {
                        user_id: Set(id.0),
                        role: Set(Role::Instructor.as_str().to_owned()),
                    })
                    .on_conflict(
                        OnConflict::columns([user_roles::Column::UserId, user_roles::Column::Role])
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(txn)
                    .await?;
                    users::Entity::update_many()
                        .col_expr(users::Column::StripeSeller, Expr::value(seller))
                        .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(users::Column::Id.eq(id.0))
                        .exec(txn)
                        .await?;
                    load_user(txn, id.0).await
                })
            })
            .await
            .context("promote instructor")?;
        user.ok_or(MarketplaceError::UserNotFound)
    }
}

// ── Course repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCourseRepository {
    pub db: DatabaseConnection,
}

fn lesson_from_model(model: lessons::Model) -> Lesson {
    Lesson {
        id: LessonId(model.id),
        title: model.title,
        slug: model.slug,
        content: Some(model.content),
        video: object_from_json(model.video),
        free_preview: model.free_preview,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn course_from_model(
    model: courses::Model,
    instructor_name: String,
    lessons: Vec<Lesson>,
) -> Course {
    Course {
        id: CourseId(model.id),
        slug: model.slug,
        title: model.title,
        description: model.description,
        price: Price::from_cents(model.price_cents.max(0)).unwrap_or_default(),
        image: object_from_json(model.image),
        category: model.category,
        published: model.published,
        paid: model.paid,
        instructor: Instructor {
            id: UserId(model.instructor_id),
            name: instructor_name,
        },
        lessons,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Attach instructor names and lessons (in insertion order) to course rows,
/// keeping the row order.
async fn hydrate<C: ConnectionTrait>(
    db: &C,
    models: Vec<courses::Model>,
) -> Result<Vec<Course>, DbErr> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let course_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let instructor_ids: Vec<Uuid> = models.iter().map(|m| m.instructor_id).collect();

    let names: HashMap<Uuid, String> = users::Entity::find()
        .filter(users::Column::Id.is_in(instructor_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect();

    let mut lessons_by_course: HashMap<Uuid, Vec<Lesson>> = HashMap::new();
    for lesson in lessons::Entity::find()
        .filter(lessons::Column::CourseId.is_in(course_ids))
        .order_by_asc(lessons::Column::Id)
        .all(db)
        .await?
    {
        lessons_by_course
            .entry(lesson.course_id)
            .or_default()
            .push(lesson_from_model(lesson));
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let name = names.get(&model.instructor_id).cloned().unwrap_or_default();
            let lessons = lessons_by_course.remove(&model.id).unwrap_or_default();
            course_from_model(model, name, lessons)
        })
        .collect())
}

async fn hydrate_one<C: ConnectionTrait>(
    db: &C,
    model: Option<courses::Model>,
) -> Result<Option<Course>, DbErr> {
    match model {
        Some(model) => Ok(hydrate(db, vec![model]).await?.pop()),
        None => Ok(None),
    }
}

impl DbCourseRepository {
    async fn reload(&self, id: Uuid) -> Result<Course, MarketplaceError> {
        let model = courses::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("reload course")?;
        hydrate_one(&self.db, model)
            .await
            .context("hydrate course")?
            .ok_or(MarketplaceError::CourseNotFound)
    }
}

impl CourseRepository for DbCourseRepository {
    async fn create(&self, course: &NewCourse) -> Result<Course, MarketplaceError> {
        let now = Utc::now();
        let inserted = courses::ActiveModel {
            id: Set(course.id.0),
            slug: Set(course.slug.clone()),
            title: Set(course.title.clone()),
            description: Set(course.description.clone()),
            price_cents: Set(course.price.cents()),
            image: Set(course.image.as_ref().map(object_to_json)),
            category: Set(course.category.clone()),
            published: Set(false),
            paid: Set(course.paid),
            instructor_id: Set(course.instructor_id.0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => Ok(hydrate_one(&self.db, Some(model))
                .await
                .context("hydrate course")?
                .ok_or(MarketplaceError::CourseNotFound)?),
            Err(e) if is_unique_violation(&e) => Err(MarketplaceError::SlugTaken),
            Err(e) => Err(anyhow::Error::new(e).context("create course").into()),
        }
    }

    async fn find_by_id(&self, id: CourseId) -> Result<Option<Course>, MarketplaceError> {
        let model = courses::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find course by id")?;
        Ok(hydrate_one(&self.db, model).await.context("hydrate course")?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>, MarketplaceError> {
        let model = courses::Entity::find()
            .filter(courses::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find course by slug")?;
        Ok(hydrate_one(&self.db, model).await.context("hydrate course")?)
    }

    async fn list_published(&self, page: PageRequest) -> Result<Vec<Course>, MarketplaceError> {
        let models = courses::Entity::find()
            .filter(courses::Column::Published.eq(true))
            .order_by_desc(courses::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list published courses")?;
        Ok(hydrate(&self.db, models).await.context("hydrate courses")?)
    }

    async fn list_by_instructor(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<Course>, MarketplaceError> {
        let models = courses::Entity::find()
            .filter(courses::Column::InstructorId.eq(instructor_id.0))
            .order_by_desc(courses::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list instructor courses")?;
        Ok(hydrate(&self.db, models).await.context("hydrate courses")?)
    }

    async fn list_enrolled(&self, user_id: UserId) -> Result<Vec<Course>, MarketplaceError> {
        let course_ids: Vec<Uuid> = enrollments::Entity::find()
            .filter(enrollments::Column::UserId.eq(user_id.0))
            .order_by_desc(enrollments::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list enrollments")?
            .into_iter()
            .map(|e| e.course_id)
            .collect();
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_id: HashMap<Uuid, courses::Model> = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids.clone()))
            .all(&self.db)
            .await
            .context("list enrolled courses")?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let ordered = course_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        Ok(hydrate(&self.db, ordered).await.context("hydrate courses")?)
    }

    async fn update(&self, id: CourseId, patch: &CoursePatch) -> Result<Course, MarketplaceError> {
        let mut model = courses::ActiveModel {
            id: Set(id.0),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(title) = &patch.title {
            model.title = Set(title.clone());
        }
        if let Some(description) = &patch.description {
            model.description = Set(description.clone());
        }
        if let Some(price) = patch.price {
            model.price_cents = Set(price.cents());
        }
        if let Some(image) = &patch.image {
            model.image = Set(Some(object_to_json(image)));
        }
        if let Some(category) = &patch.category {
            model.category = Set(Some(category.clone()));
        }
        if let Some(paid) = patch.paid {
            model.paid = Set(paid);
        }
        model.update(&self.db).await.context("update course")?;
        self.reload(id.0).await
    }

    async fn set_image(
        &self,
        id: CourseId,
        image: Option<StoredObject>,
    ) -> Result<Course, MarketplaceError> {
        courses::ActiveModel {
            id: Set(id.0),
            image: Set(image.as_ref().map(object_to_json)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set course image")?;
        self.reload(id.0).await
    }

    async fn set_published(
        &self,
        id: CourseId,
        published: bool,
    ) -> Result<Course, MarketplaceError> {
        courses::ActiveModel {
            id: Set(id.0),
            published: Set(published),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set course published")?;
        self.reload(id.0).await
    }

    async fn add_lesson(&self, lesson: &NewLesson) -> Result<Course, MarketplaceError> {
        let now = Utc::now();
        lessons::ActiveModel {
            id: Set(lesson.id.0),
            course_id: Set(lesson.course_id.0),
            title: Set(lesson.title.clone()),
            slug: Set(lesson.slug.clone()),
            content: Set(lesson.content.clone()),
            video: Set(lesson.video.as_ref().map(object_to_json)),
            free_preview: Set(lesson.free_preview),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .context("add lesson")?;
        self.reload(lesson.course_id.0).await
    }

    async fn update_lesson(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
        update: &LessonUpdate,
    ) -> Result<bool, MarketplaceError> {
        let result = lessons::Entity::update_many()
            .col_expr(lessons::Column::Title, Expr::value(update.title.clone()))
            .col_expr(lessons::Column::Slug, Expr::value(update.slug.clone()))
            .col_expr(lessons::Column::Content, Expr::value(update.content.clone()))
            .col_expr(
                lessons::Column::Video,
                Expr::value(update.video.as_ref().map(object_to_json)),
            )
            .col_expr(lessons::Column::FreePreview, Expr::value(update.free_preview))
            .col_expr(lessons::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(lessons::Column::Id.eq(lesson_id.0))
            .filter(lessons::Column::CourseId.eq(course_id.0))
            .exec(&self.db)
            .await
            .context("update lesson")?;
        Ok(result.rows_affected > 0)
    }

    async fn remove_lesson(
        &self,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<bool, MarketplaceError> {
        let result = lessons::Entity::delete_many()
            .filter(lessons::Column::Id.eq(lesson_id.0))
            .filter(lessons::Column::CourseId.eq(course_id.0))
            .exec(&self.db)
            .await
            .context("remove lesson")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Enrollment repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEnrollmentRepository {
    pub db: DatabaseConnection,
}

async fn insert_enrollment<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    course_id: Uuid,
) -> Result<(), DbErr> {
    enrollments::Entity::insert(enrollments::ActiveModel {
        user_id: Set(user_id),
        course_id: Set(course_id),
        created_at: Set(Utc::now()),
    })
    .on_conflict(
        OnConflict::columns([enrollments::Column::UserId, enrollments::Column::CourseId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}

impl EnrollmentRepository for DbEnrollmentRepository {
    async fn is_enrolled(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<bool, MarketplaceError> {
        let found = enrollments::Entity::find_by_id((user_id.0, course_id.0))
            .one(&self.db)
            .await
            .context("find enrollment")?;
        Ok(found.is_some())
    }

    async fn enroll(&self, user_id: UserId, course_id: CourseId) -> Result<(), MarketplaceError> {
        insert_enrollment(&self.db, user_id.0, course_id.0)
            .await
            .context("enroll")?;
        Ok(())
    }

    async fn pending_session(&self, user_id: UserId) -> Result<Option<String>, MarketplaceError> {
        let session: Option<Option<String>> = users::Entity::find_by_id(user_id.0)
            .select_only()
            .column(users::Column::StripeSessionId)
            .into_tuple()
            .one(&self.db)
            .await
            .context("find pending session")?;
        Ok(session.flatten())
    }

    async fn set_pending_session(
        &self,
        user_id: UserId,
        session_id: &str,
    ) -> Result<(), MarketplaceError> {
        users::Entity::update_many()
            .col_expr(users::Column::StripeSessionId, Expr::value(session_id))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id.0))
            .exec(&self.db)
            .await
            .context("set pending session")?;
        Ok(())
    }

    async fn confirm_payment(
        &self,
        user_id: UserId,
        course_id: CourseId,
        session_id: &str,
    ) -> Result<bool, MarketplaceError> {
        let session_id = session_id.to_owned();
        let confirmed = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let cleared = users::Entity::update_many()
                        .col_expr(
                            users::Column::StripeSessionId,
                            Expr::value(Option::<String>::None),
                        )
                        .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(users::Column::Id.eq(user_id.0))
                        .filter(users::Column::StripeSessionId.eq(session_id))
                        .exec(txn)
                        .await?;
                    if cleared.rows_affected == 0 {
                        return Ok(false);
                    }
                    insert_enrollment(txn, user_id.0, course_id.0).await?;
                    Ok(true)
                })
            })
            .await
            .context("confirm payment")?;
        Ok(confirmed)
    }
}

// ── Progress repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProgressRepository {
    pub db: DatabaseConnection,
}

impl ProgressRepository for DbProgressRepository {
    async fn mark_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), MarketplaceError> {
        completed_lessons::Entity::insert(completed_lessons::ActiveModel {
            user_id: Set(user_id.0),
            course_id: Set(course_id.0),
            lesson_id: Set(lesson_id.0),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                completed_lessons::Column::UserId,
                completed_lessons::Column::CourseId,
                completed_lessons::Column::LessonId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("mark lesson completed")?;
        Ok(())
    }

    async fn mark_incompleted(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<(), MarketplaceError> {
        completed_lessons::Entity::delete_many()
            .filter(completed_lessons::Column::UserId.eq(user_id.0))
            .filter(completed_lessons::Column::CourseId.eq(course_id.0))
            .filter(completed_lessons::Column::LessonId.eq(lesson_id.0))
            .exec(&self.db)
            .await
            .context("mark lesson incompleted")?;
        Ok(())
    }

    async fn list_completed(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Vec<LessonId>, MarketplaceError> {
        let rows = completed_lessons::Entity::find()
            .filter(completed_lessons::Column::UserId.eq(user_id.0))
            .filter(completed_lessons::Column::CourseId.eq(course_id.0))
            .order_by_asc(completed_lessons::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list completed lessons")?;
        Ok(rows.into_iter().map(|r| LessonId(r.lesson_id)).collect())
    }
}

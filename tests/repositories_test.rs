use anyhow::Result;

use apuntes_rs::models::{NewFile, NewUser};
use apuntes_rs::repositories::{FavoriteRepository, FileRepository, UserRepository};
use apuntes_rs::test_utils::create_test_database;

fn sample_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: Some("argon2-hash".to_string()),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    }
}

fn sample_file(user_id: i64, course: &str) -> NewFile {
    NewFile {
        filename: format!("{}.pdf", uuid::Uuid::new_v4()),
        title: "Algebra summary".to_string(),
        description: "Week 3 lecture notes".to_string(),
        keywords: "algebra,matrices".to_string(),
        course: course.to_string(),
        file_type: "pdf".to_string(),
        user_id,
    }
}

#[tokio::test]
async fn test_create_and_find_user() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());

    let created = user_repo.create_user(&sample_user("ana@uni.edu")).await?;
    assert!(created.id > 0);
    assert_eq!(created.email, "ana@uni.edu");
    assert_eq!(created.password_hash.as_deref(), Some("argon2-hash"));

    let by_email = user_repo.find_by_email("ana@uni.edu").await?;
    assert_eq!(by_email.map(|u| u.id), Some(created.id));

    let by_id = user_repo.get_user(created.id).await?;
    assert_eq!(by_id.map(|u| u.email), Some("ana@uni.edu".to_string()));

    assert!(user_repo.find_by_email("missing@uni.edu").await?.is_none());
    assert!(user_repo.get_user(created.id + 100).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_oauth_user_has_no_password() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());

    let new_user = NewUser {
        password_hash: None,
        ..sample_user("maria@uni.edu")
    };
    let created = user_repo.create_user(&new_user).await?;

    assert!(created.password_hash.is_none());
    let reloaded = user_repo.get_user(created.id).await?.unwrap();
    assert!(reloaded.password_hash.is_none());

    Ok(())
}

#[tokio::test]
async fn test_email_uniqueness_is_enforced() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());

    user_repo.create_user(&sample_user("ana@uni.edu")).await?;
    let duplicate = user_repo.create_user(&sample_user("ana@uni.edu")).await;

    assert!(duplicate.is_err());

    Ok(())
}

#[tokio::test]
async fn test_file_requires_existing_owner() -> Result<()> {
    let db = create_test_database().await?;
    let file_repo = FileRepository::new(db.pool().clone());

    let dangling = file_repo.create_file(&sample_file(42, "CS101")).await;

    assert!(dangling.is_err());

    Ok(())
}

#[tokio::test]
async fn test_file_roundtrip_and_course_filter() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());
    let file_repo = FileRepository::new(db.pool().clone());

    let user = user_repo.create_user(&sample_user("ana@uni.edu")).await?;

    let cs = file_repo.create_file(&sample_file(user.id, "CS101")).await?;
    file_repo
        .create_file(&sample_file(user.id, "CS1011"))
        .await?;
    file_repo.create_file(&sample_file(user.id, "MATH2")).await?;

    let reloaded = file_repo.get_file(cs.id).await?.unwrap();
    assert_eq!(reloaded.title, cs.title);
    assert_eq!(reloaded.filename, cs.filename);
    assert_eq!(reloaded.course, "CS101");

    // Exact match only: CS101 must not pick up CS1011
    let filtered = file_repo.find_by_course("CS101").await?;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, cs.id);

    assert_eq!(file_repo.list_files().await?.len(), 3);
    assert_eq!(file_repo.find_by_user(user.id).await?.len(), 3);
    assert!(file_repo.find_by_user(user.id + 1).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_files_newest_first() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());
    let file_repo = FileRepository::new(db.pool().clone());

    let user = user_repo.create_user(&sample_user("ana@uni.edu")).await?;
    let first = file_repo.create_file(&sample_file(user.id, "CS101")).await?;
    let second = file_repo.create_file(&sample_file(user.id, "CS101")).await?;

    let listed = file_repo.list_files().await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);

    Ok(())
}

#[tokio::test]
async fn test_favorite_requires_existing_referents() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());
    let favorite_repo = FavoriteRepository::new(db.pool().clone());

    // Nothing exists yet
    assert!(favorite_repo.add_favorite(1, 1).await.is_err());

    // User exists, file does not
    let user = user_repo.create_user(&sample_user("ana@uni.edu")).await?;
    assert!(favorite_repo.add_favorite(user.id, 1).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_add_favorite_is_idempotent() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());
    let file_repo = FileRepository::new(db.pool().clone());
    let favorite_repo = FavoriteRepository::new(db.pool().clone());

    let user = user_repo.create_user(&sample_user("ana@uni.edu")).await?;
    let file = file_repo.create_file(&sample_file(user.id, "CS101")).await?;

    let first = favorite_repo.add_favorite(user.id, file.id).await?;
    assert!(first.is_some());

    // The unique pair makes the second insert a no-op
    let second = favorite_repo.add_favorite(user.id, file.id).await?;
    assert!(second.is_none());

    let favorites = favorite_repo.files_for_user(user.id).await?;
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, file.id);

    Ok(())
}

#[tokio::test]
async fn test_files_for_user_returns_full_metadata() -> Result<()> {
    let db = create_test_database().await?;
    let user_repo = UserRepository::new(db.pool().clone());
    let file_repo = FileRepository::new(db.pool().clone());
    let favorite_repo = FavoriteRepository::new(db.pool().clone());

    let ana = user_repo.create_user(&sample_user("ana@uni.edu")).await?;
    let luis = user_repo.create_user(&sample_user("luis@uni.edu")).await?;

    let file_a = file_repo.create_file(&sample_file(ana.id, "CS101")).await?;
    let file_b = file_repo.create_file(&sample_file(ana.id, "MATH2")).await?;

    favorite_repo.add_favorite(luis.id, file_a.id).await?;
    favorite_repo.add_favorite(luis.id, file_b.id).await?;
    favorite_repo.add_favorite(ana.id, file_b.id).await?;

    let luis_favorites = favorite_repo.files_for_user(luis.id).await?;
    assert_eq!(luis_favorites.len(), 2);
    let favorite = luis_favorites
        .iter()
        .find(|f| f.id == file_a.id)
        .expect("file_a must be among the favorites");
    assert_eq!(favorite.title, file_a.title);
    assert_eq!(favorite.keywords, file_a.keywords);
    assert_eq!(favorite.user_id, ana.id);

    let ana_favorites = favorite_repo.files_for_user(ana.id).await?;
    assert_eq!(ana_favorites.len(), 1);
    assert_eq!(ana_favorites[0].id, file_b.id);

    Ok(())
}

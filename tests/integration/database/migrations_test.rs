//! Database migration tests
//!
//! Tests that the schema is created and its constraints hold.

use pretty_assertions::assert_eq;

use crate::common::{create_unique_test_user, TestDatabase};

#[tokio::test]
async fn test_migrations_create_all_tables() {
    let db = TestDatabase::new().await;

    assert_eq!(
        db.table_names().await,
        vec![
            "ad_requests",
            "ad_selections",
            "ad_variants",
            "inquiries",
            "inquiry_files",
            "users",
        ]
    );
}

#[tokio::test]
async fn test_email_is_unique() {
    let db = TestDatabase::new().await;
    let user = create_unique_test_user(db.pool()).await;

    let duplicate = sqlx::query("INSERT INTO users (email, password_hash) VALUES (?, 'x')")
        .bind(&user.email)
        .execute(db.pool())
        .await;

    let err = duplicate.expect_err("duplicate email must fail");
    assert!(pium::backend::auth::users::is_unique_violation(&err));
}

#[tokio::test]
async fn test_one_selection_per_user() {
    let db = TestDatabase::new().await;
    let user = create_unique_test_user(db.pool()).await;

    sqlx::query("INSERT INTO ad_selections (user_id, variant_id, content) VALUES (?, 'a', 'first')")
        .bind(user.id)
        .execute(db.pool())
        .await
        .expect("first selection");
    let second =
        sqlx::query("INSERT INTO ad_selections (user_id, variant_id, content) VALUES (?, 'b', 'second')")
            .bind(user.id)
            .execute(db.pool())
            .await;

    assert!(second.is_err());
}

#[tokio::test]
async fn test_deleting_request_cascades_to_variants() {
    let db = TestDatabase::new().await;
    let user = create_unique_test_user(db.pool()).await;

    let request_id: i64 =
        sqlx::query_scalar("INSERT INTO ad_requests (user_id, payload) VALUES (?, '{}') RETURNING id")
            .bind(user.id)
            .fetch_one(db.pool())
            .await
            .expect("request");
    sqlx::query("INSERT INTO ad_variants (id, request_id, index_no, content) VALUES ('v1', ?, 0, 'c')")
        .bind(request_id)
        .execute(db.pool())
        .await
        .expect("variant");

    sqlx::query("DELETE FROM ad_requests WHERE id = ?")
        .bind(request_id)
        .execute(db.pool())
        .await
        .expect("delete");

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ad_variants")
        .fetch_one(db.pool())
        .await
        .expect("count");
    assert_eq!(remaining, 0);
}

use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

use newsroom_core::domain::Post;
use newsroom_core::error::RepoError;
use newsroom_core::ports::{BaseRepository, JobExecutionRepository, PostRepository};

use crate::database::entity::post;
use crate::database::postgres_repo::{PostgresJobExecutionRepository, PostgresPostRepository};

fn post_model(title: &str) -> post::Model {
    let now = chrono::Utc::now();
    post::Model {
        id: uuid::Uuid::new_v4(),
        author_id: uuid::Uuid::new_v4(),
        kind: post::PostKind::News,
        title: title.to_owned(),
        content: "Content".to_owned(),
        rating: 0,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn find_post_by_id_maps_to_domain() {
    let model = post_model("Test Post");
    let post_id = model.id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let found = result.unwrap();
    assert_eq!(found.title, "Test Post");
    assert_eq!(found.id, post_id);
    assert_eq!(found.kind, newsroom_core::domain::PostKind::News);
}

#[tokio::test]
async fn sum_rating_treats_null_as_zero() {
    // SUM over zero rows comes back as a NULL aggregate.
    let row: BTreeMap<&str, Value> = BTreeMap::from([("total", Value::BigInt(None))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let sum = repo.sum_rating_by_author(uuid::Uuid::new_v4()).await.unwrap();

    assert_eq!(sum, 0);
}

#[tokio::test]
async fn sum_rating_reads_the_aggregate_column() {
    let row: BTreeMap<&str, Value> = BTreeMap::from([("total", Value::BigInt(Some(7)))]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![row]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let sum = repo.sum_rating_by_author(uuid::Uuid::new_v4()).await.unwrap();

    assert_eq!(sum, 7);
}

#[tokio::test]
async fn adjust_rating_on_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let err = repo
        .adjust_rating(uuid::Uuid::new_v4(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn delete_older_than_reports_purged_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![MockExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        }])
        .into_connection();

    let repo = PostgresJobExecutionRepository::new(db);
    let purged = repo.delete_older_than(chrono::Utc::now()).await.unwrap();

    assert_eq!(purged, 3);
}

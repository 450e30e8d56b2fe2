use crudkit::{
    CreateRequest, CrudService, ReadManyRequest, ReadOneRequest, ResponsePolicy, SearchRequest,
};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

mod common;
use common::{
    map,
    question_entity::{Questions, comment},
    seed_posts, setup_test_db,
};

#[tokio::test]
async fn test_read_one_with_field_selection() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let posts = seed_posts(&db, 3).await;

    let record = posts
        .read_one(ReadOneRequest {
            params: map(json!({"id": 2})),
            fields: Some(vec!["id".to_string(), "title".to_string()]),
            ..Default::default()
        })
        .await
        .expect("read one");
    assert_eq!(record, Some(json!({"id": 2, "title": "post-2"})));
}

#[tokio::test]
async fn test_read_one_rejects_bad_input() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let posts = seed_posts(&db, 3).await;

    let err = posts
        .read_one(ReadOneRequest {
            params: map(json!({"id": 2})),
            fields: Some(vec!["id".to_string(), "secret".to_string()]),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = posts
        .read_one(ReadOneRequest {
            params: map(json!({"title": "post-2"})),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = posts
        .read_one(ReadOneRequest {
            params: map(json!({"id": "two"})),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_read_one_not_found_names_key() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let posts = seed_posts(&db, 1).await;

    let err = posts
        .read_one(ReadOneRequest {
            params: map(json!({"id": 99})),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), r#"post with key {"id":99} not found"#);
}

#[tokio::test]
async fn test_read_one_primary_key_only() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let posts = seed_posts(&db, 1).await;

    let record = posts
        .read_one(ReadOneRequest {
            params: map(json!({"id": 1})),
            response: Some(ResponsePolicy::PrimaryKeyOnly),
            ..Default::default()
        })
        .await
        .expect("read one");
    assert_eq!(record, Some(json!({"id": 1})));
}

async fn seed_questions(db: &sea_orm::DatabaseConnection) -> CrudService<Questions> {
    let questions = CrudService::<Questions>::new(db.clone());
    for title in ["first", "second"] {
        questions
            .create(CreateRequest {
                body: map(json!({"title": title})),
                response: None,
            })
            .await
            .expect("question");
    }
    for (question_id, message) in [(1, "a"), (1, "b"), (2, "c")] {
        comment::ActiveModel {
            question_id: Set(question_id),
            message: Set(message.to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("comment");
    }
    questions
}

#[tokio::test]
async fn test_declared_relations_loaded_by_default() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let questions = seed_questions(&db).await;

    let record = questions
        .read_one(ReadOneRequest {
            params: map(json!({"id": 1})),
            ..Default::default()
        })
        .await
        .expect("read one")
        .expect("full entity");
    let messages: Vec<&str> = record["comments"]
        .as_array()
        .expect("comments loaded")
        .iter()
        .map(|comment| comment["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["a", "b"]);

    let page = questions
        .read_many(ReadManyRequest::default())
        .await
        .expect("read many");
    assert_eq!(page.data[0]["comments"].as_array().map(Vec::len), Some(1));
    assert_eq!(page.data[1]["comments"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_relations_can_be_skipped_or_rejected() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let questions = seed_questions(&db).await;

    let result = questions
        .search(SearchRequest {
            relations: Some(vec![]),
            ..Default::default()
        })
        .await
        .expect("search");
    assert!(result.data.iter().all(|record| record.get("comments").is_none()));

    let err = questions
        .read_one(ReadOneRequest {
            params: map(json!({"id": 1})),
            relations: Some(vec!["author".to_string()]),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

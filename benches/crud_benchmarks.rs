/*!
# CRUD Benchmarks

Measures the request translation layer on its own (token codec, keyset and filter
conditions) and end-to-end read paths of [`CrudService`] against in-memory SQLite.

## Usage

```bash
# Run every benchmark
cargo bench --bench crud_benchmarks

# Only the pagination paths
cargo bench --bench crud_benchmarks -- "Read Paths"
```
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use crudkit::filtering::build_filter_condition;
use crudkit::pagination::{decode, encode, keyset_condition};
use crudkit::{
    CreateManyRequest, CrudResource, CrudService, FilterClause, FilterCondition, JsonMap,
    Operator, PaginationRequest, ReadManyRequest, SearchRequest, Sort,
};
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr, EntityTrait, QueryFilter,
    QueryTrait, Schema, Value,
};
use serde_json::json;
use std::hint::black_box;
use std::time::Duration;
use tokio::runtime::Runtime;

mod bench_entity {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
    #[sea_orm(table_name = "articles")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub title: String,
        pub author: String,
        pub view_count: i32,
        pub published: bool,
        pub deleted_at: Option<DateTimeWithTimeZone>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use bench_entity::{Column, Entity};

struct Articles;

impl CrudResource for Articles {
    type EntityType = Entity;
    type ModelType = bench_entity::Model;
    type ActiveModelType = bench_entity::ActiveModel;

    const RESOURCE_NAME: &'static str = "article";

    fn soft_delete_column() -> Option<Column> {
        Some(Column::DeletedAt)
    }
}

async fn setup_benchmark_db(size: i32) -> Result<CrudService<Articles>, DbErr> {
    let db: DatabaseConnection = Database::connect("sqlite::memory:").await?;
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(Entity)))
        .await?;

    let articles = CrudService::<Articles>::new(db);
    let bodies = (1..=size)
        .map(|i| {
            object(json!({
                "title": format!("Benchmark article {i}"),
                "author": format!("Author{}", i % 10),
                "view_count": i * 7 % 1000,
                "published": i % 2 == 0,
            }))
        })
        .collect();
    articles
        .create_many(CreateManyRequest {
            bodies,
            response: None,
        })
        .await
        .map_err(|e| DbErr::Custom(e.to_string()))?;
    Ok(articles)
}

fn object(value: serde_json::Value) -> JsonMap {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonMap::new(),
    }
}

fn sample_filter() -> Vec<FilterClause> {
    vec![
        FilterClause::new(vec![
            FilterCondition::new("title", Operator::ILike, json!("%article 1%")),
            FilterCondition::new("view_count", Operator::Between, json!([100, 800])),
        ]),
        FilterClause::new(vec![
            FilterCondition::new("author", Operator::In, json!(["Author1", "Author2"])),
            FilterCondition::new("deleted_at", Operator::Null, json!(null)).negated(),
        ]),
    ]
}

fn bench_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Translation");

    let token_input = object(json!({"author": "Author3", "published": true, "view_count": 500}));
    let token = encode(&token_input);
    group.bench_function("encode_query_token", |b| {
        b.iter(|| encode(black_box(&token_input)));
    });
    group.bench_function("decode_query_token", |b| {
        b.iter(|| decode(black_box(&token)));
    });

    let keys = vec![
        (Column::Author, Value::from("Author3")),
        (Column::ViewCount, Value::from(500)),
        (Column::Id, Value::from(81)),
    ];
    group.bench_function("keyset_condition_sql", |b| {
        b.iter(|| {
            Entity::find()
                .filter(keyset_condition(black_box(&keys), Sort::Desc))
                .build(DbBackend::Sqlite)
                .to_string()
        });
    });

    let filter = sample_filter();
    group.bench_function("filter_condition_sql", |b| {
        b.iter(|| {
            build_filter_condition::<Articles>(black_box(&filter))
                .map(|condition| Entity::find().filter(condition).build(DbBackend::Sqlite).to_string())
        });
    });

    group.finish();
}

fn bench_read_paths(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    for size in [100, 500] {
        let articles = rt.block_on(setup_benchmark_db(size)).unwrap();
        let mut group = c.benchmark_group(format!("Read Paths SQLite ({size} records)"));
        group.measurement_time(Duration::from_secs(10));

        group.bench_with_input(BenchmarkId::new("cursor_first_page", size), &size, |b, _| {
            b.iter(|| rt.block_on(articles.read_many(black_box(ReadManyRequest::default()))));
        });

        let first = rt
            .block_on(articles.read_many(ReadManyRequest::default()))
            .unwrap();
        let continuation = ReadManyRequest {
            pagination: PaginationRequest::Cursor {
                next_cursor: first.metadata.next_cursor().map(str::to_string),
                query: Some(first.metadata.query().to_string()),
            },
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("cursor_next_page", size), &size, |b, _| {
            b.iter(|| rt.block_on(articles.read_many(black_box(continuation.clone()))));
        });

        let offset = ReadManyRequest {
            query: object(json!({"published": true})),
            pagination: PaginationRequest::Offset {
                offset: None,
                limit: None,
                query: None,
            },
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("offset_filtered", size), &size, |b, _| {
            b.iter(|| rt.block_on(articles.read_many(black_box(offset.clone()))));
        });

        let search = SearchRequest {
            filter: sample_filter(),
            take: Some(50),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("search", size), &size, |b, _| {
            b.iter(|| rt.block_on(articles.search(black_box(search.clone()))));
        });

        group.finish();
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
        .with_plots()
        .with_output_color(true)
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_translation, bench_read_paths
}
criterion_main!(benches);

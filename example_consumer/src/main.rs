//! Example consumer: serves a `Task` entity from whichever backend the environment selects.
//!
//! Run from repo root: `cargo run -p entity-consumer`
//! Backend: `ENTITY_BACKEND=filesystem|document|relational`, plus `DATABASE_URL` for the SQL ones.

use entity_sdk::schema::{Annotation, InputType};
use entity_sdk::sql::qualified_table;
use entity_sdk::{
    common_routes, config, entity_routes, init_tracing, Backend, Entity, EntityMeta, EntityService,
    FieldSpec, Rule,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Task {
    #[serde(flatten)]
    meta: EntityMeta,
    title: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    done: bool,
}

impl Entity for Task {
    const TYPE_NAME: &'static str = "Task";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::of::<String>("title")
                .rule(Rule::required())
                .rule(Rule::string_length(1, 120)),
            FieldSpec::of::<Option<String>>("notes")
                .annotate(Annotation::preferred_input(InputType::TextArea)),
            FieldSpec::of::<bool>("done"),
        ]
    }
}

/// The relational store expects the application to own its tables.
fn task_table_ddl(schema: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\
         id UUID PRIMARY KEY, \
         creation_date TIMESTAMPTZ NOT NULL, \
         last_update_date TIMESTAMPTZ NOT NULL, \
         deletion_date TIMESTAMPTZ, \
         title TEXT NOT NULL, \
         notes TEXT, \
         done BOOLEAN NOT NULL DEFAULT FALSE)",
        qualified_table(schema, Task::TYPE_NAME)
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = config::from_env()?;
    let backend = Backend::from_config(&config).await?;
    match &backend {
        Backend::Document(store) => store.ensure_collection::<Task>().await?,
        Backend::Relational(store) => {
            sqlx::query(&task_table_ddl(&config.schema)).execute(store.pool()).await?;
            tracing::info!(table = Task::TYPE_NAME, schema = %config.schema, "table ready");
        }
        Backend::Filesystem(_) => {}
    }
    tracing::info!(backend = %backend.kind(), "backend ready");

    let service = Arc::new(EntityService::new(backend));
    let app = axum::Router::new()
        .merge(common_routes())
        .nest("/api/tasks", entity_routes::<Task, _>(service, config.body_limit));

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

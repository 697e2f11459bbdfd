use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio_postgres::{Client, NoTls, Row};

use super::{Document, DocumentStore, StoreError, embedded::migrations, new_document_id};

/// One collection of the `documents` table, with each document kept as JSONB.
pub struct PostgresStore {
    client: Client,
    collection: String,
}

impl PostgresStore {
    pub async fn new(database_dsn: &str, collection: String) -> Result<Self, StoreError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client, collection })
    }

    pub async fn migrate(&mut self) -> Result<(), StoreError> {
        let migrations_report = migrations::runner().run_async(&mut self.client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn to_document(row: &Row) -> Result<Document, StoreError> {
    let data: Value = row.try_get("data")?;

    Ok(Document {
        id: row.try_get("id")?,
        data: serde_json::from_value(data)?,
    })
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn list_descending(&self, field: &str) -> Result<Vec<Document>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT id, data FROM documents WHERE collection = $1 ORDER BY data ->> $2::text DESC, id DESC",
                &[&self.collection, &field],
            )
            .await?;

        rows.iter().map(to_document).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
                &[&self.collection, &id],
            )
            .await?;

        row.as_ref().map(to_document).transpose()
    }

    async fn create(&self, data: Map<String, Value>) -> Result<Document, StoreError> {
        let id = new_document_id();
        let row = self
            .client
            .query_one(
                "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3) RETURNING id, data",
                &[&self.collection, &id, &Value::Object(data)],
            )
            .await?;

        to_document(&row)
    }

    async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let rows = self
            .client
            .execute(
                "UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2",
                &[&self.collection, &id, &Value::Object(fields)],
            )
            .await?;

        if rows == 0 {
            return Err(StoreError::MissingDocument(id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .execute(
                "DELETE FROM documents WHERE collection = $1 AND id = $2",
                &[&self.collection, &id],
            )
            .await?;

        Ok(())
    }
}

use crate::models::{TaskOutcome, Transformation, UserAccount};
use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson},
    options::{IndexOptions, UpdateOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

/// Persistence for user quotas and transformation records.
///
/// The quota check and [`StylizeStore::debit_quota`] are separate calls; two concurrent
/// requests for the same user can both pass the check before either debit lands.
#[async_trait]
pub trait StylizeStore: Send + Sync {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserAccount>, AppError>;

    /// Decrement `quotaRemaining` by one.
    async fn debit_quota(&self, user_id: &str) -> Result<(), AppError>;

    /// Write a freshly submitted transformation, stamping `createdAt`.
    async fn save_pending(&self, transformation: &Transformation) -> Result<(), AppError>;

    async fn find_transformation(&self, task_id: &str)
        -> Result<Option<Transformation>, AppError>;

    /// Record the final outcome. Returns `false` when no such transformation exists.
    async fn complete_transformation(
        &self,
        task_id: &str,
        outcome: &TaskOutcome,
    ) -> Result<bool, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MongoStore {
    client: MongoClient,
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for stylize-service");

        let transformations = self.transformations();

        // Per-user history, newest first
        let user_index = IndexModel::builder()
            .keys(doc! { "userId": 1, "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_created_idx".to_string())
                    .build(),
            )
            .build();

        transformations
            .create_index(user_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create userId index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        let status_index = IndexModel::builder()
            .keys(doc! { "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("status_idx".to_string())
                    .build(),
            )
            .build();

        transformations
            .create_index(status_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create status index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    fn users(&self) -> Collection<UserAccount> {
        self.db.collection("users")
    }

    fn transformations(&self) -> Collection<Transformation> {
        self.db.collection("transformations")
    }
}

#[async_trait]
impl StylizeStore for MongoStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserAccount>, AppError> {
        self.users()
            .find_one(doc! { "_id": user_id }, None)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, "Failed to load user: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })
    }

    async fn debit_quota(&self, user_id: &str) -> Result<(), AppError> {
        self.users()
            .update_one(
                doc! { "_id": user_id },
                doc! { "$inc": { "quotaRemaining": -1_i64 } },
                None,
            )
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user_id, "Failed to debit quota: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn save_pending(&self, transformation: &Transformation) -> Result<(), AppError> {
        let mut fields = mongodb::bson::to_document(transformation).map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to encode transformation: {}", e))
        })?;
        fields.remove("_id");

        let options = UpdateOptions::builder().upsert(true).build();
        self.transformations()
            .update_one(
                doc! { "_id": transformation.id.as_str() },
                doc! {
                    "$set": fields,
                    "$currentDate": { "createdAt": true },
                },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!(task_id = %transformation.task_id, "Failed to save transformation: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn find_transformation(
        &self,
        task_id: &str,
    ) -> Result<Option<Transformation>, AppError> {
        self.transformations()
            .find_one(doc! { "_id": task_id }, None)
            .await
            .map_err(|e| {
                tracing::error!(task_id = %task_id, "Failed to load transformation: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })
    }

    async fn complete_transformation(
        &self,
        task_id: &str,
        outcome: &TaskOutcome,
    ) -> Result<bool, AppError> {
        let mut set = doc! { "status": outcome.status().to_string() };
        match outcome {
            TaskOutcome::Succeeded { result_urls } => {
                let urls: Vec<Bson> = result_urls.iter().cloned().map(Bson::String).collect();
                set.insert("resultUrls", urls);
            }
            TaskOutcome::Failed { message } => {
                set.insert("errorMessage", message.as_str());
            }
        }

        let result = self
            .transformations()
            .update_one(
                doc! { "_id": task_id },
                doc! {
                    "$set": set,
                    "$currentDate": { "completedAt": true },
                },
                None,
            )
            .await
            .map_err(|e| {
                tracing::error!(task_id = %task_id, "Failed to complete transformation: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        Ok(result.matched_count > 0)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}

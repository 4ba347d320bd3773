use super::database::StylizeStore;
use crate::models::{TaskOutcome, Transformation, UserAccount};
use async_trait::async_trait;
use mongodb::bson::DateTime as BsonDateTime;
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store with the same semantics as [`super::MongoStore`].
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, UserAccount>>,
    transformations: RwLock<HashMap<String, Transformation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserAccount) {
        self.users.write().await.insert(user.user_id.clone(), user);
    }

    pub async fn user(&self, user_id: &str) -> Option<UserAccount> {
        self.users.read().await.get(user_id).cloned()
    }

    pub async fn transformation(&self, task_id: &str) -> Option<Transformation> {
        self.transformations.read().await.get(task_id).cloned()
    }

    pub async fn transformation_count(&self) -> usize {
        self.transformations.read().await.len()
    }
}

#[async_trait]
impl StylizeStore for InMemoryStore {
    async fn find_user(&self, user_id: &str) -> Result<Option<UserAccount>, AppError> {
        Ok(self.user(user_id).await)
    }

    async fn debit_quota(&self, user_id: &str) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(user_id) {
            user.quota_remaining = Some(user.quota_remaining.unwrap_or(0) - 1);
        }
        Ok(())
    }

    async fn save_pending(&self, transformation: &Transformation) -> Result<(), AppError> {
        let mut record = transformation.clone();
        record.created_at = Some(BsonDateTime::now());
        self.transformations
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn find_transformation(
        &self,
        task_id: &str,
    ) -> Result<Option<Transformation>, AppError> {
        Ok(self.transformation(task_id).await)
    }

    async fn complete_transformation(
        &self,
        task_id: &str,
        outcome: &TaskOutcome,
    ) -> Result<bool, AppError> {
        let mut transformations = self.transformations.write().await;
        let Some(record) = transformations.get_mut(task_id) else {
            return Ok(false);
        };

        record.status = outcome.status();
        record.completed_at = Some(BsonDateTime::now());
        match outcome {
            TaskOutcome::Succeeded { result_urls } => record.result_urls = result_urls.clone(),
            TaskOutcome::Failed { message } => record.error_message = Some(message.clone()),
        }
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

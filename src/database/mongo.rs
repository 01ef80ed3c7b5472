use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{StreamExt, TryStreamExt};
use mongodb::bson::{self, doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

use super::{CompletionOutcome, SurveyStore};
use crate::models::{AnsweredQuestion, InsightReport, Invitation, Response, Survey, User};
use crate::utils::error::AppError;

const USERS: &str = "users";
const SURVEYS: &str = "surveys";
const INVITATIONS: &str = "invitations";
const RESPONSES: &str = "responses";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, AppError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .rsplit('/')
            .next()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty() && !s.contains(':'))
            .unwrap_or("InsightEngine");

        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the lookup and uniqueness indexes.
    async fn ensure_indexes(&self) -> Result<(), AppError> {
        log::info!("🔧 Creating database indexes...");

        let indexes: [(&str, Document, bool); 8] = [
            (USERS, doc! { "id": 1 }, true),
            (USERS, doc! { "email": 1 }, true),
            (SURVEYS, doc! { "id": 1 }, true),
            (SURVEYS, doc! { "userId": 1 }, false),
            (INVITATIONS, doc! { "id": 1 }, true),
            (INVITATIONS, doc! { "token": 1 }, true),
            (INVITATIONS, doc! { "surveyId": 1 }, false),
            (RESPONSES, doc! { "invitationId": 1 }, false),
        ];

        for (collection, keys, unique) in indexes {
            let label = format!("{}({:?})", collection, keys.keys().collect::<Vec<_>>());
            let model = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(unique).build())
                .build();

            match self
                .collection::<Document>(collection)
                .create_index(model)
                .await
            {
                Ok(_) => log::info!("   ✅ Index ready: {}", label),
                Err(e) => log::debug!("   ℹ️  Index not created {}: {}", label, e),
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    fn users(&self) -> Collection<User> {
        self.collection(USERS)
    }

    fn surveys(&self) -> Collection<Survey> {
        self.collection(SURVEYS)
    }

    fn invitations(&self) -> Collection<Invitation> {
        self.collection(INVITATIONS)
    }

    fn responses(&self) -> Collection<Response> {
        self.collection(RESPONSES)
    }
}

#[async_trait]
impl SurveyStore for MongoDB {
    async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "id": id }).await?)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users().insert_one(user).await?;
        Ok(())
    }

    async fn get_survey(&self, id: &str) -> Result<Option<Survey>, AppError> {
        Ok(self.surveys().find_one(doc! { "id": id }).await?)
    }

    async fn list_user_surveys(&self, user_id: &str) -> Result<Vec<Survey>, AppError> {
        let cursor = self
            .surveys()
            .find(doc! { "userId": user_id })
            .sort(doc! { "_id": -1 })
            .await?;
        let surveys: Vec<Survey> = cursor.try_collect().await?;
        Ok(surveys)
    }

    async fn insert_survey(&self, survey: &Survey) -> Result<(), AppError> {
        self.surveys().insert_one(survey).await?;
        Ok(())
    }

    async fn update_survey(&self, survey: &Survey) -> Result<bool, AppError> {
        let result = self
            .surveys()
            .replace_one(
                doc! { "id": &survey.id, "status": { "$ne": "completed" } },
                survey,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn get_invitation(&self, id: &str) -> Result<Option<Invitation>, AppError> {
        Ok(self.invitations().find_one(doc! { "id": id }).await?)
    }

    async fn get_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        Ok(self.invitations().find_one(doc! { "token": token }).await?)
    }

    async fn list_survey_invitations(&self, survey_id: &str) -> Result<Vec<Invitation>, AppError> {
        let cursor = self
            .invitations()
            .find(doc! { "surveyId": survey_id })
            .sort(doc! { "_id": 1 })
            .await?;
        let invitations: Vec<Invitation> = cursor.try_collect().await?;
        Ok(invitations)
    }

    async fn insert_invitations(&self, invitations: &[Invitation]) -> Result<(), AppError> {
        if invitations.is_empty() {
            return Ok(());
        }
        self.invitations().insert_many(invitations).await?;
        Ok(())
    }

    async fn mark_invitation_started(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .invitations()
            .update_one(
                doc! { "id": id, "status": "pending" },
                doc! { "$set": { "status": "in_progress" } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn stamp_invitation_sent(&self, id: &str, sent_at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = self
            .invitations()
            .update_one(
                doc! { "id": id },
                doc! { "$set": { "sentAt": bson::to_bson(&sent_at)? } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn complete_invitation(&self, id: &str, completed_at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = self
            .invitations()
            .update_one(
                doc! { "id": id, "status": { "$ne": "completed" } },
                doc! { "$set": {
                    "status": "completed",
                    "completedAt": bson::to_bson(&completed_at)?,
                }},
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn count_completed_invitations(&self, survey_id: &str) -> Result<usize, AppError> {
        let count = self
            .invitations()
            .count_documents(doc! { "surveyId": survey_id, "status": "completed" })
            .await?;
        Ok(count as usize)
    }

    async fn insert_response(&self, response: &Response) -> Result<(), AppError> {
        self.responses().insert_one(response).await?;
        Ok(())
    }

    async fn survey_answers(&self, survey_id: &str) -> Result<Vec<AnsweredQuestion>, AppError> {
        // Starts from the survey's invitations so both lookups hit indexes.
        let pipeline = vec![
            doc! { "$match": { "surveyId": survey_id } },
            doc! { "$lookup": {
                "from": RESPONSES,
                "localField": "id",
                "foreignField": "invitationId",
                "as": "response",
            }},
            doc! { "$unwind": "$response" },
            doc! { "$replaceRoot": { "newRoot": "$response" } },
            doc! { "$sort": { "_id": 1 } },
            doc! { "$group": {
                "_id": { "invitation": "$invitationId", "question": "$questionId" },
                "answer": { "$last": "$answer" },
                "order": { "$last": "$_id" },
            }},
            doc! { "$sort": { "order": 1 } },
            doc! { "$project": { "_id": 0, "questionId": "$_id.question", "answer": 1 } },
        ];

        let mut cursor = self.invitations().aggregate(pipeline).await?;
        let mut answers = Vec::new();
        while let Some(result) = cursor.next().await {
            answers.push(bson::from_document::<AnsweredQuestion>(result?)?);
        }
        Ok(answers)
    }

    async fn complete_survey(
        &self,
        survey_id: &str,
        report: &InsightReport,
        completed_at: DateTime<Utc>,
        min_completed: usize,
    ) -> Result<CompletionOutcome, AppError> {
        match self.get_survey(survey_id).await? {
            None => return Ok(CompletionOutcome::NotFound),
            Some(s) if s.report_data.is_some() => return Ok(CompletionOutcome::AlreadyCompleted),
            Some(_) => {}
        }

        // Completed invitations never revert, so a count taken here still
        // holds when the update below lands.
        let completed = self.count_completed_invitations(survey_id).await?;
        if completed < min_completed {
            return Ok(CompletionOutcome::BelowThreshold { completed });
        }

        let mut report = report.clone();
        report.metadata.total_responses = completed;

        let result = self
            .surveys()
            .update_one(
                doc! { "id": survey_id, "status": { "$ne": "completed" } },
                doc! { "$set": {
                    "status": "completed",
                    "reportData": bson::to_bson(&report)?,
                    "completedAt": bson::to_bson(&completed_at)?,
                }},
            )
            .await?;

        if result.matched_count == 0 {
            return Ok(CompletionOutcome::AlreadyCompleted);
        }

        match self.get_survey(survey_id).await? {
            Some(survey) => Ok(CompletionOutcome::Completed(survey)),
            None => Ok(CompletionOutcome::NotFound),
        }
    }
}

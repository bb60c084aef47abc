use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::rest::eq;
use shared_database::DatabaseClient;

use crate::models::{NewUser, UserRecord, ValidatedSignup};

pub const USERS: &str = "users";

pub struct UserService {
    db: DatabaseClient,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DatabaseClient::new(config),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        debug!("Looking up user by email");
        self.db
            .select_one(USERS, &[("email", eq(email)), ("limit", "1".to_string())])
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        debug!("Looking up user {}", id);
        self.db
            .select_one(USERS, &[("id", eq(id)), ("limit", "1".to_string())])
            .await
    }

    pub async fn create(&self, form: ValidatedSignup, password_hash: String) -> Result<UserRecord> {
        let now = Utc::now();
        let new_user = NewUser {
            id: Uuid::new_v4().to_string(),
            name: form.name,
            email: form.email,
            password_hash,
            role: form.role,
            location: form.location,
            specialization: form.specialization,
            experience: form.experience,
            achievements: form.achievements,
            profile_picture: form.profile_picture,
            progress: Default::default(),
            stats: Default::default(),
            created_at: now,
            updated_at: now,
            last_login: None,
        };

        let user: UserRecord = self.db.insert(USERS, &new_user).await?;
        info!("Created {} account {}", form.role, user.id);
        Ok(user)
    }

    /// Stamp `last_login` and `updated_at`, returning the record as now stored.
    pub async fn touch_last_login(&self, mut user: UserRecord) -> Result<UserRecord> {
        let now = Utc::now();
        self.db
            .update(
                USERS,
                &[("id", eq(&user.id))],
                json!({ "last_login": now, "updated_at": now }),
            )
            .await?;

        user.last_login = Some(now);
        user.updated_at = now;
        Ok(user)
    }

    pub async fn count(&self) -> Result<usize> {
        self.db.count(USERS, &[]).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }
}

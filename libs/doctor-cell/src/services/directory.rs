use anyhow::Result;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::rest::{eq, ilike_contains, in_list};
use shared_database::DatabaseClient;

use crate::models::{DoctorRecord, DOCTOR_COLUMNS};

/// Read access to doctor accounts in the `users` collection.
#[derive(Clone)]
pub struct DoctorDirectory {
    db: DatabaseClient,
}

impl DoctorDirectory {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: DatabaseClient::new(config),
        }
    }

    /// Doctors, newest first. `specialization` is a case-insensitive partial match.
    pub async fn list(&self, specialization: Option<&str>) -> Result<Vec<DoctorRecord>> {
        debug!("Listing doctors, specialization filter: {:?}", specialization);

        let mut query = vec![
            ("select", DOCTOR_COLUMNS.to_string()),
            ("role", eq("doctor")),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(spec) = specialization.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("specialization", ilike_contains(spec)));
        }

        self.db.select("users", &query).await
    }

    pub async fn find(&self, id: &str) -> Result<Option<DoctorRecord>> {
        self.db
            .select_one(
                "users",
                &[
                    ("select", DOCTOR_COLUMNS.to_string()),
                    ("id", eq(id)),
                    ("role", eq("doctor")),
                ],
            )
            .await
    }

    /// Doctors among `ids`. Unknown ids are skipped.
    pub async fn find_many(&self, ids: &[String]) -> Result<Vec<DoctorRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.db
            .select(
                "users",
                &[("select", DOCTOR_COLUMNS.to_string()), ("id", in_list(ids))],
            )
            .await
    }
}

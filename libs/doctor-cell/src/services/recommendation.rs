use std::collections::HashSet;

use anyhow::Result;
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::models::DoctorRecord;
use crate::services::directory::DoctorDirectory;
use crate::services::specialization::{infer_specialization, specialization_aliases, Specialization};

const PARTIAL_MATCH_CHARS: usize = 6;

pub struct Recommendation {
    pub specialization: Option<Specialization>,
    pub doctors: Vec<DoctorRecord>,
}

pub struct RecommendationService {
    directory: DoctorDirectory,
}

impl RecommendationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            directory: DoctorDirectory::new(config),
        }
    }

    pub async fn recommend(&self, text: &str) -> Result<Recommendation> {
        let Some(specialization) = infer_specialization(text) else {
            debug!("No specialization inferred from symptoms");
            return Ok(Recommendation {
                specialization: None,
                doctors: Vec::new(),
            });
        };

        let doctors = self.doctors_for(specialization).await?;
        info!("Recommending {} {} doctor(s)", doctors.len(), specialization);

        Ok(Recommendation {
            specialization: Some(specialization),
            doctors,
        })
    }

    /// Try each stored spelling until one matches, then fall back to a prefix match.
    pub async fn doctors_for(&self, specialization: Specialization) -> Result<Vec<DoctorRecord>> {
        let mut seen = HashSet::new();
        let mut doctors = Vec::new();

        for alias in specialization_aliases(specialization.as_str()) {
            for doctor in self.directory.list(Some(&alias)).await? {
                if seen.insert(doctor.id.clone()) {
                    doctors.push(doctor);
                }
            }
            if !doctors.is_empty() {
                return Ok(doctors);
            }
        }

        let prefix: String = specialization.as_str().chars().take(PARTIAL_MATCH_CHARS).collect();
        debug!("No alias matched, trying prefix {}", prefix);
        self.directory.list(Some(&prefix)).await
    }
}

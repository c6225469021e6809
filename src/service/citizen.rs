use std::sync::Arc;

use tracing::info;

use crate::credentials::{hash_password, verify_password};
use crate::error::ServiceError;
use crate::models::citizen::{Citizen, NewCitizen};
use crate::repository::CitizenRepository;
use crate::validation::normalize_email;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login lookup and registration of citizens.
#[derive(Clone)]
pub struct CitizenService {
    repository: Arc<dyn CitizenRepository>,
}

impl CitizenService {
    pub fn new(repository: Arc<dyn CitizenRepository>) -> Self {
        Self { repository }
    }

    /// Unknown emails and wrong passwords fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Citizen, ServiceError> {
        let email = normalize_email(email)
            .map_err(|_| ServiceError::Authentication(INVALID_CREDENTIALS.to_string()))?;
        let citizen = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ServiceError::Authentication(INVALID_CREDENTIALS.to_string()))?;
        if !verify_password(citizen.password_hash.clone(), password.to_string()).await? {
            return Err(ServiceError::Authentication(INVALID_CREDENTIALS.to_string()));
        }
        Ok(citizen)
    }

    pub async fn create_citizen(&self, new_citizen: NewCitizen) -> Result<Citizen, ServiceError> {
        let password_hash = hash_password(new_citizen.password.clone()).await?;
        let citizen = new_citizen.into_citizen(password_hash);
        self.repository.save(citizen.clone()).await?;
        info!(citizen_id = %citizen.id, "citizen registered");
        Ok(citizen)
    }

    pub async fn find_citizen(&self, citizen_id: &str) -> Result<Citizen, ServiceError> {
        self.repository
            .find_by_id(citizen_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Citizen {citizen_id} not found")))
    }
}

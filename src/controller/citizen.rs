use chrono::Utc;

use crate::error::ServiceError;
use crate::models::citizen::{CitizenView, RegistrationRequest};
use crate::models::reply::Reply;
use crate::service::CitizenService;

use super::intercept;

#[derive(Clone)]
pub struct CitizenController {
    citizens: CitizenService,
}

impl CitizenController {
    pub fn new(citizens: CitizenService) -> Self {
        Self { citizens }
    }

    pub async fn register(&self, request: RegistrationRequest) -> Reply<CitizenView> {
        intercept("register", async {
            let new_citizen = request.into_new_citizen(Utc::now().date_naive())?;
            let citizen = self.citizens.create_citizen(new_citizen).await?;
            Ok::<_, ServiceError>(Reply::Data(CitizenView::from(&citizen)))
        })
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Reply<CitizenView> {
        intercept("login", async {
            let citizen = self.citizens.authenticate(email, password).await?;
            Ok::<_, ServiceError>(Reply::Data(CitizenView::from(&citizen)))
        })
        .await
    }

    pub async fn find_citizen(&self, citizen_id: &str) -> Reply<CitizenView> {
        intercept("find_citizen", async {
            let citizen = self.citizens.find_citizen(citizen_id).await?;
            Ok::<_, ServiceError>(Reply::Data(CitizenView::from(&citizen)))
        })
        .await
    }
}

use tracing::{info, warn};

use super::models::*;
use super::validators::OrganisationValidator;
use crate::common::{ApiClient, ApiError, Validator};

#[derive(Clone)]
pub struct OrganisationService {
    api: ApiClient,
}

impl OrganisationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The signed-in user's organisation
    pub async fn get_info(&self) -> Result<Organisation, ApiError> {
        let response: OrganisationResponse = self.api.get("/organisations/info").await?;
        Ok(response.into_organisation())
    }

    /// Creates the organisation and lifts the onboarding gate for this session
    pub async fn create(
        &self,
        request: CreateOrganisationRequest,
    ) -> Result<Organisation, ApiError> {
        OrganisationValidator.validate(&request).into_result()?;

        let response: OrganisationResponse =
            self.api.post("/organisations/create", &request).await?;
        let organisation = response.into_organisation();

        let organisation_id = organisation.id.clone();
        let updated = self
            .api
            .session()
            .update_user(|user| user.organisation_id = Some(organisation_id))
            .await?;
        if !updated {
            warn!(organisation_id = %organisation.id, "Organisation created without a signed-in user");
        }

        info!(organisation_id = %organisation.id, name = %organisation.name, "Organisation created");
        Ok(organisation)
    }

    pub async fn update(
        &self,
        request: UpdateOrganisationRequest,
    ) -> Result<Organisation, ApiError> {
        OrganisationValidator.validate(&request).into_result()?;

        let response: OrganisationResponse =
            self.api.patch("/organisations/update", &request).await?;
        let organisation = response.into_organisation();
        info!(organisation_id = %organisation.id, "Organisation updated");
        Ok(organisation)
    }
}

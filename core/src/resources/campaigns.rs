//! Marketing campaigns. Landing pages nest several optional sub-objects,
//! any of which may be absent, empty or populated.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::classify::Outcome;
use crate::client::PublicApiClient;
use crate::entity::Entity;
use crate::envelope::ResultEnvelope;
use crate::error::Error;
use crate::http::{HttpRequest, TransportOutcome};
use crate::pagination::Paging;
use crate::schema::{FieldKind, FieldSpec, Schema};

pub const BANNER: Schema = Schema {
    name: "campaignBanner",
    fields: &[
        FieldSpec::required("type", FieldKind::Text),
        FieldSpec::optional("backgroundImageUuid", FieldKind::Text),
        FieldSpec::optional("text", FieldKind::Text),
        FieldSpec::optional("textColor", FieldKind::Text),
        FieldSpec::optional("buttonText", FieldKind::Text),
        FieldSpec::optional("buttonPlacement", FieldKind::Text),
    ],
};

pub const LANDING_PAGE_HEADER: Schema = Schema {
    name: "campaignLandingPageHeader",
    fields: &[
        FieldSpec::optional("backgroundImageUuid", FieldKind::Text),
        FieldSpec::optional("logoUuid", FieldKind::Text),
        FieldSpec::optional("title", FieldKind::Text),
        FieldSpec::optional("baseline", FieldKind::Text),
        FieldSpec::optional("textColor", FieldKind::Text),
        FieldSpec::optional("position", FieldKind::Text),
    ],
};

pub const LANDING_PAGE_BODY: Schema = Schema {
    name: "campaignLandingPageBody",
    fields: &[
        FieldSpec::optional("title", FieldKind::Text),
        FieldSpec::optional("description", FieldKind::Text),
        FieldSpec::optional("contactEmail", FieldKind::Text),
        FieldSpec::optional("videoUrl", FieldKind::Text),
        FieldSpec::optional("buttonText", FieldKind::Text),
    ],
};

pub const FOOTER_FEATURE: Schema = Schema {
    name: "campaignFooterFeature",
    fields: &[
        FieldSpec::required("title", FieldKind::Text),
        FieldSpec::optional("description", FieldKind::Text),
        FieldSpec::optional("icon", FieldKind::Text),
    ],
};

pub const LANDING_PAGE_FOOTER: Schema = Schema {
    name: "campaignLandingPageFooter",
    fields: &[
        FieldSpec::optional("title", FieldKind::Text),
        FieldSpec::optional("backgroundColor", FieldKind::Text),
        FieldSpec::optional("textColor", FieldKind::Text),
        FieldSpec::optional("buttonText", FieldKind::Text),
        FieldSpec::optional("buttonUrl", FieldKind::Text),
        FieldSpec::optional("features", FieldKind::List(&FieldKind::Record(&FOOTER_FEATURE))),
    ],
};

pub const LANDING_PAGE: Schema = Schema {
    name: "campaignLandingPage",
    fields: &[
        FieldSpec::optional("url", FieldKind::Text),
        FieldSpec::optional("header", FieldKind::Record(&LANDING_PAGE_HEADER)),
        FieldSpec::optional("body", FieldKind::Record(&LANDING_PAGE_BODY)),
        FieldSpec::optional("footer", FieldKind::Record(&LANDING_PAGE_FOOTER)),
    ],
};

pub const CAMPAIGN: Schema = Schema {
    name: "campaign",
    fields: &[
        FieldSpec::required("reference", FieldKind::Text),
        FieldSpec::required("name", FieldKind::Text),
        FieldSpec::optional("category", FieldKind::Text),
        FieldSpec::optional("isActivated", FieldKind::Boolean),
        FieldSpec::optional("startDate", FieldKind::Text),
        FieldSpec::optional("endDate", FieldKind::Text),
        FieldSpec::optional("weight", FieldKind::Integer),
        FieldSpec::optional("banners", FieldKind::List(&FieldKind::Record(&BANNER))),
        FieldSpec::optional("landingPage", FieldKind::Record(&LANDING_PAGE)),
        FieldSpec::optional("rules", FieldKind::Any),
    ],
};

/// Campaign endpoints.
#[derive(Debug, Clone)]
pub struct CampaignClient {
    api: PublicApiClient,
}

impl CampaignClient {
    pub fn new(api: PublicApiClient) -> Self {
        Self { api }
    }

    pub fn build_get_active_campaign(&self, paging: &Paging) -> HttpRequest {
        self.api.build_get("/campaigns/active", paging)
    }

    pub fn parse_get_active_campaign(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Entity>>, Error> {
        self.api.parse_single(request, outcome, &CAMPAIGN)
    }

    pub fn build_get_campaign_details(&self, reference: Uuid) -> HttpRequest {
        self.api.build_get(&format!("/campaigns/{reference}"), &Paging::Default)
    }

    pub fn parse_get_campaign_details(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Entity>>, Error> {
        self.api.parse_single(request, outcome, &CAMPAIGN)
    }

    pub fn build_post_campaign_email<B: Serialize + ?Sized>(
        &self,
        reference: Uuid,
        payload: &B,
    ) -> Result<HttpRequest, Error> {
        self.api.build_post(&format!("/campaigns/{reference}/notify"), payload)
    }

    /// The service answers 204 with no body.
    pub fn parse_post_campaign_email(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<Value>, Error> {
        self.api.parse_empty(request, outcome)
    }
}

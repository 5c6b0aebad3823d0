//! Customer records. The customers API uses PascalCase keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classify::Outcome;
use crate::client::PublicApiClient;
use crate::entity::Entity;
use crate::envelope::ResultEnvelope;
use crate::error::Error;
use crate::http::{HttpRequest, TransportOutcome};
use crate::pagination::Paging;
use crate::schema::{FieldKind, FieldSpec, Schema};

pub const CONTACT: Schema = Schema {
    name: "customerContact",
    fields: &[
        FieldSpec::optional("FirstName", FieldKind::Text),
        FieldSpec::optional("LastName", FieldKind::Text),
        FieldSpec::optional("Email", FieldKind::Text),
        FieldSpec::optional("Phone", FieldKind::Text),
        FieldSpec::optional("ContactPersonID", FieldKind::Text),
        FieldSpec::optional("SyncPartnerContactRefId", FieldKind::Integer),
    ],
};

pub const CUSTOMER_DETAILS: Schema = Schema {
    name: "customerDetails",
    fields: &[
        FieldSpec::optional("DomainName", FieldKind::Text),
        FieldSpec::optional("OrganizationUnitRef", FieldKind::Text),
        FieldSpec::optional("Tenant", FieldKind::Any),
    ],
};

pub const CUSTOMER: Schema = Schema {
    name: "customer",
    fields: &[
        FieldSpec::required("Reference", FieldKind::Text),
        FieldSpec::optional("WorkgroupCode", FieldKind::Text),
        FieldSpec::required("CompanyName", FieldKind::Text),
        FieldSpec::optional("CompanyAcronym", FieldKind::Text),
        FieldSpec::optional("PartnerCompanyId", FieldKind::Text),
        FieldSpec::optional("AddressLine1", FieldKind::Text),
        FieldSpec::optional("AddressLine2", FieldKind::Text),
        FieldSpec::optional("Zip", FieldKind::Text),
        FieldSpec::optional("City", FieldKind::Text),
        FieldSpec::optional("CountryCode", FieldKind::Text),
        FieldSpec::optional("State", FieldKind::Text),
        FieldSpec::optional("ReceptionPhone", FieldKind::Text),
        FieldSpec::optional("WebsiteUrl", FieldKind::Text),
        FieldSpec::optional("EmailContact", FieldKind::Text),
        FieldSpec::optional("Headcount", FieldKind::Integer),
        FieldSpec::optional("TaxNumber", FieldKind::Text),
        FieldSpec::optional("Ref", FieldKind::Text),
        FieldSpec::optional("RegistrationNumber", FieldKind::Text),
        FieldSpec::optional("BillingId", FieldKind::Text),
        FieldSpec::optional("Type", FieldKind::Text),
        FieldSpec::optional("InternalReference", FieldKind::Text),
        FieldSpec::optional("Contact", FieldKind::Record(&CONTACT)),
        FieldSpec::optional("Details", FieldKind::Record(&CUSTOMER_DETAILS)),
    ],
};

/// `data` of the customer listing and update endpoints.
pub const CUSTOMER_LIST: Schema = Schema {
    name: "customerList",
    fields: &[FieldSpec::required("customers", FieldKind::List(&FieldKind::Record(&CUSTOMER)))],
};

pub const CUSTOMER_CREATED: Schema = Schema {
    name: "customerCreated",
    fields: &[FieldSpec::required("reference", FieldKind::Text)],
};

/// Request payload for creating a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerPayload {
    pub company_name: String,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub country_code: String,
    pub zip: String,
    pub reception_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_contact: Option<String>,
}

/// Request payload for updating a customer. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Request payload for moving a customer to another program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPayload {
    pub program: String,
}

/// Customer endpoints.
#[derive(Debug, Clone)]
pub struct CustomersClient {
    api: PublicApiClient,
}

impl CustomersClient {
    pub fn new(api: PublicApiClient) -> Self {
        Self { api }
    }

    pub fn build_get_customers(&self, paging: &Paging) -> HttpRequest {
        self.api.build_get("/customers", paging)
    }

    pub fn parse_get_customers(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Entity>>, Error> {
        self.api.parse_single(request, outcome, &CUSTOMER_LIST)
    }

    pub fn build_create_customer(&self, payload: &CustomerPayload) -> Result<HttpRequest, Error> {
        self.api.build_post("/customers", payload)
    }

    pub fn parse_create_customer(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Entity>>, Error> {
        self.api.parse_single(request, outcome, &CUSTOMER_CREATED)
    }

    pub fn build_update_customer(&self, reference: &str, update: &CustomerUpdate) -> Result<HttpRequest, Error> {
        self.api.build_patch(&format!("/customers/{reference}"), update)
    }

    pub fn parse_update_customer(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<ResultEnvelope<Entity>>, Error> {
        self.api.parse_single(request, outcome, &CUSTOMER_LIST)
    }

    pub fn build_post_customer_migration(
        &self,
        reference: &str,
        payload: &MigrationPayload,
    ) -> Result<HttpRequest, Error> {
        self.api.build_post(&format!("/customers/{reference}/migration"), payload)
    }

    /// The service answers 202 with no body.
    pub fn parse_post_customer_migration(
        &self,
        request: &HttpRequest,
        outcome: &TransportOutcome,
    ) -> Result<Outcome<Value>, Error> {
        self.api.parse_empty(request, outcome)
    }
}

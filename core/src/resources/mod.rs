//! Per-resource schemas and thin endpoint clients.
//!
//! Each resource declares its record layout as `const Schema` values and
//! exposes `build_*`/`parse_*` pairs that only pick a path and a schema; all
//! hydration, classification and paging go through the shared core.

pub mod campaigns;
pub mod customers;
pub mod licenses;

use crate::client::PublicApiClient;

pub use campaigns::CampaignClient;
pub use customers::CustomersClient;
pub use licenses::{ConversionSku, LicenseFilters, LicensesClient};

impl PublicApiClient {
    pub fn campaigns(&self) -> CampaignClient {
        CampaignClient::new(self.clone())
    }

    pub fn customers(&self) -> CustomersClient {
        CustomersClient::new(self.clone())
    }

    pub fn licenses(&self) -> LicensesClient {
        LicensesClient::new(self.clone())
    }
}

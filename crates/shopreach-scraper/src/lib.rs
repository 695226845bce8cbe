pub mod api;
pub mod catalog;
pub mod collector;
pub mod delivery;
pub mod discovery;
pub mod error;
pub mod extract;

pub use api::{ProductApiClient, PushOutcome, PushSummary};
pub use catalog::{ListingSource, ProductPageLocators, ShopCatalog};
pub use collector::{collect_new_products, CollectOptions, CollectReport, RevisitPolicy};
pub use delivery::{extract_delivery_rates, DeliveryRateLocators};
pub use discovery::{discover_groups, DiscoveryReport, GroupSearchLocators};
pub use error::ScraperError;
pub use extract::{item_id_from_url, optional_field, parse_price, ExtractError};

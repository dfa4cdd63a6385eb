pub mod company;
pub mod features;
pub mod ids;
pub mod routes;

pub use company::{Catalog, Company, InMemoryCatalog};
pub use features::{Feature, FeatureCategory, FeatureRegistry, FeatureValue};
pub use ids::CompanyId;
pub use routes::Route;

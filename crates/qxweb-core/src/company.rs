use serde::{Deserialize, Serialize};

use crate::ids::CompanyId;

/// A directory listing. Read-only from the comparison subsystem's
/// perspective: the catalog hands out clones, nothing mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub team_size: Option<u32>,
    #[serde(default)]
    pub founded: Option<u16>,
    #[serde(default)]
    pub hourly_rate: Option<String>,
    #[serde(default)]
    pub min_project_size: Option<String>,
    #[serde(default)]
    pub avg_project_length: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl Company {
    pub fn has_service(&self, tag: &str) -> bool {
        self.services.iter().any(|s| s == tag)
    }
}

/// Entity lookup collaborator: a preloaded, read-mostly catalog.
pub trait Catalog: Send + Sync {
    fn find_by_id(&self, id: &str) -> Option<Company>;
    fn all(&self) -> Vec<Company>;
}

/// In-memory catalog over a preloaded company list.
pub struct InMemoryCatalog {
    companies: Vec<Company>,
}

impl InMemoryCatalog {
    pub fn new(companies: Vec<Company>) -> Self {
        Self { companies }
    }

    /// Parse a catalog from a JSON array of companies.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let companies: Vec<Company> = serde_json::from_str(json)?;
        Ok(Self::new(companies))
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn find_by_id(&self, id: &str) -> Option<Company> {
        self.companies.iter().find(|c| c.id.as_str() == id).cloned()
    }

    fn all(&self) -> Vec<Company> {
        self.companies.clone()
    }
}

/// Path of the comparison page.
pub const COMPARE_PATH: &str = "/companies/compare";

/// The page a selection manager is currently mounted on. The comparison
/// page is the only route with special behavior (URL hydration, URL
/// write-back, hidden floating panel); every other page is `Other`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Compare,
    Other(String),
}

impl Route {
    /// Classify a path. Trailing slashes are insignificant.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        if trimmed == COMPARE_PATH {
            Self::Compare
        } else {
            Self::Other(path.to_string())
        }
    }

    pub fn is_compare(&self) -> bool {
        matches!(self, Self::Compare)
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Compare => COMPARE_PATH,
            Self::Other(path) => path,
        }
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::Other("/".to_string())
    }
}

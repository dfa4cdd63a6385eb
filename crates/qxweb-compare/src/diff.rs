use qxweb_core::{Company, Feature, FeatureCategory, FeatureRegistry};

/// Canonical cell text for an absent value. Treated as a value of its
/// own, so present-vs-absent counts as a difference.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Filter applied to the comparison table rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Differences,
    Similarities,
    Category(FeatureCategory),
}

impl std::str::FromStr for CategoryFilter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "differences" => Ok(Self::Differences),
            "similarities" => Ok(Self::Similarities),
            other => other
                .parse::<FeatureCategory>()
                .map(Self::Category)
                .map_err(|_| format!("unknown category filter: {other}")),
        }
    }
}

/// Canonical string for a feature cell: stringified value, or the
/// "Not specified" sentinel when the accessor yields nothing.
pub fn canonical_value(feature: &Feature, company: &Company) -> String {
    feature
        .value(company)
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// Registry rows matching the filter. `Differences` and `Similarities`
/// return every feature: narrowing happens through the highlight
/// predicate so row labels stay on screen for context.
pub fn filter_features<'a>(
    registry: &'a FeatureRegistry,
    filter: CategoryFilter,
) -> Vec<&'a Feature> {
    registry
        .features()
        .iter()
        .filter(|f| match filter {
            CategoryFilter::All | CategoryFilter::Differences | CategoryFilter::Similarities => true,
            CategoryFilter::Category(category) => f.category == category,
        })
        .collect()
}

/// Deduplicated union of the selected companies' service tags, in
/// first-seen order. Empty unless the filter admits the services section.
pub fn filter_services(selection: &[Company], filter: CategoryFilter) -> Vec<String> {
    let admits_services = matches!(
        filter,
        CategoryFilter::All
            | CategoryFilter::Differences
            | CategoryFilter::Similarities
            | CategoryFilter::Category(FeatureCategory::Services)
    );
    if !admits_services {
        return Vec::new();
    }

    let mut tags: Vec<String> = Vec::new();
    for company in selection {
        for tag in &company.services {
            if !tags.iter().any(|t| t == tag) {
                tags.push(tag.clone());
            }
        }
    }
    tags
}

/// True iff highlighting is enabled and at least two selected companies
/// produce different canonical strings for this feature. With fewer than
/// two companies there is nothing to differ.
pub fn should_highlight(feature: &Feature, selection: &[Company], enabled: bool) -> bool {
    if !enabled || selection.len() < 2 {
        return false;
    }
    let first = canonical_value(feature, &selection[0]);
    selection[1..]
        .iter()
        .any(|c| canonical_value(feature, c) != first)
}

/// Service-row variant of the highlight rule: highlighted iff a strict
/// non-empty subset of the selection carries the tag.
pub fn service_highlight(tag: &str, selection: &[Company], enabled: bool) -> bool {
    if !enabled || selection.len() < 2 {
        return false;
    }
    let holders = selection.iter().filter(|c| c.has_service(tag)).count();
    holders > 0 && holders < selection.len()
}

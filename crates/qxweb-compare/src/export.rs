use qxweb_core::{Company, FeatureCategory, FeatureRegistry};

use crate::diff::{canonical_value, filter_services, CategoryFilter};

/// Render the current selection as a quote-wrapped CSV table with basic
/// info, financial info and services sections. Empty selection yields an
/// empty string; the consuming page triggers the actual download.
pub fn export_csv(selection: &[Company], registry: &FeatureRegistry) -> String {
    if selection.is_empty() {
        return String::new();
    }

    let mut out = String::new();

    let mut header: Vec<String> = vec!["Feature".into()];
    header.extend(selection.iter().map(|c| c.name.clone()));
    push_row(&mut out, &header);

    section(&mut out, "Basic Info", FeatureCategory::Basic, selection, registry);
    section(&mut out, "Financial Info", FeatureCategory::Financial, selection, registry);

    push_row(&mut out, &["Services".to_string()]);
    for tag in filter_services(selection, CategoryFilter::All) {
        let mut row: Vec<String> = vec![tag.clone()];
        row.extend(selection.iter().map(|c| {
            if c.has_service(&tag) { "Yes".to_string() } else { "No".to_string() }
        }));
        push_row(&mut out, &row);
    }

    out
}

fn section(
    out: &mut String,
    title: &str,
    category: FeatureCategory,
    selection: &[Company],
    registry: &FeatureRegistry,
) {
    push_row(out, &[title.to_string()]);
    for feature in registry.features().iter().filter(|f| f.category == category) {
        let mut row: Vec<String> = vec![feature.label.to_string()];
        row.extend(selection.iter().map(|c| canonical_value(feature, c)));
        push_row(out, &row);
    }
}

fn push_row(out: &mut String, cells: &[String]) {
    let quoted: Vec<String> = cells
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect();
    out.push_str(&quoted.join(","));
    out.push('\n');
}

//! Category and service mix reports.
//!
//! These are snapshots over the whole catalog rather than time series, but they
//! share the [`ReportData`] envelope so the dashboard and CSV export treat them
//! the same way.

use std::collections::{HashMap, HashSet};

use serde_json::json;
use uuid::Uuid;

use super::{
    CategorySummary, Dataset, MetricValue, ReportData, ReportSummary, ServiceSummary, fixed2,
    safe_ratio,
};
use crate::models::{ServiceCategory, ServiceListing};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// A named count, one row of a distribution table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slice {
    name: String,
    count: u64,
}

/// Listing count per category.
///
/// Categories without listings are left out of the chart and table but still
/// count towards `totalCategories`.
#[tracing::instrument(
    name = "reports.categories",
    skip_all,
    fields(categories = categories.len(), listings = listings.len())
)]
pub fn category_distribution(
    categories: &[ServiceCategory],
    listings: &[ServiceListing],
) -> ReportData {
    let mut per_category: HashMap<Uuid, u64> = HashMap::new();
    for category_id in listings.iter().filter_map(|l| l.category_id) {
        *per_category.entry(category_id).or_default() += 1;
    }

    let mut slices: Vec<Slice> = categories
        .iter()
        .map(|c| Slice {
            name: c.category_name.clone(),
            count: per_category.get(&c.id).copied().unwrap_or(0),
        })
        .filter(|s| s.count > 0)
        .collect();
    sort_descending(&mut slices);

    let total_categories = categories.len() as u64;
    let total_listings: u64 = slices.iter().map(|s| s.count).sum();

    let summary = ReportSummary::Categories(CategorySummary {
        total_categories,
        total_listings,
        average_listings_per_category: fixed2(safe_ratio(
            total_listings as f64,
            total_categories as f64,
        )),
    });

    into_report(slices, "Listings", "Category", summary)
}

/// Listings grouped by the name of their category.
///
/// A listing without a category, or whose category no longer exists, is
/// grouped under [`UNCATEGORIZED`].
#[tracing::instrument(
    name = "reports.services",
    skip_all,
    fields(categories = categories.len(), listings = listings.len())
)]
pub fn service_distribution(
    categories: &[ServiceCategory],
    listings: &[ServiceListing],
) -> ReportData {
    let names: HashMap<Uuid, &str> = categories
        .iter()
        .map(|c| (c.id, c.category_name.as_str()))
        .collect();

    // First-seen order, so ties keep the order listings were stored in.
    let mut slices: Vec<Slice> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for listing in listings {
        let name = listing
            .category_id
            .and_then(|id| names.get(&id).copied())
            .unwrap_or(UNCATEGORIZED);

        if seen.insert(name) {
            slices.push(Slice {
                name: name.to_string(),
                count: 1,
            });
        } else if let Some(slice) = slices.iter_mut().find(|s| s.name == name) {
            slice.count += 1;
        }
    }
    sort_descending(&mut slices);

    let summary = ReportSummary::Services(ServiceSummary {
        total_services: listings.len() as u64,
        total_categories: slices.len() as u64,
        most_popular_category: slices
            .first()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "None".to_string()),
    });

    into_report(slices, "Services", "Category", summary)
}

fn sort_descending(slices: &mut [Slice]) {
    // `sort_by` is stable, ties keep their input order.
    slices.sort_by(|a, b| b.count.cmp(&a.count));
}

fn into_report(
    slices: Vec<Slice>,
    dataset_label: &'static str,
    name_header: &'static str,
    summary: ReportSummary,
) -> ReportData {
    let labels = slices.iter().map(|s| s.name.clone()).collect();
    let data = slices.iter().map(|s| MetricValue::Count(s.count)).collect();
    let table_data = slices
        .iter()
        .map(|s| json!({ "name": s.name, "count": s.count }))
        .collect();

    ReportData {
        labels,
        datasets: vec![Dataset::new(0, dataset_label, data)],
        summary,
        table_headers: vec![name_header.to_string(), dataset_label.to_string()],
        table_data,
        table_keys: vec!["name", "count"],
    }
}

//! Merge per-municipality fetches into one collection, tolerating partial failure.

use log::{info, warn};

use crate::error::FetchError;
use crate::feature::{FeatureCollection, WGS84_EPSG};
use crate::filter::{filter_features, Predicate};

/// A source whose fetch failed during a combine.
#[derive(Debug)]
pub struct SourceFailure {
    pub name: String,
    pub error: FetchError,
}

/// Result of [`combine`].
#[derive(Debug, Default)]
pub struct Combined {
    pub collection: FeatureCollection,
    /// Sources that contributed at least one feature after filtering.
    pub succeeded: usize,
    /// Always the number of names asked for.
    pub total: usize,
    /// Names of the contributing sources, in order.
    pub contributors: Vec<String>,
    pub failures: Vec<SourceFailure>,
}

impl Combined {
    #[inline] pub fn is_empty(&self) -> bool { self.collection.is_empty() }
}

/// Fetch each name in order, filter, and concatenate the non-empty results.
///
/// A failed fetch is logged, recorded in [`Combined::failures`] and skipped.
/// The output is tagged EPSG:4326 only when it holds at least one feature.
pub fn combine<F>(names: &[String], mut fetch: F, predicate: Option<&Predicate>) -> Combined
where
    F: FnMut(&str) -> Result<FeatureCollection, FetchError>,
{
    let mut out = Combined { total: names.len(), ..Default::default() };

    for name in names {
        let fetched = match fetch(name) {
            Ok(fc) => fc,
            Err(error) => {
                warn!("[combine] skipping {name}: {error}");
                out.failures.push(SourceFailure { name: name.clone(), error });
                continue;
            }
        };

        let kept = filter_features(fetched.features, predicate);
        if !kept.is_empty() {
            out.collection.extend(kept);
            out.succeeded += 1;
            out.contributors.push(name.clone());
        }
    }

    if !out.collection.is_empty() {
        out.collection.set_epsg(WGS84_EPSG);
    }
    info!(
        "[combine] {} features from {}/{} sources ({} failed)",
        out.collection.len(), out.succeeded, out.total, out.failures.len(),
    );
    out
}

/// Result of [`stitch_boundaries`].
#[derive(Debug, Default)]
pub struct Stitched {
    /// `None` when no boundary came back.
    pub boundary: Option<FeatureCollection>,
    pub failures: Vec<SourceFailure>,
}

/// Concatenate the boundaries of several municipalities, keeping per-source failures.
pub fn stitch_boundaries<F>(names: &[String], fetch: F) -> Stitched
where
    F: FnMut(&str) -> Result<FeatureCollection, FetchError>,
{
    let Combined { collection, failures, .. } = combine(names, fetch, None);
    Stitched { boundary: (!collection.is_empty()).then_some(collection), failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, CATEGORY_KEY};
    use crate::feature::Feature;
    use serde_json::{json, Map};

    fn parcels(categories: &[&str]) -> FeatureCollection {
        categories.iter()
            .map(|c| {
                let mut props = Map::new();
                props.insert(CATEGORY_KEY.into(), json!(c));
                Feature::new(None, props)
            })
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn refused(name: &str) -> FetchError {
        FetchError::Status { url: format!("/geojson?municipio={name}"), status: 500 }
    }

    #[test]
    fn every_fetch_failing_gives_empty_untagged_result() {
        let sources = names(&["A", "B", "C"]);
        let out = combine(&sources, |n| Err(refused(n)), None);
        assert!(out.is_empty());
        assert_eq!((out.succeeded, out.total), (0, 3));
        assert_eq!(out.failures.len(), 3);
        assert_eq!(out.collection.epsg(), None);
    }

    #[test]
    fn mixed_sources_keep_order_and_count_contributors() {
        let sources = names(&["A", "B", "C"]);
        let out = combine(&sources, |n| match n {
            "A" => Ok(parcels(&["Grande Propriedade", "Média Propriedade", "Grande Propriedade"])),
            "B" => Ok(FeatureCollection::default()),
            _ => Err(refused(n)),
        }, None);

        assert_eq!((out.succeeded, out.total), (1, 3));
        assert_eq!(out.collection.len(), 3);
        assert_eq!(out.collection.epsg(), Some(WGS84_EPSG));
        assert_eq!(out.failures[0].name, "C");
        assert_eq!(out.contributors, vec!["A"]);
    }

    #[test]
    fn sources_emptied_by_the_filter_do_not_count() {
        let sources = names(&["A", "B"]);
        let predicate = Predicate::Category(Category::Large);
        let out = combine(&sources, |n| match n {
            "A" => Ok(parcels(&["Pequena Propriedade"])),
            _ => Ok(parcels(&["Grande Propriedade", "Pequena Propriedade"])),
        }, Some(&predicate));

        assert_eq!(out.succeeded, 1);
        assert_eq!(out.collection.len(), 1);
    }

    #[test]
    fn stitching_nothing_is_none() {
        let sources = names(&["A"]);
        assert!(stitch_boundaries(&sources, |_| Ok(FeatureCollection::default())).boundary.is_none());
        assert!(stitch_boundaries(&[], |n| Err(refused(n))).boundary.is_none());
        assert_eq!(stitch_boundaries(&sources, |_| Ok(parcels(&["x"]))).boundary.map(|fc| fc.len()), Some(1));
    }

    #[test]
    fn stitching_keeps_boundary_failures() {
        let sources = names(&["Crato", "Jardim"]);
        let out = stitch_boundaries(&sources, |n| match n {
            "Crato" => Ok(parcels(&["x"])),
            _ => Err(refused(n)),
        });
        assert_eq!(out.boundary.map(|fc| fc.len()), Some(1));
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].name, "Jardim");
    }
}

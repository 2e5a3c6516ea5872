//! Property-value predicates over feature lists.

use crate::category::{Category, SettlementKind, CATEGORY_KEY, SETTLEMENT_KIND_KEY};
use crate::feature::Feature;

/// Equality test on a single feature property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// `categoria` equals the category label (case-sensitive).
    ///
    /// For [`Category::Unclassified`] this also matches features whose value is
    /// missing, null, or not one of the known labels.
    Category(Category),
    /// `categoria` is present but not a known label, or is literally "Sem Classificação".
    /// Features with no `categoria` at all do not match.
    UnrecognizedCategory,
    /// `tipo_assentamento` equals the kind, ignoring case.
    SettlementKind(SettlementKind),
}

impl Predicate {
    /// Category predicate for a selector value; "Todas" (all categories) means no predicate.
    pub fn for_selector(selector: &str) -> Result<Option<Predicate>, String> {
        if selector == crate::category::ALL_CATEGORIES {
            return Ok(None);
        }
        Ok(Some(Predicate::Category(selector.parse()?)))
    }

    /// Check whether a feature satisfies this predicate.
    pub fn matches(&self, feature: &Feature) -> bool {
        match *self {
            Predicate::Category(Category::Unclassified) => {
                Category::of_feature(feature) == Category::Unclassified
            }
            Predicate::Category(category) => {
                feature.property_str(CATEGORY_KEY) == Some(category.label())
            }
            Predicate::UnrecognizedCategory => match feature.property(CATEGORY_KEY) {
                None => false,
                Some(value) => value.as_str()
                    .and_then(Category::from_label)
                    .is_none_or(|c| c == Category::Unclassified),
            },
            Predicate::SettlementKind(kind) => {
                feature.property_str(SETTLEMENT_KIND_KEY).is_some_and(|v| kind.matches(v))
            }
        }
    }
}

/// Keep the features satisfying `predicate`; `None` returns the input unchanged.
pub fn filter_features(features: Vec<Feature>, predicate: Option<&Predicate>) -> Vec<Feature> {
    match predicate {
        None => features,
        Some(p) => features.into_iter().filter(|f| p.matches(f)).collect(),
    }
}

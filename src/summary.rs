//! Area statistics for the summary table and the settlement panel.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::category::{Category, CATEGORY_KEY};
use crate::common::{coerce_opt, round_to};
use crate::feature::Feature;

/// Property key holding the area in hectares.
pub const AREA_KEY: &str = "area";

/// One row of the per-category area table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryRow {
    /// Raw `categoria` value, or `None` for features without one.
    pub category: Option<String>,
    pub total_area_ha: f64,
    /// Features in the group, including those whose area did not coerce.
    pub count: usize,
    /// Share of the grand total area, rounded to two decimals.
    pub percent_of_total: f64,
}

impl SummaryRow {
    /// Label for display; features without a category read "Sem categoria".
    pub fn label(&self) -> &str {
        self.category.as_deref().unwrap_or("Sem categoria")
    }

    /// Tie-break order: known categories by enumeration, then unknown values, then missing.
    fn rank(&self) -> usize {
        match self.category.as_deref() {
            Some(label) => Category::from_label(label).map_or(Category::ALL.len(), Category::rank),
            None => Category::ALL.len() + 1,
        }
    }
}

/// Group features by `categoria` and compute area totals, counts and shares.
///
/// Non-numeric areas are skipped. A zero grand total yields 0% for every row.
/// Rows are ordered by total area, largest first.
pub fn summarize(features: &[Feature]) -> Vec<SummaryRow> {
    let mut groups: HashMap<Option<String>, (f64, usize)> = HashMap::new();
    for feature in features {
        let entry = groups.entry(group_key(feature)).or_insert((0.0, 0));
        entry.0 += coerce_opt(feature.property(AREA_KEY)).unwrap_or(0.0);
        entry.1 += 1;
    }

    let grand_total: f64 = groups.values().map(|(area, _)| area).sum();

    let mut rows: Vec<SummaryRow> = groups.into_iter()
        .map(|(category, (total_area_ha, count))| SummaryRow {
            category,
            total_area_ha,
            count,
            percent_of_total: if grand_total > 0.0 {
                round_to(100.0 * total_area_ha / grand_total, 2)
            } else {
                0.0
            },
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_area_ha.total_cmp(&a.total_area_ha)
            .then_with(|| a.rank().cmp(&b.rank()))
            .then_with(|| a.category.cmp(&b.category))
    });
    rows
}

/// Key a feature by its raw category; non-string values are stringified.
fn group_key(feature: &Feature) -> Option<String> {
    match feature.property(CATEGORY_KEY)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Headline numbers above the summary table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SummaryTotals {
    pub categories: usize,
    pub features: usize,
    pub total_area_ha: f64,
}

impl SummaryTotals {
    pub fn from_rows(rows: &[SummaryRow]) -> Self {
        Self {
            categories: rows.len(),
            features: rows.iter().map(|r| r.count).sum(),
            total_area_ha: rows.iter().map(|r| r.total_area_ha).sum(),
        }
    }
}

/// Settlement panel statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SettlementStats {
    /// All settlements, whether or not their area is usable.
    pub total: usize,
    pub area_total_ha: f64,
    /// Mean over settlements with a usable area.
    pub area_mean_ha: f64,
}

/// Count settlements and total/average their coercible areas (two decimals).
pub fn settlement_stats(features: &[Feature]) -> SettlementStats {
    let areas: Vec<f64> = features.iter()
        .filter_map(|f| coerce_opt(f.property(AREA_KEY)))
        .collect();

    if areas.is_empty() {
        return SettlementStats { total: features.len(), ..Default::default() };
    }

    let sum: f64 = areas.iter().sum();
    SettlementStats {
        total: features.len(),
        area_total_ha: round_to(sum, 2),
        area_mean_ha: round_to(sum / areas.len() as f64, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn parcel(category: Option<&str>, area: Value) -> Feature {
        let mut props = Map::new();
        if let Some(c) = category { props.insert(CATEGORY_KEY.into(), json!(c)); }
        props.insert(AREA_KEY.into(), area);
        Feature::new(None, props)
    }

    #[test]
    fn empty_input_gives_empty_summary() {
        assert!(summarize(&[]).is_empty());
        assert_eq!(SummaryTotals::from_rows(&[]), SummaryTotals::default());
    }

    #[test]
    fn groups_sum_and_count_with_coercion() {
        let features = vec![
            parcel(Some("Grande Propriedade"), json!(300.0)),
            parcel(Some("Grande Propriedade"), json!("100")),
            parcel(Some("Pequena Propriedade"), json!("N/A")),
            parcel(Some("Pequena Propriedade"), json!(100)),
            parcel(None, Value::Null),
        ];
        let rows = summarize(&features);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].category.as_deref(), Some("Grande Propriedade"));
        assert_eq!(rows[0].total_area_ha, 400.0);
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].percent_of_total, 80.0);

        assert_eq!(rows[1].category.as_deref(), Some("Pequena Propriedade"));
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].percent_of_total, 20.0);

        assert_eq!(rows[2].category, None);
        assert_eq!(rows[2].count, 1);
        assert_eq!(rows[2].label(), "Sem categoria");
    }

    #[test]
    fn missing_category_is_separate_from_unclassified() {
        let features = vec![
            parcel(Some("Sem Classificação"), json!(10)),
            parcel(None, json!(10)),
        ];
        let rows = summarize(&features);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category.as_deref(), Some("Sem Classificação"));
        assert_eq!(rows[1].category, None);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let features = vec![
            parcel(Some("Grande Propriedade"), json!(1.0)),
            parcel(Some("Média Propriedade"), json!(1.0)),
            parcel(Some("Pequena Propriedade"), json!(1.0)),
        ];
        let rows = summarize(&features);
        let total: f64 = rows.iter().map(|r| r.percent_of_total).sum();
        assert!((total - 100.0).abs() <= 0.005 * rows.len() as f64);
    }

    #[test]
    fn ties_follow_enumeration_order() {
        let features = vec![
            parcel(Some("Grande Propriedade"), json!(5)),
            parcel(Some("Outra"), json!(5)),
            parcel(Some("Pequena Propriedade < 1 MF"), json!(5)),
            parcel(Some("Média Propriedade"), json!(5)),
        ];
        let labels: Vec<_> = summarize(&features).into_iter().map(|r| r.category.unwrap()).collect();
        assert_eq!(labels, vec!["Pequena Propriedade < 1 MF", "Média Propriedade", "Grande Propriedade", "Outra"]);
    }

    #[test]
    fn zero_total_area_short_circuits_percentages() {
        let features = vec![parcel(Some("Grande Propriedade"), json!("N/A")), parcel(None, json!(0))];
        let rows = summarize(&features);
        assert!(rows.iter().all(|r| r.percent_of_total == 0.0));
        assert_eq!(SummaryTotals::from_rows(&rows).features, 2);
    }

    #[test]
    fn settlement_stats_skip_unusable_areas() {
        let features = vec![
            parcel(None, json!(10.0)),
            parcel(None, json!("20.5")),
            parcel(None, json!("Não Disponível")),
        ];
        let stats = settlement_stats(&features);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.area_total_ha, 30.5);
        assert_eq!(stats.area_mean_ha, 15.25);
        assert_eq!(settlement_stats(&[]), SettlementStats::default());
    }
}

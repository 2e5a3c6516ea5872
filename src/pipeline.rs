//! The dashboard interactions: fetch, combine, filter, simplify, summarize, layer.

use std::path::PathBuf;

use log::{info, log, Level};

use crate::category::{Category, SettlementKind, ALL_CATEGORIES};
use crate::client::{Clock, SettlementQuery, SystemClock, TerraGeoClient, Transport};
use crate::combine::{combine, stitch_boundaries, Combined, SourceFailure};
use crate::error::{ExportError, FetchError};
use crate::export::ShapefileExporter;
use crate::feature::FeatureCollection;
use crate::filter::{filter_features, Predicate};
use crate::render::{category_layers, map_center, normalize_settlement, settlement_layers, Layer, DEFAULT_CENTER};
use crate::simplify::simplify;
use crate::summary::{settlement_stats, summarize, SettlementStats, SummaryRow, SummaryTotals};

/// Non-blocking message shown next to the result of an interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    fn new(level: Level, message: String) -> Self {
        log!(level, "[pipeline] {message}");
        Self { level, message }
    }

    pub fn info(message: impl Into<String>) -> Self { Self::new(Level::Info, message.into()) }

    pub fn warning(message: impl Into<String>) -> Self { Self::new(Level::Warn, message.into()) }

    #[inline] pub fn is_warning(&self) -> bool { self.level <= Level::Warn }
}

/// Everything a map widget draws.
#[derive(Clone, Debug, PartialEq)]
pub struct MapView {
    pub layers: Vec<Layer>,
    /// Municipality outlines, drawn dashed over the layers.
    pub boundary: Option<FeatureCollection>,
    /// `(lat, lon)`
    pub center: (f64, f64),
}

impl Default for MapView {
    fn default() -> Self {
        Self { layers: Vec::new(), boundary: None, center: DEFAULT_CENTER }
    }
}

/// Parcels of a region or a single municipality.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParcelMap {
    pub parcels: FeatureCollection,
    pub summary: Vec<SummaryRow>,
    pub totals: SummaryTotals,
    pub view: MapView,
    pub notices: Vec<Notice>,
}

/// Parcels of one category across many municipalities.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryMap {
    pub category: Category,
    pub parcels: FeatureCollection,
    pub succeeded: usize,
    pub total: usize,
    pub view: MapView,
    pub notices: Vec<Notice>,
}

/// Statewide parcel survey feeding the shapefile export.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySurvey {
    /// Category label, or "Todas".
    pub label: String,
    pub parcels: FeatureCollection,
    pub summary: Vec<SummaryRow>,
    pub totals: SummaryTotals,
    pub succeeded: usize,
    pub total: usize,
    pub notices: Vec<Notice>,
}

impl PropertySurvey {
    /// Write the surveyed parcels as a shapefile set named after the selection.
    pub fn export(&self, exporter: &ShapefileExporter) -> Result<PathBuf, ExportError> {
        exporter.export(&self.parcels, &self.label)
    }
}

/// Land-reform settlements, optionally narrowed to a municipality and kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettlementMap {
    /// Settlements with their tooltip fields normalized for display.
    pub settlements: FeatureCollection,
    pub stats: SettlementStats,
    pub view: MapView,
    pub notices: Vec<Notice>,
}

/// Drives the fetch client through each dashboard interaction.
///
/// Only [`FetchError`] aborts an interaction; empty results and per-source
/// failures come back as [`Notice`]s.
pub struct Dashboard<T, C = SystemClock> {
    client: TerraGeoClient<T, C>,
    tolerance: f64,
}

impl<T: Transport, C: Clock> Dashboard<T, C> {
    pub fn new(client: TerraGeoClient<T, C>) -> Self {
        let tolerance = client.config().tolerance;
        Self { client, tolerance }
    }

    #[inline] pub fn client(&mut self) -> &mut TerraGeoClient<T, C> { &mut self.client }

    /// Parcels of `municipality`, or of the whole `region` when none is given.
    ///
    /// Boundaries are the municipality's own, or every municipality of the
    /// region stitched together.
    pub fn parcel_map(&mut self, region: &str, municipality: Option<&str>) -> Result<ParcelMap, FetchError> {
        let parcels = match municipality {
            Some(m) => self.client.fetch_parcels_by_municipality(m)?,
            None => self.client.fetch_parcels_by_region(region)?,
        };
        if parcels.is_empty() {
            return Ok(ParcelMap { notices: vec![Notice::warning("Nenhuma geometria encontrada.")], ..Default::default() });
        }

        let mut notices = Vec::new();
        let boundary = match municipality {
            Some(m) => Some(self.client.fetch_boundary(m)?).filter(|fc| !fc.is_empty()),
            None => {
                let names = self.client.fetch_municipalities(region)?;
                let client = &mut self.client;
                let stitched = stitch_boundaries(&names, |n| client.fetch_boundary(n));
                notices.extend(failure_notices(&stitched.failures, BOUNDARY_FAILURE));
                stitched.boundary
            }
        };

        let parcels = simplify(parcels, self.tolerance);
        let summary = summarize(&parcels.features);
        let totals = SummaryTotals::from_rows(&summary);
        info!("[pipeline] {} parcels in {}", parcels.len(), municipality.unwrap_or(region));

        Ok(ParcelMap {
            view: MapView { layers: category_layers(&parcels), boundary, center: map_center(&parcels) },
            parcels,
            summary,
            totals,
            notices,
        })
    }

    /// Parcels of `category` across the municipalities of `region`, or of every region.
    pub fn category_map(&mut self, category: Category, region: Option<&str>) -> Result<CategoryMap, FetchError> {
        let names = match region {
            Some(r) => self.client.fetch_municipalities(r)?,
            None => self.every_municipality_by_region()?,
        };

        let predicate = Predicate::Category(category);
        let client = &mut self.client;
        let combined = combine(&names, |n| client.fetch_parcels_by_municipality(n), Some(&predicate));

        let mut notices = failure_notices(&combined.failures, "Erro ao processar");
        let Combined { collection, succeeded, total, contributors, .. } = combined;

        if collection.is_empty() {
            notices.push(Notice::warning(format!("Nenhuma propriedade encontrada para a categoria {category}")));
            return Ok(CategoryMap { category, parcels: collection, succeeded, total, view: MapView::default(), notices });
        }

        let stitched = stitch_boundaries(&contributors, |n| client.fetch_boundary(n));
        notices.extend(failure_notices(&stitched.failures, BOUNDARY_FAILURE));
        let boundary = stitched.boundary;
        let parcels = simplify(collection, self.tolerance);

        Ok(CategoryMap {
            category,
            view: MapView { layers: category_layers(&parcels), boundary, center: map_center(&parcels) },
            parcels,
            succeeded,
            total,
            notices,
        })
    }

    /// Parcels of every municipality, optionally narrowed to one category.
    pub fn property_survey(&mut self, category: Option<Category>) -> Result<PropertySurvey, FetchError> {
        let names = self.client.fetch_all_municipalities()?;
        let predicate = category.map(Predicate::Category);

        let client = &mut self.client;
        let combined = combine(&names, |n| client.fetch_parcels_by_municipality(n), predicate.as_ref());

        let mut notices = failure_notices(&combined.failures, "Erro no município");
        let Combined { collection, succeeded, total, .. } = combined;

        let label = category.map_or(ALL_CATEGORIES, Category::label).to_string();
        if collection.is_empty() {
            notices.push(Notice::warning(format!("Nenhuma propriedade encontrada em {total} municípios.")));
        } else {
            let selection = match category {
                Some(c) => format!("do tipo '{c}'"),
                None => "(todas categorias)".to_string(),
            };
            notices.push(Notice::info(format!(
                "Encontradas {} propriedades {selection} em {succeeded}/{total} municípios",
                collection.len(),
            )));
        }

        let summary = summarize(&collection.features);
        Ok(PropertySurvey {
            label,
            totals: SummaryTotals::from_rows(&summary),
            summary,
            parcels: collection,
            succeeded,
            total,
            notices,
        })
    }

    /// Settlements simplified server-side at the configured tolerance.
    pub fn settlement_map(&mut self, municipality: Option<&str>, kind: Option<SettlementKind>) -> Result<SettlementMap, FetchError> {
        let query = SettlementQuery {
            municipality: municipality.map(str::to_string),
            kind,
            tolerance: Some(self.tolerance),
            decimals: None,
        };
        let fetched = self.client.fetch_settlements(&query)?;

        let predicate = kind.map(Predicate::SettlementKind);
        let mut features = filter_features(fetched.features, predicate.as_ref());
        if features.is_empty() {
            return Ok(SettlementMap {
                notices: vec![Notice::warning("Nenhum dado disponível para os filtros selecionados.")],
                ..Default::default()
            });
        }

        let stats = settlement_stats(&features);
        features.iter_mut().for_each(normalize_settlement);
        let settlements = FeatureCollection::new(features);

        Ok(SettlementMap {
            view: MapView { layers: settlement_layers(&settlements), boundary: None, center: map_center(&settlements) },
            settlements,
            stats,
            notices: Vec::new(),
        })
    }

    /// Municipality names of every region, in region order, without repeats.
    fn every_municipality_by_region(&mut self) -> Result<Vec<String>, FetchError> {
        let mut names: Vec<String> = Vec::new();
        for region in self.client.fetch_regions()? {
            for name in self.client.fetch_municipalities(&region)? {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }
}

const BOUNDARY_FAILURE: &str = "Erro ao carregar limites de";

fn failure_notices(failures: &[SourceFailure], prefix: &str) -> Vec<Notice> {
    failures.iter()
        .map(|f| Notice::warning(format!("{prefix} {}: {}", f.name, f.error)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_carry_their_level() {
        assert!(Notice::warning("x").is_warning());
        assert!(!Notice::info("x").is_warning());
    }
}

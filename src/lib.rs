#![doc = "TerraGeo: data pipeline behind the Ceará land-property and settlement maps"]
mod common;
mod error;

pub mod category;
pub mod client;
pub mod combine;
pub mod config;
pub mod export;
pub mod feature;
pub mod filter;
pub mod pipeline;
pub mod render;
pub mod simplify;
pub mod summary;

#[doc(inline)]
pub use common::{coerce_numeric, display_value, format_hectares, NOT_AVAILABLE};

#[doc(inline)]
pub use error::{ExportError, FetchError};

#[doc(inline)]
pub use category::{Category, SettlementKind};

#[doc(inline)]
pub use client::{ManualClock, SettlementQuery, TerraGeoClient, Transport};

#[doc(inline)]
pub use config::ServiceConfig;

#[doc(inline)]
pub use feature::{Feature, FeatureCollection};

#[doc(inline)]
pub use filter::{filter_features, Predicate};

#[doc(inline)]
pub use pipeline::{Dashboard, Notice};

#[doc(inline)]
pub use export::ShapefileExporter;

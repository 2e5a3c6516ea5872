use thiserror::Error;

/// Boxed transport-level failure (connection refused, timeout, TLS, ...).
pub type TransportSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure talking to the geospatial microservice.
///
/// Fatal to the current interaction: it is surfaced to the user and never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request never produced a response.
    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: TransportSource,
    },

    /// Response with an error status other than 404.
    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Response body was not the JSON shape the endpoint promises.
    #[error("GET {url} returned malformed JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// URL of the failed request.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Decode { url, .. } => url,
        }
    }
}

/// Failure writing a shapefile export. Nothing is left in the output directory.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A geometry the single-shape-type format cannot hold.
    #[error("feature {index} has geometry type {found}; shapefile export requires Polygon/MultiPolygon")]
    Schema { index: usize, found: String },

    #[error("nothing to export: collection has no features")]
    Empty,

    #[error("invalid attribute field: {0}")]
    Field(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("attribute table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),
}

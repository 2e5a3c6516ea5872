//! Remote fetch layer: one cached call per microservice endpoint.

mod cache;
mod service;
mod transport;

pub use cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use service::{Endpoint, SettlementQuery, TerraGeoClient};
#[cfg(feature = "download")]
pub use transport::HttpTransport;
pub use transport::{Response, Transport, NOT_FOUND};

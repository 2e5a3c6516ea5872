use std::time::Duration;

use bytes::Bytes;
use log::{debug, warn};
use serde_json::Value;

use crate::category::SettlementKind;
use crate::client::cache::{Clock, SystemClock, TtlCache};
use crate::client::transport::Transport;
use crate::config::ServiceConfig;
use crate::error::FetchError;
use crate::feature::FeatureCollection;

/// Microservice endpoints the dashboards call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Regions,
    Municipalities,
    AllMunicipalities,
    ParcelsByRegion,
    ParcelsByMunicipality,
    Boundary,
    Settlements,
    SettlementMunicipalities,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::Regions => "/regioes",
            Endpoint::Municipalities => "/municipios",
            Endpoint::AllMunicipalities => "/municipios_todos",
            Endpoint::ParcelsByRegion | Endpoint::ParcelsByMunicipality => "/geojson",
            Endpoint::Boundary => "/geojson_muni",
            Endpoint::Settlements => "/geojson_assentamentos",
            Endpoint::SettlementMunicipalities => "/assentamentos_municipios",
        }
    }

    /// Client-side request timeout.
    pub const fn timeout(self) -> Duration {
        match self {
            Endpoint::ParcelsByRegion => Duration::from_secs(120),
            Endpoint::Settlements => Duration::from_secs(30),
            Endpoint::SettlementMunicipalities => Duration::from_secs(10),
            _ => Duration::from_secs(20),
        }
    }

    /// Top-level key of name-list payloads.
    const fn list_key(self) -> &'static str {
        match self {
            Endpoint::Regions => "regioes",
            _ => "municipios",
        }
    }

    /// Whether results follow the long (list) cache window rather than the geometry one.
    const fn is_long_lived(self) -> bool {
        matches!(
            self,
            Endpoint::Regions | Endpoint::Municipalities | Endpoint::AllMunicipalities
                | Endpoint::Boundary | Endpoint::SettlementMunicipalities
        )
    }
}

/// Parameters of `/geojson_assentamentos`; absent fields are left out of the query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettlementQuery {
    pub municipality: Option<String>,
    pub kind: Option<SettlementKind>,
    pub tolerance: Option<f64>,
    pub decimals: Option<u32>,
}

impl SettlementQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(m) = &self.municipality { params.push(("municipio", m.clone())) }
        if let Some(k) = self.kind { params.push(("tipo", k.value().to_string())) }
        if let Some(t) = self.tolerance { params.push(("tolerance", t.to_string())) }
        if let Some(d) = self.decimals { params.push(("decimals", d.to_string())) }
        params
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    endpoint: Endpoint,
    params: Vec<(&'static str, String)>,
}

/// Cached client for the geospatial microservice.
///
/// 404 responses come back as empty results. Every other failure is a
/// [`FetchError`]; failures are never cached and never retried.
pub struct TerraGeoClient<T, C = SystemClock> {
    transport: T,
    clock: C,
    config: ServiceConfig,
    names: TtlCache<CacheKey, Vec<String>>,
    collections: TtlCache<CacheKey, FeatureCollection>,
}

impl<T: Transport> TerraGeoClient<T, SystemClock> {
    pub fn new(transport: T, config: ServiceConfig) -> Self {
        Self::with_clock(transport, config, SystemClock)
    }
}

impl<T: Transport, C: Clock> TerraGeoClient<T, C> {
    pub fn with_clock(transport: T, config: ServiceConfig, clock: C) -> Self {
        Self { transport, clock, config, names: TtlCache::new(), collections: TtlCache::new() }
    }

    #[inline] pub fn config(&self) -> &ServiceConfig { &self.config }


    /// `GET /regioes`
    pub fn fetch_regions(&mut self) -> Result<Vec<String>, FetchError> {
        self.fetch_names(Endpoint::Regions, Vec::new())
    }

    /// `GET /municipios?regiao=...`
    pub fn fetch_municipalities(&mut self, region: &str) -> Result<Vec<String>, FetchError> {
        self.fetch_names(Endpoint::Municipalities, vec![("regiao", region.to_string())])
    }

    /// `GET /municipios_todos`
    pub fn fetch_all_municipalities(&mut self) -> Result<Vec<String>, FetchError> {
        self.fetch_names(Endpoint::AllMunicipalities, Vec::new())
    }

    /// `GET /assentamentos_municipios`
    pub fn fetch_settlement_municipalities(&mut self) -> Result<Vec<String>, FetchError> {
        self.fetch_names(Endpoint::SettlementMunicipalities, Vec::new())
    }

    /// `GET /geojson?regiao=...`
    pub fn fetch_parcels_by_region(&mut self, region: &str) -> Result<FeatureCollection, FetchError> {
        self.fetch_collection(Endpoint::ParcelsByRegion, vec![("regiao", region.to_string())])
    }

    /// `GET /geojson?municipio=...`
    pub fn fetch_parcels_by_municipality(&mut self, municipality: &str) -> Result<FeatureCollection, FetchError> {
        self.fetch_collection(Endpoint::ParcelsByMunicipality, vec![("municipio", municipality.to_string())])
    }

    /// `GET /geojson_muni?municipio=...` (administrative boundary)
    pub fn fetch_boundary(&mut self, municipality: &str) -> Result<FeatureCollection, FetchError> {
        self.fetch_collection(Endpoint::Boundary, vec![("municipio", municipality.to_string())])
    }

    /// `GET /geojson_assentamentos`
    pub fn fetch_settlements(&mut self, query: &SettlementQuery) -> Result<FeatureCollection, FetchError> {
        self.fetch_collection(Endpoint::Settlements, query.params())
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.config.base_url, endpoint.path())
    }

    fn ttl(&self, endpoint: Endpoint) -> Duration {
        if endpoint.is_long_lived() { self.config.list_ttl } else { self.config.geometry_ttl }
    }

    /// Issue the request; `Ok(None)` means the service answered 404.
    fn request(&self, endpoint: Endpoint, params: &[(&'static str, String)]) -> Result<Option<Bytes>, FetchError> {
        let url = self.url(endpoint);
        debug!("[client] GET {url} {params:?}");

        let resp = self.transport.get(&url, params, endpoint.timeout())?;
        if resp.is_not_found() {
            warn!("[client] GET {url} {params:?} returned 404; treating as empty");
            return Ok(None);
        }
        if !resp.is_success() {
            return Err(FetchError::Status { url, status: resp.status });
        }
        Ok(Some(resp.body))
    }

    fn fetch_names(&mut self, endpoint: Endpoint, params: Vec<(&'static str, String)>) -> Result<Vec<String>, FetchError> {
        let key = CacheKey { endpoint, params };
        if let Some(hit) = self.names.get(&key, self.clock.now()) {
            debug!("[client] cache hit {} {:?}", endpoint.path(), key.params);
            return Ok(hit);
        }

        let names = match self.request(endpoint, &key.params)? {
            None => Vec::new(),
            Some(body) => parse_names(&body, endpoint.list_key())
                .map_err(|source| FetchError::Decode { url: self.url(endpoint), source })?,
        };

        let ttl = self.ttl(endpoint);
        self.names.insert(key, names.clone(), self.clock.now(), ttl);
        Ok(names)
    }

    fn fetch_collection(&mut self, endpoint: Endpoint, params: Vec<(&'static str, String)>) -> Result<FeatureCollection, FetchError> {
        let key = CacheKey { endpoint, params };
        if let Some(hit) = self.collections.get(&key, self.clock.now()) {
            debug!("[client] cache hit {} {:?}", endpoint.path(), key.params);
            return Ok(hit);
        }

        let collection = match self.request(endpoint, &key.params)? {
            None => FeatureCollection::default(),
            Some(body) => serde_json::from_slice(&body)
                .map_err(|source| FetchError::Decode { url: self.url(endpoint), source })?,
        };
        debug!("[client] {} {:?} -> {} features", endpoint.path(), key.params, collection.len());

        let ttl = self.ttl(endpoint);
        self.collections.insert(key, collection.clone(), self.clock.now(), ttl);
        Ok(collection)
    }
}

/// Read `{<key>: [string, ...]}`; a missing or null key is an empty list.
fn parse_names(body: &[u8], key: &str) -> serde_json::Result<Vec<String>> {
    let mut value: Value = serde_json::from_slice(body)?;
    match value.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(list) => serde_json::from_value(list),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::client::cache::ManualClock;
    use crate::client::transport::Response;

    /// Canned responses keyed by path, recording every request.
    #[derive(Default)]
    struct FakeTransport {
        routes: Vec<(&'static str, Response)>,
        calls: RefCell<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeTransport {
        fn route(mut self, path: &'static str, status: u16, body: &'static str) -> Self {
            self.routes.push((path, Response::new(status, body)));
            self
        }

        fn calls(&self) -> usize { self.calls.borrow().len() }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &str, query: &[(&str, String)], _timeout: Duration) -> Result<Response, FetchError> {
            self.calls.borrow_mut().push((
                url.to_string(),
                query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            self.routes.iter()
                .find(|(path, _)| url.ends_with(path))
                .map(|(_, resp)| resp.clone())
                .ok_or_else(|| FetchError::Transport { url: url.to_string(), source: "connection refused".into() })
        }
    }

    fn client<'a>(transport: &'a FakeTransport, clock: &'a ManualClock) -> TerraGeoClient<&'a FakeTransport, &'a ManualClock> {
        TerraGeoClient::with_clock(transport, ServiceConfig::default(), clock)
    }

    #[test]
    fn municipalities_404_is_empty_list() {
        let transport = FakeTransport::default().route("/municipios", 404, "");
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);
        assert_eq!(client.fetch_municipalities("X").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn server_error_is_fetch_error() {
        let transport = FakeTransport::default().route("/regioes", 500, "boom");
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);
        let err = client.fetch_regions().unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
        assert_eq!(err.url(), "http://127.0.0.1:8000/regioes");
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let transport = FakeTransport::default().route("/geojson", 200, "<html>");
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);
        assert!(matches!(client.fetch_parcels_by_municipality("Crato"), Err(FetchError::Decode { .. })));
    }

    #[test]
    fn repeated_call_within_ttl_hits_cache() {
        let transport = FakeTransport::default().route("/regioes", 200, r#"{"regioes": ["Cariri", "Litoral Leste"]}"#);
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);

        let first = client.fetch_regions().unwrap();
        clock.advance(Duration::from_secs(59 * 60));
        let second = client.fetch_regions().unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);

        clock.advance(Duration::from_secs(2 * 60));
        client.fetch_regions().unwrap();
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn cache_is_keyed_by_arguments() {
        let transport = FakeTransport::default().route("/geojson", 200, r#"{"type": "FeatureCollection", "features": []}"#);
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);

        client.fetch_parcels_by_municipality("Crato").unwrap();
        client.fetch_parcels_by_municipality("Juazeiro do Norte").unwrap();
        client.fetch_parcels_by_municipality("Crato").unwrap();
        client.fetch_parcels_by_region("Cariri").unwrap();
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn geometry_expires_before_lists() {
        let transport = FakeTransport::default()
            .route("/geojson", 200, r#"{"type": "FeatureCollection", "features": []}"#)
            .route("/municipios_todos", 200, r#"{"municipios": ["Crato"]}"#);
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);

        client.fetch_parcels_by_region("Cariri").unwrap();
        client.fetch_all_municipalities().unwrap();
        clock.advance(Duration::from_secs(6 * 60));
        client.fetch_parcels_by_region("Cariri").unwrap();
        client.fetch_all_municipalities().unwrap();
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let transport = FakeTransport::default();
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);
        assert!(client.fetch_boundary("Crato").is_err());
        assert!(client.fetch_boundary("Crato").is_err());
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn settlement_query_omits_absent_parameters() {
        let transport = FakeTransport::default().route("/geojson_assentamentos", 404, "");
        let clock = ManualClock::new();
        let mut client = client(&transport, &clock);

        let fc = client.fetch_settlements(&SettlementQuery {
            municipality: Some("Canindé".into()),
            kind: Some(SettlementKind::Federal),
            tolerance: Some(0.001),
            decimals: None,
        }).unwrap();
        assert!(fc.is_empty());

        let calls = transport.calls.borrow();
        let params: Vec<_> = calls[0].1.iter().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(params, vec!["municipio=Canindé", "tipo=federal", "tolerance=0.001"]);
    }

    #[test]
    fn name_list_tolerates_missing_key() {
        assert_eq!(parse_names(br#"{}"#, "municipios").unwrap(), Vec::<String>::new());
        assert_eq!(parse_names(br#"{"municipios": null}"#, "municipios").unwrap(), Vec::<String>::new());
        assert!(parse_names(br#"{"municipios": [1, 2]}"#, "municipios").is_err());
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// EPSG code of WGS84 longitude/latitude, the CRS every service payload uses.
pub const WGS84_EPSG: u32 = 4326;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// One parcel, settlement or boundary.
///
/// The geometry stays as raw GeoJSON; it is parsed into `geo` types only by the
/// stages that need coordinates (simplifier, exporter, renderer).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    tag: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Construct a feature from a raw GeoJSON geometry and its properties.
    pub fn new(geometry: Option<Value>, properties: Map<String, Value>) -> Self {
        Self { tag: FeatureTag::Feature, id: None, geometry, properties }
    }

    /// Get a property value; absent keys and explicit nulls are both `None`.
    #[inline]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key).filter(|v| !v.is_null())
    }

    /// Get a property as a string slice, if it is a JSON string.
    #[inline]
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(Value::as_str)
    }
}

/// `{type: "FeatureCollection", features: [...]}`, the unit of exchange between stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    tag: CollectionTag,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<Feature>,
    #[serde(skip)]
    epsg: Option<u32>,
}

impl FeatureCollection {
    /// Construct a collection from a list of features (no CRS tag).
    pub fn new(features: Vec<Feature>) -> Self {
        Self { tag: CollectionTag::FeatureCollection, features, epsg: None }
    }

    /// Get the number of features.
    #[inline] pub fn len(&self) -> usize { self.features.len() }

    /// Check if there are no features.
    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    /// Get the EPSG code this collection was tagged with, if any.
    #[inline] pub fn epsg(&self) -> Option<u32> { self.epsg }

    /// Tag the collection with an EPSG code.
    #[inline] pub fn set_epsg(&mut self, epsg: u32) { self.epsg = Some(epsg) }

    /// Append all features of `other`.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Feature>) {
        self.features.extend(other);
    }

    /// Parse a collection from a JSON value, as returned by the service.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// Serialize back to a GeoJSON value.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter { self.features.into_iter() }
}

/// Deserialize `null` (or a missing key, via `#[serde(default)]`) as the default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

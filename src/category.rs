//! Property-size categories and settlement kinds, with their display colors.

use std::fmt;
use std::str::FromStr;

use crate::feature::Feature;

/// Property key holding the size classification.
pub const CATEGORY_KEY: &str = "categoria";

/// Property key holding the settlement kind.
pub const SETTLEMENT_KIND_KEY: &str = "tipo_assentamento";

/// Selector value meaning "every category".
pub const ALL_CATEGORIES: &str = "Todas";

/// Simple RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self { Self { r, g, b } }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 { return None }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }

    /// Format as `#rrggbb`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Property-size classification in fiscal modules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    SmallUnderOneModule,
    Small,
    Medium,
    Large,
    Unclassified,
}

impl Category {
    /// All categories in enumeration (legend) order.
    pub const ALL: [Category; 5] = [
        Category::SmallUnderOneModule,
        Category::Small,
        Category::Medium,
        Category::Large,
        Category::Unclassified,
    ];

    /// Label as stored in the `categoria` property.
    pub const fn label(self) -> &'static str {
        match self {
            Category::SmallUnderOneModule => "Pequena Propriedade < 1 MF",
            Category::Small => "Pequena Propriedade",
            Category::Medium => "Média Propriedade",
            Category::Large => "Grande Propriedade",
            Category::Unclassified => "Sem Classificação",
        }
    }

    /// Display color.
    pub const fn color(self) -> Rgb {
        match self {
            Category::SmallUnderOneModule => Rgb::new(0xfe, 0xcc, 0x5c),
            Category::Small => Rgb::new(0xfd, 0x8d, 0x3c),
            Category::Medium => Rgb::new(0xf0, 0x3b, 0x20),
            Category::Large => Rgb::new(0xbd, 0x00, 0x26),
            Category::Unclassified => Rgb::new(0xee, 0xee, 0xe4),
        }
    }

    /// Position in the enumeration, used to break ties.
    #[inline] pub fn rank(self) -> usize { self as usize }

    /// Exact, case-sensitive lookup of a `categoria` value.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Classify a feature, falling back to [`Category::Unclassified`] for
    /// missing, non-string or unrecognized values.
    pub fn of_feature(feature: &Feature) -> Category {
        feature.property_str(CATEGORY_KEY)
            .and_then(Category::from_label)
            .unwrap_or(Category::Unclassified)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_label(s).ok_or_else(|| {
            let known = Category::ALL.iter().map(|c| c.label()).collect::<Vec<_>>().join(", ");
            format!("unknown category {s:?} (expected one of: {known})")
        })
    }
}

/// Land-reform settlement jurisdiction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettlementKind {
    State,
    Federal,
}

impl SettlementKind {
    pub const ALL: [SettlementKind; 2] = [SettlementKind::State, SettlementKind::Federal];

    /// Value as stored in `tipo_assentamento` (lowercase).
    pub const fn value(self) -> &'static str {
        match self {
            SettlementKind::State => "estadual",
            SettlementKind::Federal => "federal",
        }
    }

    /// Capitalized legend label.
    pub const fn label(self) -> &'static str {
        match self {
            SettlementKind::State => "Estadual",
            SettlementKind::Federal => "Federal",
        }
    }

    pub const fn color(self) -> Rgb {
        match self {
            SettlementKind::State => Rgb::new(0xff, 0x7f, 0x0e),
            SettlementKind::Federal => Rgb::new(0x1f, 0x77, 0xb4),
        }
    }

    /// Case-insensitive match against a `tipo_assentamento` value.
    pub fn matches(self, value: &str) -> bool {
        value.trim().eq_ignore_ascii_case(self.value())
    }

    pub fn parse(value: &str) -> Option<SettlementKind> {
        SettlementKind::ALL.into_iter().find(|k| k.matches(value))
    }
}

impl fmt::Display for SettlementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for SettlementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettlementKind::parse(s).ok_or_else(|| format!("unknown settlement kind {s:?} (expected estadual or federal)"))
    }
}

/// Fill for a settlement; unknown kinds share the state-level color.
pub fn settlement_color(value: Option<&str>) -> Rgb {
    value.and_then(SettlementKind::parse)
        .unwrap_or(SettlementKind::State)
        .color()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn feature_with(category: Option<serde_json::Value>) -> Feature {
        let mut props = Map::new();
        if let Some(v) = category { props.insert(CATEGORY_KEY.into(), v); }
        Feature::new(None, props)
    }

    #[test]
    fn labels_round_trip_case_sensitively() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
        assert_eq!(Category::from_label("grande propriedade"), None);
        assert!("Média Propriedade".parse::<Category>().is_ok());
        assert!("Todas".parse::<Category>().is_err());
    }

    #[test]
    fn enumeration_order_drives_rank() {
        let ranks: Vec<_> = Category::ALL.iter().map(|c| c.rank()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn features_fall_back_to_unclassified() {
        assert_eq!(Category::of_feature(&feature_with(Some(json!("Grande Propriedade")))), Category::Large);
        assert_eq!(Category::of_feature(&feature_with(Some(json!("Latifúndio")))), Category::Unclassified);
        assert_eq!(Category::of_feature(&feature_with(Some(json!(3)))), Category::Unclassified);
        assert_eq!(Category::of_feature(&feature_with(None)), Category::Unclassified);
    }

    #[test]
    fn colors_render_as_hex() {
        assert_eq!(Category::Large.color().hex(), "#bd0026");
        assert_eq!(Rgb::from_hex("#fecc5c"), Some(Category::SmallUnderOneModule.color()));
        assert_eq!(Rgb::from_hex("fecc5c"), None);
        assert_eq!(Category::Medium.color().to_string(), "rgb(240,59,32)");
    }

    #[test]
    fn settlement_kind_is_case_insensitive() {
        assert!(SettlementKind::Federal.matches("FEDERAL"));
        assert!(SettlementKind::State.matches("Estadual"));
        assert_eq!("federal".parse::<SettlementKind>(), Ok(SettlementKind::Federal));
        assert_eq!(settlement_color(Some("Federal")).hex(), "#1f77b4");
        assert_eq!(settlement_color(Some("outros")).hex(), "#ff7f0e");
        assert_eq!(settlement_color(None).hex(), "#ff7f0e");
    }
}

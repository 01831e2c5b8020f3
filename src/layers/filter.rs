//! Land-category filtering
//!
//! Filter ids are stable ASCII identifiers (`government`, `guthi`, ...). Parcel
//! datasets store the category as a Nepali label under a property key that
//! differs per dataset generation. This module owns the mapping between the
//! two, the colour table the parcel fill layers use, and the pure resolver that
//! narrows a raw feature collection to one category.

use crate::core::constants::UNKNOWN_OWNERSHIP_COLOR;
use crate::data::geojson::FeatureCollection;
use crate::layers::region::RegionId;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Parcel dataset vintage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    /// 2016 acquisition notice
    Notice2016,
    /// 2019 acquisition notice
    Notice2019,
}

impl Generation {
    /// Prefix shared by every property key of this generation
    pub fn property_prefix(&self) -> &'static str {
        match self {
            Generation::Notice2016 => "fasttract_connected_Final with connect — Sheet1_",
            Generation::Notice2019 => "Copy of Final_with_connect — Sheet4_",
        }
    }

    /// Property carrying the ownership-category label
    pub fn category_property(&self) -> String {
        format!("{}जग्गाधनी", self.property_prefix())
    }

    /// Property carrying the acquisition notice reference
    pub fn notice_property(&self) -> &'static str {
        match self {
            // The notice column was joined in from a different workbook than the other 2016 fields.
            Generation::Notice2016 => "Copy of Final_with_connect — Sheet1_Land acquisition notice",
            Generation::Notice2019 => "Copy of Final_with_connect — Sheet4_Land acquisition notice",
        }
    }
}

/// Ownership category filter id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Government,
    Guthi,
    NonNewar,
    MixedNonNewar,
    Newar,
    MixedNewar,
    Institutional,
    Community,
}

impl CategoryId {
    pub const ALL: [CategoryId; 8] = [
        CategoryId::Government,
        CategoryId::Guthi,
        CategoryId::NonNewar,
        CategoryId::MixedNonNewar,
        CategoryId::Newar,
        CategoryId::MixedNewar,
        CategoryId::Institutional,
        CategoryId::Community,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Government => "government",
            CategoryId::Guthi => "guthi",
            CategoryId::NonNewar => "non_newar",
            CategoryId::MixedNonNewar => "mixed_non_newar",
            CategoryId::Newar => "newar",
            CategoryId::MixedNewar => "mixed_newar",
            CategoryId::Institutional => "institutional",
            CategoryId::Community => "community",
        }
    }

    /// English name shown in filter menus and legends
    pub fn display_name(&self) -> &'static str {
        match self {
            CategoryId::Government => "Government",
            CategoryId::Guthi => "Guthi",
            CategoryId::NonNewar => "Non-Newar",
            CategoryId::MixedNonNewar => "Joint Non-Newar",
            CategoryId::Newar => "Newar",
            CategoryId::MixedNewar => "Joint Newar",
            CategoryId::Institutional => "Institutional",
            CategoryId::Community => "Communal",
        }
    }

    /// Label stored in the source data. Both generations share one vocabulary.
    pub fn raw_label(&self, _generation: Generation) -> &'static str {
        match self {
            CategoryId::Government => "सरकारी",
            CategoryId::Guthi => "गुठी",
            CategoryId::NonNewar => "गैर–नेवाः",
            CategoryId::MixedNonNewar => "गैर–नेवाः÷संयुक्त",
            CategoryId::Newar => "नेवाः",
            CategoryId::MixedNewar => "नेवाः÷संयुक्त",
            CategoryId::Institutional => "संस्थागत",
            CategoryId::Community => "सामुदायिक",
        }
    }

    /// Reverse lookup from a raw data label
    pub fn from_raw_label(label: &str, generation: Generation) -> Option<CategoryId> {
        Self::ALL
            .into_iter()
            .find(|c| c.raw_label(generation) == label)
    }

    pub fn fill_color(&self) -> &'static str {
        match self {
            CategoryId::Government => "#32cd32",
            CategoryId::Guthi => "#ff0000",
            CategoryId::NonNewar => "#0000ff",
            CategoryId::MixedNonNewar => "#87cefa",
            CategoryId::Newar => "#ffd700",
            CategoryId::MixedNewar => "#f0e68c",
            CategoryId::Institutional => "#9C27B0",
            CategoryId::Community => "#795548",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnmappedCategory(s.to_string()))
    }
}

/// A filter selection; `None` means "no filter" for that dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    pub cadastral_map: Option<RegionId>,
    pub land_category: Option<CategoryId>,
}

impl FilterSelection {
    /// Parses the string ids a filter form submits, where an empty string means none.
    ///
    /// Unknown ids are errors, never "no filter".
    pub fn from_ids(cadastral_map: &str, land_category: &str) -> Result<Self> {
        Ok(Self {
            cadastral_map: parse_optional(cadastral_map)?,
            land_category: parse_optional(land_category)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.cadastral_map.is_none() && self.land_category.is_none()
    }
}

fn parse_optional<T: FromStr<Err = Error>>(raw: &str) -> Result<Option<T>> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

/// Narrows `raw` to the selected land category.
///
/// With no category selected the input is returned unchanged. Otherwise only
/// features whose category property equals the category's raw label are kept;
/// features missing the property never match.
pub fn resolve(
    selection: &FilterSelection,
    raw: &FeatureCollection,
    generation: Generation,
) -> FeatureCollection {
    let Some(category) = selection.land_category else {
        return raw.clone();
    };
    let property = generation.category_property();
    let label = category.raw_label(generation);
    raw.filtered(|feature| feature.property_str(&property) == Some(label))
}

/// `fill-color` expression colouring parcels by category label
pub fn fill_color_expression(generation: Generation) -> Value {
    let mut expression = vec![json!("match"), json!(["get", generation.category_property()])];
    for category in CategoryId::ALL {
        expression.push(json!(category.raw_label(generation)));
        expression.push(json!(category.fill_color()));
    }
    expression.push(json!(UNKNOWN_OWNERSHIP_COLOR));
    Value::Array(expression)
}

/// Category labels present in `raw` that fall through to the catch-all colour
pub fn unmapped_labels(raw: &FeatureCollection, generation: Generation) -> BTreeSet<String> {
    let property = generation.category_property();
    raw.features
        .iter()
        .filter_map(|f| f.property_str(&property))
        .filter(|label| CategoryId::from_raw_label(label, generation).is_none())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geojson::GeoJsonFeature;

    fn parcels(generation: Generation, labels: &[&str]) -> FeatureCollection {
        let property = generation.category_property();
        FeatureCollection::new(
            labels
                .iter()
                .map(|label| GeoJsonFeature::with_properties([(property.as_str(), *label)]))
                .collect(),
        )
    }

    #[test]
    fn test_empty_selection_is_identity() {
        let raw = parcels(Generation::Notice2016, &["सरकारी", "गुठी", "unknown"]);
        let resolved = resolve(&FilterSelection::default(), &raw, Generation::Notice2016);
        assert_eq!(resolved, raw);
    }

    #[test]
    fn test_guthi_keeps_exactly_matching_features() {
        let raw = parcels(Generation::Notice2016, &["सरकारी", "गुठी", "गुठी"]);
        let selection = FilterSelection {
            cadastral_map: None,
            land_category: Some(CategoryId::Guthi),
        };

        let resolved = resolve(&selection, &raw, Generation::Notice2016);
        assert_eq!(resolved.len(), 2);
        assert!(resolved
            .features
            .iter()
            .all(|f| f.property_str(&Generation::Notice2016.category_property()) == Some("गुठी")));
    }

    #[test]
    fn test_generation_property_key_is_honoured() {
        // Labelled under the 2016 key, so nothing matches when read as 2019 data.
        let raw = parcels(Generation::Notice2016, &["गुठी"]);
        let selection = FilterSelection {
            cadastral_map: None,
            land_category: Some(CategoryId::Guthi),
        };
        assert!(resolve(&selection, &raw, Generation::Notice2019).is_empty());
        assert_eq!(
            resolve(&selection, &parcels(Generation::Notice2019, &["गुठी"]), Generation::Notice2019)
                .len(),
            1
        );
    }

    #[test]
    fn test_features_without_property_are_excluded() {
        let mut raw = parcels(Generation::Notice2019, &["संस्थागत"]);
        raw.features.push(GeoJsonFeature::with_properties(Vec::<(&str, &str)>::new()));
        raw.features.push(GeoJsonFeature {
            id: None,
            geometry: None,
            properties: None,
        });
        let selection = FilterSelection {
            cadastral_map: None,
            land_category: Some(CategoryId::Institutional),
        };
        assert_eq!(resolve(&selection, &raw, Generation::Notice2019).len(), 1);
    }

    #[test]
    fn test_unknown_category_id_is_an_error() {
        let err = "temple".parse::<CategoryId>().unwrap_err();
        assert!(matches!(err, Error::UnmappedCategory(ref id) if id == "temple"));

        assert!(FilterSelection::from_ids("", "temple").is_err());
        let selection = FilterSelection::from_ids("", "").unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_ids_and_labels_round_trip() {
        for category in CategoryId::ALL {
            assert_eq!(category.as_str().parse::<CategoryId>().unwrap(), category);
            for generation in [Generation::Notice2016, Generation::Notice2019] {
                assert_eq!(
                    CategoryId::from_raw_label(category.raw_label(generation), generation),
                    Some(category)
                );
            }
        }
    }

    #[test]
    fn test_fill_color_expression_shape() {
        let expression = fill_color_expression(Generation::Notice2019);
        let items = expression.as_array().unwrap();
        // "match", input, 8 label/colour pairs, fallback
        assert_eq!(items.len(), 2 + 16 + 1);
        assert_eq!(items[0], "match");
        assert_eq!(items[1][1], Generation::Notice2019.category_property());
        assert_eq!(items.last().unwrap(), UNKNOWN_OWNERSHIP_COLOR);
    }

    #[test]
    fn test_unmapped_labels_reported() {
        let raw = parcels(Generation::Notice2016, &["गुठी", "अज्ञात", "अज्ञात", "मठ"]);
        let unmapped = unmapped_labels(&raw, Generation::Notice2016);
        assert_eq!(unmapped.into_iter().collect::<Vec<_>>(), vec!["अज्ञात", "मठ"]);
    }
}

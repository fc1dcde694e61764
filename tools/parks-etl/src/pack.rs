use geojson::{Feature, JsonObject, JsonValue};
use hashbrown::HashMap;

pub const NAME_KEY: &str = "name";
pub const COUNTRY_KEY: &str = "country";
pub const PACKED_KEY: &str = "properties";

/// Rewrites a feature's attributes into the shape the map popup reads:
/// `name` and `country` as plain attributes, every other attribute (country
/// included) JSON-encoded under `properties`.
///
/// Null attributes are dropped. Returns `None` for features without geometry.
pub fn pack_feature(
    feature: Feature,
    renames: &HashMap<String, String>,
    fallback_country: Option<&str>,
) -> Option<Feature> {
    let geometry = feature.geometry?;

    let mut name = None;
    let mut attributes = JsonObject::new();
    for (key, value) in feature.properties.unwrap_or_default() {
        if value.is_null() {
            continue;
        }
        // keys without a rename entry are the dropped `fid` column
        let Some(column) = renames.get(&key) else {
            continue;
        };
        if column == NAME_KEY {
            name = Some(value);
        } else {
            attributes.insert(column.clone(), value);
        }
    }

    if !attributes.contains_key(COUNTRY_KEY) {
        if let Some(country) = fallback_country {
            attributes.insert(COUNTRY_KEY.to_string(), JsonValue::from(country));
        }
    }

    let country = attributes.get(COUNTRY_KEY).cloned();

    let mut properties = JsonObject::new();
    if let Some(name) = name {
        properties.insert(NAME_KEY.to_string(), name);
    }
    if let Some(country) = country {
        properties.insert(COUNTRY_KEY.to_string(), country);
    }
    properties.insert(
        PACKED_KEY.to_string(),
        JsonValue::String(JsonValue::Object(attributes).to_string()),
    );

    Some(Feature {
        bbox: feature.bbox,
        geometry: Some(geometry),
        id: feature.id,
        properties: Some(properties),
        foreign_members: None,
    })
}

use geojson::Feature;
use hashbrown::{HashMap, HashSet};

/// Attribute dropped before packing; it is a row number from the source file.
pub const DROPPED_COLUMN: &str = "fid";

/// Lowercase, `:` to `_`, spaces removed. `addr:City Name` -> `addr_cityname`.
pub fn normalize_column(name: &str) -> String {
    name.to_lowercase().replace(':', "_").replace(' ', "")
}

/// Maps every raw attribute name to a unique normalized name.
///
/// Columns are visited in first-appearance order. When a normalized name is
/// already taken the column becomes `<name>_1`, `<name>_2`, ... using the
/// first free suffix.
pub fn rename_duplicated_columns<'a>(columns: impl IntoIterator<Item = &'a str>) -> HashMap<String, String> {
    let mut seen = HashSet::new();
    let mut renames = HashMap::new();

    for column in columns {
        if column == DROPPED_COLUMN || renames.contains_key(column) {
            continue;
        }

        let base = normalize_column(column);
        let mut new_column = base.clone();
        let mut count = 1;
        while seen.contains(&new_column) {
            new_column = format!("{base}_{count}");
            count += 1;
        }

        if new_column != column {
            log::debug!("Renaming column {column:?} -> {new_column:?}");
        }
        seen.insert(new_column.clone());
        renames.insert(column.to_owned(), new_column);
    }

    renames
}

/// Attribute names across all features, in the order they first appear.
pub fn collect_columns(features: &[Feature]) -> Vec<&str> {
    let mut seen = HashSet::new();
    features
        .iter()
        .filter_map(|feature| feature.properties.as_ref())
        .flat_map(|properties| properties.keys())
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column("Name"), "name");
        assert_eq!(normalize_column("name:en"), "name_en");
        assert_eq!(normalize_column("Protect Class"), "protectclass");
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let renames = rename_duplicated_columns(["name", "Name", "NAME", "name_1", "fid"]);

        assert_eq!(renames["name"], "name");
        assert_eq!(renames["Name"], "name_1");
        assert_eq!(renames["NAME"], "name_2");
        // the literal name_1 is taken by the renamed "Name"
        assert_eq!(renames["name_1"], "name_1_1");
        assert!(!renames.contains_key("fid"));
    }

    #[test]
    fn test_collect_columns_first_appearance() {
        let features: Vec<Feature> = [
            r#"{"type":"Feature","geometry":null,"properties":{"b":1,"a":2}}"#,
            r#"{"type":"Feature","geometry":null,"properties":{"c":1,"a":2}}"#,
            r#"{"type":"Feature","geometry":null,"properties":null}"#,
        ]
        .iter()
        .map(|json| serde_json::from_str(json).unwrap())
        .collect();

        assert_eq!(collect_columns(&features), ["b", "a", "c"]);
    }
}

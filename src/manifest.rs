use crate::config::INDEX_PREFIX;
use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One entry of the icon metadata index
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Icon {
    pub name: String,
    pub version: u32,
    /// Ordered; the first entry is the primary category
    #[serde(default)]
    pub categories: Vec<String>,
    /// Families this icon is not drawn for
    #[serde(default)]
    pub unsupported_families: Vec<String>,
}

impl Icon {
    pub fn primary_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("")
    }

    pub fn supports(&self, family: &str) -> bool {
        !self.unsupported_families.iter().any(|f| f == family)
    }
}

/// The parsed metadata index
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Index {
    #[serde(default)]
    pub icons: Vec<Icon>,
    #[serde(default)]
    pub families: Vec<String>,
}

/// Icons sharing a primary category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub icons: Vec<Icon>,
}

/// Parse the raw index response
pub fn load_index(raw: &[u8]) -> Result<Index> {
    let body = raw.strip_prefix(INDEX_PREFIX.as_bytes()).unwrap_or(raw);
    Ok(serde_json::from_slice(body)?)
}

/// Group icons by primary category, sorted by category name
pub fn build_categories(icons: &[Icon]) -> Vec<Category> {
    let mut groups: BTreeMap<&str, Vec<Icon>> = BTreeMap::new();

    for icon in icons {
        groups
            .entry(icon.primary_category())
            .or_default()
            .push(icon.clone());
    }

    groups
        .into_iter()
        .map(|(name, icons)| Category {
            name: name.to_string(),
            icons,
        })
        .collect()
}

/// Turn a category key into a section title (`"file_download"` -> `"File download"`)
pub fn humanize(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let spaced = spaced.trim_start();
    let lower = spaced.strip_suffix(" id").unwrap_or(spaced).to_lowercase();

    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon(name: &str, categories: &[&str]) -> Icon {
        Icon {
            name: name.to_string(),
            version: 1,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            unsupported_families: Vec::new(),
        }
    }

    #[test]
    fn test_load_index_strips_prefix() {
        let raw = b")]}'\n{\"host\":\"fonts.gstatic.com\",\"families\":[\"Material Icons\",\"Material Icons Outlined\"],\"icons\":[{\"name\":\"search\",\"version\":12,\"popularity\":100,\"categories\":[\"action\"],\"unsupported_families\":[\"Material Icons Outlined\"]}]}";
        let index = load_index(raw).unwrap();

        assert_eq!(index.families, vec!["Material Icons", "Material Icons Outlined"]);
        assert_eq!(index.icons.len(), 1);
        assert_eq!(index.icons[0].name, "search");
        assert_eq!(index.icons[0].version, 12);
        assert!(index.icons[0].supports("Material Icons"));
        assert!(!index.icons[0].supports("Material Icons Outlined"));
    }

    #[test]
    fn test_load_index_without_prefix_and_defaults() {
        let index = load_index(br#"{"families":["A"],"icons":[{"name":"x","version":3}]}"#).unwrap();
        assert!(index.icons[0].categories.is_empty());
        assert!(index.icons[0].unsupported_families.is_empty());
        assert_eq!(index.icons[0].primary_category(), "");
    }

    #[test]
    fn test_load_index_rejects_garbage() {
        assert!(load_index(b")]}'\n<html>").is_err());
    }

    #[test]
    fn test_build_categories_groups_and_sorts() {
        let icons = vec![
            icon("zoom_in", &["action"]),
            icon("alarm", &["device", "action"]),
            icon("abc", &["action"]),
            icon("orphan", &[]),
        ];
        let categories = build_categories(&icons);

        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["", "action", "device"]);

        let action: Vec<_> = categories[1].icons.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(action, vec!["zoom_in", "abc"]);
        assert_eq!(categories[0].icons[0].name, "orphan");
        assert_eq!(categories[2].icons[0].name, "alarm");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("action"), "Action");
        assert_eq!(humanize("file_download"), "File download");
        assert_eq!(humanize("AV"), "Av");
        assert_eq!(humanize("author_id"), "Author");
        assert_eq!(humanize(""), "");
        assert_eq!(humanize("_id"), "Id");
        assert_eq!(humanize("__layers"), "Layers");
    }
}

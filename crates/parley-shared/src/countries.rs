//! Country records for the phone form.
//!
//! [`Country`] mirrors the shape returned by the public REST countries
//! directory so a fetched payload deserializes directly; [`DialOption`] is
//! the flattened entry the login form actually needs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryName {
    pub common: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Idd {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub suffixes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flags {
    #[serde(default)]
    pub svg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Country {
    pub name: CountryName,
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub idd: Idd,
    #[serde(default)]
    pub flags: Flags,
}

impl Country {
    fn new(name: &str, cca2: &str, root: &str, flag: &str) -> Self {
        Self {
            name: CountryName {
                common: name.to_string(),
            },
            cca2: cca2.to_string(),
            idd: Idd {
                root: Some(root.to_string()),
                suffixes: None,
            },
            flags: Flags {
                svg: flag.to_string(),
            },
        }
    }

    /// Root plus the first suffix, e.g. `+4` + `4` = `+44`.
    /// `None` when the directory lists no root.
    pub fn dial_code(&self) -> Option<String> {
        let root = self.idd.root.as_deref().filter(|r| !r.is_empty())?;
        let suffix = self
            .idd
            .suffixes
            .as_ref()
            .and_then(|s| s.first())
            .map(String::as_str)
            .unwrap_or("");
        Some(format!("{root}{suffix}"))
    }
}

/// One selectable entry of the country picker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DialOption {
    pub name: String,
    pub dial_code: String,
    pub flag_url: String,
}

impl DialOption {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.dial_code)
    }
}

/// Drop countries without a dial root and sort the rest by common name.
pub fn dial_options(countries: &[Country]) -> Vec<DialOption> {
    let mut options: Vec<DialOption> = countries
        .iter()
        .filter_map(|c| {
            c.dial_code().map(|dial_code| DialOption {
                name: c.name.common.clone(),
                dial_code,
                flag_url: c.flags.svg.clone(),
            })
        })
        .collect();
    options.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    options
}

/// Bundled list used whenever the directory cannot be reached.
pub fn fallback() -> Vec<Country> {
    vec![
        Country::new("United States / Canada", "US", "+1", "/countryImages/canada.webp"),
        Country::new("United Kingdom", "GB", "+44", "/countryImages/uk.png"),
        Country::new("India", "IN", "+91", "/countryImages/india.webp"),
        Country::new("Australia", "AU", "+61", "/countryImages/australia.jpg"),
        Country::new("Germany", "DE", "+49", "/countryImages/Germany.png"),
        Country::new("France", "FR", "+33", "/countryImages/France.svg"),
        Country::new("Japan", "JP", "+81", "/countryImages/japan.webp"),
        Country::new("Brazil", "BR", "+55", "/countryImages/Brazil.webp"),
        Country::new("Mexico", "MX", "+52", "/countryImages/Mexico.webp"),
        Country::new("China", "CN", "+86", "/countryImages/China.webp"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_has_ten_sorted_entries() {
        let options = dial_options(&fallback());
        assert_eq!(options.len(), 10);
        assert_eq!(options[0].name, "Australia");
        assert_eq!(options[9].name, "United States / Canada");
        assert!(options.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[test]
    fn test_dial_code_uses_first_suffix() {
        let raw = r#"{
            "name": {"common": "Norway"},
            "cca2": "NO",
            "idd": {"root": "+4", "suffixes": ["7"]},
            "flags": {"svg": "https://flagcdn.com/no.svg"}
        }"#;
        let country: Country = serde_json::from_str(raw).unwrap();
        assert_eq!(country.dial_code().as_deref(), Some("+47"));
    }

    #[test]
    fn test_countries_without_root_are_dropped() {
        let raw = r#"[
            {"name": {"common": "Antarctica"}, "cca2": "AQ", "idd": {}, "flags": {"svg": ""}},
            {"name": {"common": "Chile"}, "cca2": "CL", "idd": {"root": "+5", "suffixes": ["6"]}, "flags": {"svg": ""}}
        ]"#;
        let countries: Vec<Country> = serde_json::from_str(raw).unwrap();
        let options = dial_options(&countries);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label(), "Chile (+56)");
    }
}

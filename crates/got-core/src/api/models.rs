use serde::{Deserialize, Serialize};

/// A house of Westeros as returned by `/houses`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub coat_of_arms: String,
    #[serde(default)]
    pub words: String,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub seats: Vec<String>,
    #[serde(default)]
    pub current_lord: String,
    #[serde(default)]
    pub heir: String,
    #[serde(default)]
    pub overlord: String,
    #[serde(default)]
    pub ancestral_weapons: Vec<String>,
    #[serde(default)]
    pub sworn_members: Vec<String>,
}

impl House {
    /// Numeric id, taken from the trailing path segment of `url`.
    pub fn id(&self) -> Option<u32> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }
}

/// List envelope: `{"count": n, "results": [...]}`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ApiResult<T> {
    #[serde(default)]
    pub count: u32,
    pub results: Vec<T>,
}

/// A page of items, either as a bare JSON array or wrapped in [`ApiResult`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Page<T> {
    Items(Vec<T>),
    Envelope(ApiResult<T>),
}

impl<T> Page<T> {
    /// Total item count across all pages, when the server reports one.
    pub fn total_count(&self) -> Option<u32> {
        match self {
            Page::Envelope(envelope) if envelope.count > 0 => Some(envelope.count),
            _ => None,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Items(items) => items,
            Page::Envelope(envelope) => envelope.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUSE_JSON: &str = r#"{
        "url": "https://www.anapioficeandfire.com/api/houses/1",
        "name": "House Algood",
        "region": "The Westerlands",
        "coatOfArms": "A golden wreath, on a blue field with a gold border",
        "words": "",
        "titles": [""],
        "seats": [""],
        "currentLord": "",
        "heir": "",
        "overlord": "https://www.anapioficeandfire.com/api/houses/229",
        "founded": "",
        "founder": "",
        "diedOut": "",
        "ancestralWeapons": [""],
        "cadetBranches": [],
        "swornMembers": []
    }"#;

    #[test]
    fn test_house_deserialization() {
        let house: House = serde_json::from_str(HOUSE_JSON).unwrap();
        assert_eq!(house.name, "House Algood");
        assert_eq!(house.region, "The Westerlands");
        assert_eq!(
            house.overlord,
            "https://www.anapioficeandfire.com/api/houses/229"
        );
        assert_eq!(house.titles, vec![String::new()]);
        assert!(house.sworn_members.is_empty());
        assert_eq!(house.id(), Some(1));
    }

    #[test]
    fn test_house_requires_url_and_name() {
        let missing_name = r#"{"url": "https://www.anapioficeandfire.com/api/houses/2"}"#;
        assert!(serde_json::from_str::<House>(missing_name).is_err());

        let minimal = r#"{"url": "https://example.test/houses/7/", "name": "House Ashford"}"#;
        let house: House = serde_json::from_str(minimal).unwrap();
        assert_eq!(house.id(), Some(7));
        assert!(house.coat_of_arms.is_empty());
    }

    #[test]
    fn test_page_accepts_array_and_envelope() {
        let array = format!("[{}]", HOUSE_JSON);
        let page: Page<House> = serde_json::from_str(&array).unwrap();
        assert_eq!(page.total_count(), None);
        assert_eq!(page.into_items().len(), 1);

        let envelope = format!(r#"{{"count": 1, "results": [{}]}}"#, HOUSE_JSON);
        let page: Page<House> = serde_json::from_str(&envelope).unwrap();
        assert!(matches!(page, Page::Envelope(ApiResult { count: 1, .. })));
        assert_eq!(page.total_count(), Some(1));
        assert_eq!(page.into_items()[0].name, "House Algood");

        let empty: Page<House> = serde_json::from_str("[]").unwrap();
        assert!(empty.into_items().is_empty());
    }

    #[test]
    fn test_page_rejects_other_shapes() {
        assert!(serde_json::from_str::<Page<House>>(r#"{"houses": []}"#).is_err());
        assert!(serde_json::from_str::<Page<House>>("\"nope\"").is_err());
    }
}

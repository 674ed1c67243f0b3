use serde::{Deserialize, Serialize};

/// A single recipe ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Ingredient {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            unit: unit.into(),
            notes: None,
        }
    }
}

/// The slice of a recipe the ordering flow needs. Other fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub ingredients: Vec<Ingredient>,
}

/// Saved recipe list filters. Every field is optional; an empty value means
/// "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    /// Upper bound on total cooking time, in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// A product the remote mapper matched to one of our ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedProduct {
    pub id: String,
    pub name: String,
}

impl MappedProduct {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Optional bookkeeping returned alongside mapped products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingMetadata {
    #[serde(default)]
    pub mapping_confidence: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub mapped_count: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u32>,
}

/// A validated storefront URL. Only the store resolver constructs these.
///
/// Keeps the link exactly as the server sent it (minus surrounding
/// whitespace); the parsed form is only used for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLink {
    raw: String,
    url: url::Url,
}

impl StoreLink {
    pub(crate) fn new(raw: impl Into<String>, url: url::Url) -> Self {
        Self {
            raw: raw.into(),
            url,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &url::Url {
        &self.url
    }
}

impl std::fmt::Display for StoreLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storefront deep link carrying the mapped product ids and titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderLink(String);

impl OrderLink {
    pub(crate) fn new(link: String) -> Self {
        Self(link)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OrderLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

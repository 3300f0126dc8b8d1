//! Ordered genre list stored as a JSON array column.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult,
)]
#[serde(transparent)]
pub struct GenreList(pub Vec<String>);

impl GenreList {
    /// Build a list from arbitrary items, trimming each and dropping blanks.
    /// Order is preserved.
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            items
                .into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    /// Parse the older comma-joined encoding, which wrapped the list in
    /// array-literal braces (`{Jazz,Rock n Roll}`).
    pub fn from_legacy(raw: &str) -> Self {
        Self::new(raw.split(',').map(|item| item.replace(['{', '}'], "")))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl From<Vec<String>> for GenreList {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

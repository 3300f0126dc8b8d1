pub mod artists;
pub mod extract;
pub mod shows;
pub mod venues;

use serde::{Deserialize, Serialize};

/// Body of `POST /venues/search` and `POST /artists/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResults<T: Serialize> {
    pub search_term: String,
    pub count: usize,
    pub data: Vec<T>,
}

/// One search hit, with the number of shows still to come.
#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

/// A mutating response: the record plus the one-line notice to flash.
#[derive(Debug, Serialize)]
pub struct Notice<T: Serialize> {
    pub notice: String,
    pub data: T,
}

impl<T: Serialize> Notice<T> {
    pub fn new(notice: impl Into<String>, data: T) -> Self {
        Self {
            notice: notice.into(),
            data,
        }
    }
}

pub(crate) fn now() -> chrono::DateTime<chrono::FixedOffset> {
    chrono::Utc::now().fixed_offset()
}

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::EntityTrait;
use serde::Serialize;
use std::sync::Arc;

use super::extract::ApiJson;
use super::Notice;
use crate::error::BookingResult;
use crate::forms::{FormPage, ShowForm};
use crate::records;
use crate::schedule::{self, ShowListing};
use gigboard_db::entities::{artist, show, venue};
use gigboard_db::AppState;

#[derive(Debug, Serialize)]
pub struct ShowResponse {
    pub id: i32,
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl From<show::Model> for ShowResponse {
    fn from(s: show::Model) -> Self {
        Self {
            id: s.id,
            artist_id: s.artist_id,
            venue_id: s.venue_id,
            start_time: s.start_time,
        }
    }
}

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> BookingResult<Json<Vec<ShowListing>>> {
    let shows = show::Entity::find().all(&state.db).await?;
    let venues = venue::Entity::find().all(&state.db).await?;
    let artists = artist::Entity::find().all(&state.db).await?;

    Ok(Json(schedule::list_shows(&shows, &venues, &artists)))
}

/// GET /shows/create
pub async fn create_show_form() -> Json<FormPage<ShowForm>> {
    Json(FormPage::new(ShowForm::default()))
}

/// POST /shows/create
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<ShowForm>,
) -> BookingResult<(StatusCode, Json<Notice<ShowResponse>>)> {
    let new = form.validate()?;
    let created = records::create_show(&state.db, new).await?;

    Ok((
        StatusCode::CREATED,
        Json(Notice::new(
            "Show was successfully listed!",
            ShowResponse::from(created),
        )),
    ))
}

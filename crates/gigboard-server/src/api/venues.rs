use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::{now, Notice, SearchHit, SearchRequest, SearchResults};
use crate::error::{BookingError, BookingResult};
use crate::forms::{FormPage, VenueForm};
use crate::records;
use crate::schedule::{self, LocationGroup, ShowPartition, VenueShow};
use gigboard_db::entities::{artist, show, venue};
use gigboard_db::AppState;

#[derive(Debug, Serialize)]
pub struct VenueResponse {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub genres: Vec<String>,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

impl From<venue::Model> for VenueResponse {
    fn from(v: venue::Model) -> Self {
        Self {
            id: v.id,
            name: v.name,
            city: v.city,
            state: v.state,
            address: v.address,
            phone: v.phone,
            image_link: v.image_link,
            genres: v.genres.0,
            website: v.website,
            facebook_link: v.facebook_link,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VenueDetailResponse {
    #[serde(flatten)]
    pub venue: VenueResponse,
    #[serde(flatten)]
    pub shows: ShowPartition<VenueShow>,
}

/// GET /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
) -> BookingResult<Json<Vec<LocationGroup>>> {
    let venues = venue::Entity::find().all(&state.db).await?;
    let shows = show::Entity::find().all(&state.db).await?;

    Ok(Json(schedule::group_venues_by_location(&venues, &shows, now())))
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SearchRequest>,
) -> BookingResult<Json<SearchResults<SearchHit>>> {
    let venues = records::search_venues(&state.db, &body.search_term).await?;

    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let shows = if ids.is_empty() {
        vec![]
    } else {
        show::Entity::find()
            .filter(show::Column::VenueId.is_in(ids))
            .all(&state.db)
            .await?
    };

    let now = now();
    let data: Vec<SearchHit> = venues
        .into_iter()
        .map(|v| SearchHit {
            num_upcoming_shows: schedule::count_upcoming(
                shows.iter().filter(|s| s.venue_id == v.id),
                now,
            ),
            id: v.id,
            name: v.name,
        })
        .collect();

    Ok(Json(SearchResults {
        search_term: body.search_term,
        count: data.len(),
        data,
    }))
}

/// GET /venues/{id}
pub async fn get_venue(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> BookingResult<Json<VenueDetailResponse>> {
    let venue_model = records::find_venue(&state.db, id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Venue {id} does not exist")))?;

    let shows = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .all(&state.db)
        .await?;

    let artist_ids: Vec<i32> = shows
        .iter()
        .map(|s| s.artist_id)
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect();
    let artists = if artist_ids.is_empty() {
        vec![]
    } else {
        artist::Entity::find()
            .filter(artist::Column::Id.is_in(artist_ids))
            .all(&state.db)
            .await?
    };

    Ok(Json(VenueDetailResponse {
        shows: schedule::partition_for_venue(id, &shows, &artists, now()),
        venue: VenueResponse::from(venue_model),
    }))
}

/// GET /venues/create
pub async fn create_venue_form() -> Json<FormPage<VenueForm>> {
    Json(FormPage::new(VenueForm::default()))
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<VenueForm>,
) -> BookingResult<(StatusCode, Json<Notice<VenueResponse>>)> {
    let new = form.validate()?;
    let created = records::create_venue(&state.db, new).await?;

    Ok((
        StatusCode::CREATED,
        Json(Notice::new(
            format!("Venue {} was successfully listed!", created.name),
            VenueResponse::from(created),
        )),
    ))
}

/// POST /venues/{id} (also DELETE)
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> BookingResult<Json<Notice<VenueResponse>>> {
    let deleted = records::delete_venue(&state.db, id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Venue {id} does not exist; nothing was deleted."))
        })?;

    Ok(Json(Notice::new(
        format!("The venue, {}, was deleted.", deleted.name),
        VenueResponse::from(deleted),
    )))
}

/// GET /venues/{id}/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> BookingResult<Json<FormPage<VenueForm>>> {
    let venue_model = records::find_venue(&state.db, id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Venue {id} does not exist")))?;

    Ok(Json(FormPage::editing(id, VenueForm::from(&venue_model))))
}

/// POST /venues/{id}/edit
pub async fn edit_venue(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(form): ApiJson<VenueForm>,
) -> BookingResult<Json<Notice<VenueResponse>>> {
    let edits = form.validate_edits()?;
    let updated = records::update_venue(&state.db, id, edits).await?;

    Ok(Json(Notice::new(
        format!("Venue {} was successfully updated!", updated.name),
        VenueResponse::from(updated),
    )))
}

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::sync::Arc;

use super::extract::{ApiJson, ApiPath};
use super::{now, Notice, SearchHit, SearchRequest, SearchResults};
use crate::error::{BookingError, BookingResult};
use crate::forms::{ArtistForm, FormPage};
use crate::records;
use crate::schedule::{self, ArtistShow, ShowPartition};
use gigboard_db::entities::{artist, show, venue};
use gigboard_db::AppState;

#[derive(Debug, Serialize)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub genres: Vec<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

impl From<artist::Model> for ArtistResponse {
    fn from(a: artist::Model) -> Self {
        Self {
            id: a.id,
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            website: a.website,
            image_link: a.image_link,
            genres: a.genres.0,
            facebook_link: a.facebook_link,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDetailResponse {
    #[serde(flatten)]
    pub artist: ArtistResponse,
    #[serde(flatten)]
    pub shows: ShowPartition<ArtistShow>,
}

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
) -> BookingResult<Json<Vec<ArtistSummary>>> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(
        artists
            .into_iter()
            .map(|a| ArtistSummary {
                id: a.id,
                name: a.name,
            })
            .collect(),
    ))
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<SearchRequest>,
) -> BookingResult<Json<SearchResults<SearchHit>>> {
    let artists = records::search_artists(&state.db, &body.search_term).await?;

    let ids: Vec<i32> = artists.iter().map(|a| a.id).collect();
    let shows = if ids.is_empty() {
        vec![]
    } else {
        show::Entity::find()
            .filter(show::Column::ArtistId.is_in(ids))
            .all(&state.db)
            .await?
    };

    let now = now();
    let data: Vec<SearchHit> = artists
        .into_iter()
        .map(|a| SearchHit {
            num_upcoming_shows: schedule::count_upcoming(
                shows.iter().filter(|s| s.artist_id == a.id),
                now,
            ),
            id: a.id,
            name: a.name,
        })
        .collect();

    Ok(Json(SearchResults {
        search_term: body.search_term,
        count: data.len(),
        data,
    }))
}

/// GET /artists/{id}
pub async fn get_artist(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> BookingResult<Json<ArtistDetailResponse>> {
    let artist_model = records::find_artist(&state.db, id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Artist {id} does not exist")))?;

    let shows = show::Entity::find()
        .filter(show::Column::ArtistId.eq(id))
        .all(&state.db)
        .await?;

    let venue_ids: Vec<i32> = shows
        .iter()
        .map(|s| s.venue_id)
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect();
    let venues = if venue_ids.is_empty() {
        vec![]
    } else {
        venue::Entity::find()
            .filter(venue::Column::Id.is_in(venue_ids))
            .all(&state.db)
            .await?
    };

    Ok(Json(ArtistDetailResponse {
        shows: schedule::partition_for_artist(id, &shows, &venues, now()),
        artist: ArtistResponse::from(artist_model),
    }))
}

/// GET /artists/create
pub async fn create_artist_form() -> Json<FormPage<ArtistForm>> {
    Json(FormPage::new(ArtistForm::default()))
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    ApiJson(form): ApiJson<ArtistForm>,
) -> BookingResult<(StatusCode, Json<Notice<ArtistResponse>>)> {
    let new = form.validate()?;
    let created = records::create_artist(&state.db, new).await?;

    Ok((
        StatusCode::CREATED,
        Json(Notice::new(
            format!("Artist {} was successfully listed!", created.name),
            ArtistResponse::from(created),
        )),
    ))
}

/// GET /artists/{id}/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
) -> BookingResult<Json<FormPage<ArtistForm>>> {
    let artist_model = records::find_artist(&state.db, id)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Artist {id} does not exist")))?;

    Ok(Json(FormPage::editing(id, ArtistForm::from(&artist_model))))
}

/// POST /artists/{id}/edit
pub async fn edit_artist(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(form): ApiJson<ArtistForm>,
) -> BookingResult<Json<Notice<ArtistResponse>>> {
    let edits = form.validate_edits()?;
    let updated = records::update_artist(&state.db, id, edits).await?;

    Ok(Json(Notice::new(
        format!("Artist {} was successfully updated!", updated.name),
        ArtistResponse::from(updated),
    )))
}

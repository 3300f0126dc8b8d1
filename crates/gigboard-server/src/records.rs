//! Record service: transactional writes for venues, artists and shows,
//! plus the lookups and name searches the pages need.
//!
//! Each write opens one `DatabaseTransaction`, does all its reads and
//! writes through it and commits at the end. Any `?` before the commit
//! drops the transaction, which rolls it back.

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::error::{BookingError, BookingResult};
use crate::forms::{ArtistEdits, NewArtist, NewShow, NewVenue, VenueEdits};
use gigboard_db::entities::{artist, show, venue};

// ─── Lookups ────────────────────────────────────────────────────────

pub async fn find_venue(db: &DatabaseConnection, id: i32) -> BookingResult<Option<venue::Model>> {
    Ok(venue::Entity::find_by_id(id).one(db).await?)
}

pub async fn find_artist(
    db: &DatabaseConnection,
    id: i32,
) -> BookingResult<Option<artist::Model>> {
    Ok(artist::Entity::find_by_id(id).one(db).await?)
}

/// `LOWER(name) LIKE '%term%'` pattern with LIKE metacharacters escaped.
/// The term is used as given, whitespace included.
///
/// Case folding of the stored name is whatever the backend's `LOWER`
/// does. Postgres folds Unicode; SQLite folds ASCII only, so on SQLite a
/// name like "ÉCLAT" is not found by "éclat".
fn name_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub async fn search_venues(db: &DatabaseConnection, term: &str) -> BookingResult<Vec<venue::Model>> {
    let filter = Expr::expr(Func::lower(Expr::col(venue::Column::Name)))
        .like(LikeExpr::new(name_pattern(term)).escape('\\'));
    Ok(venue::Entity::find()
        .filter(filter)
        .order_by_asc(venue::Column::Name)
        .all(db)
        .await?)
}

pub async fn search_artists(
    db: &DatabaseConnection,
    term: &str,
) -> BookingResult<Vec<artist::Model>> {
    let filter = Expr::expr(Func::lower(Expr::col(artist::Column::Name)))
        .like(LikeExpr::new(name_pattern(term)).escape('\\'));
    Ok(artist::Entity::find()
        .filter(filter)
        .order_by_asc(artist::Column::Name)
        .all(db)
        .await?)
}

// ─── Venues ─────────────────────────────────────────────────────────

pub async fn create_venue(db: &DatabaseConnection, new: NewVenue) -> BookingResult<venue::Model> {
    let txn = db.begin().await?;
    let created = venue::ActiveModel {
        name: Set(new.name),
        city: Set(new.city),
        state: Set(new.state),
        address: Set(new.address),
        phone: Set(new.phone),
        image_link: Set(new.image_link),
        genres: Set(new.genres),
        website: Set(new.website),
        facebook_link: Set(new.facebook_link),
        seeking_talent: Set(new.seeking_talent),
        seeking_description: Set(new.seeking_description),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(venue_id = created.id, name = %created.name, "venue created");
    Ok(created)
}

pub async fn update_venue(
    db: &DatabaseConnection,
    id: i32,
    edits: VenueEdits,
) -> BookingResult<venue::Model> {
    let txn = db.begin().await?;
    let existing = venue::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Venue {id} does not exist")))?;

    let mut active: venue::ActiveModel = existing.into();
    active.name = Set(edits.name);
    active.city = Set(edits.city);
    active.state = Set(edits.state);
    active.phone = Set(edits.phone);
    active.facebook_link = Set(edits.facebook_link);
    active.genres = Set(edits.genres);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id = id, "venue updated");
    Ok(updated)
}

/// Delete a venue that no show references.
///
/// Returns `Ok(None)` without touching anything when the id is unknown,
/// and `Conflict` while any show still points at the venue.
pub async fn delete_venue(
    db: &DatabaseConnection,
    id: i32,
) -> BookingResult<Option<venue::Model>> {
    let txn = db.begin().await?;
    let Some(existing) = venue::Entity::find_by_id(id).one(&txn).await? else {
        tracing::debug!(venue_id = id, "delete requested for unknown venue");
        return Ok(None);
    };

    let dependents = show::Entity::find()
        .filter(show::Column::VenueId.eq(id))
        .count(&txn)
        .await?;
    if dependents > 0 {
        tracing::warn!(venue_id = id, dependents, "venue delete blocked by shows");
        return Err(BookingError::Conflict(format!(
            "The venue, {}, still has {dependents} show(s) and could not be deleted.",
            existing.name
        )));
    }

    venue::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id = id, name = %existing.name, "venue deleted");
    Ok(Some(existing))
}

// ─── Artists ────────────────────────────────────────────────────────

pub async fn create_artist(
    db: &DatabaseConnection,
    new: NewArtist,
) -> BookingResult<artist::Model> {
    let txn = db.begin().await?;
    let created = artist::ActiveModel {
        name: Set(new.name),
        city: Set(new.city),
        state: Set(new.state),
        phone: Set(new.phone),
        website: Set(new.website),
        image_link: Set(new.image_link),
        genres: Set(new.genres),
        facebook_link: Set(new.facebook_link),
        seeking_venue: Set(new.seeking_venue),
        seeking_description: Set(new.seeking_description),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(artist_id = created.id, name = %created.name, "artist created");
    Ok(created)
}

pub async fn update_artist(
    db: &DatabaseConnection,
    id: i32,
    edits: ArtistEdits,
) -> BookingResult<artist::Model> {
    let txn = db.begin().await?;
    let existing = artist::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| BookingError::NotFound(format!("Artist {id} does not exist")))?;

    let mut active: artist::ActiveModel = existing.into();
    active.name = Set(edits.name);
    active.city = Set(edits.city);
    active.state = Set(edits.state);
    active.phone = Set(edits.phone);
    active.facebook_link = Set(edits.facebook_link);
    active.genres = Set(edits.genres);
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(artist_id = id, "artist updated");
    Ok(updated)
}

// ─── Shows ──────────────────────────────────────────────────────────

pub async fn create_show(db: &DatabaseConnection, new: NewShow) -> BookingResult<show::Model> {
    let txn = db.begin().await?;
    if artist::Entity::find_by_id(new.artist_id).one(&txn).await?.is_none() {
        return Err(BookingError::NotFound(format!(
            "Artist {} does not exist",
            new.artist_id
        )));
    }
    if venue::Entity::find_by_id(new.venue_id).one(&txn).await?.is_none() {
        return Err(BookingError::NotFound(format!(
            "Venue {} does not exist",
            new.venue_id
        )));
    }

    let created = show::ActiveModel {
        artist_id: Set(new.artist_id),
        venue_id: Set(new.venue_id),
        start_time: Set(Some(new.start_time)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(
        show_id = created.id,
        artist_id = created.artist_id,
        venue_id = created.venue_id,
        "show created"
    );
    Ok(created)
}

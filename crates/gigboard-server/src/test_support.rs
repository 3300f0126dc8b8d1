// Shared fixtures for the in-crate tests
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

use crate::forms::{NewArtist, NewVenue};
use gigboard_db::{AppState, GenreList};

/// A fresh, migrated in-memory SQLite database. One pooled connection, so
/// every query sees the same memory database.
pub async fn memory_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    gigboard_migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn test_app_state() -> Arc<AppState> {
    Arc::new(AppState {
        db: memory_db().await,
    })
}

pub fn new_venue(name: &str, city: &str, state: &str) -> NewVenue {
    NewVenue {
        name: name.into(),
        city: city.into(),
        state: state.into(),
        address: "1015 Folsom Street".into(),
        phone: Some("123-123-1234".into()),
        image_link: Some("https://img.example.com/venue.jpg".into()),
        genres: GenreList::new(["Jazz", "Reggae", "Swing"]),
        website: Some("https://www.themusicalhop.com".into()),
        facebook_link: Some("https://www.facebook.com/TheMusicalHop".into()),
        seeking_talent: true,
        seeking_description: Some("We are on the lookout for a local artist.".into()),
    }
}

pub fn new_artist(name: &str) -> NewArtist {
    NewArtist {
        name: name.into(),
        city: "San Francisco".into(),
        state: "CA".into(),
        phone: Some("326-123-5000".into()),
        website: Some("https://www.gunsnpetalsband.com".into()),
        image_link: Some("https://img.example.com/artist.jpg".into()),
        genres: GenreList::new(["Rock n Roll"]),
        facebook_link: None,
        seeking_venue: true,
        seeking_description: Some("Looking for shows in the Bay Area.".into()),
    }
}

//! Show timing and venue aggregation.
//!
//! Everything here is a pure function of already-loaded rows and an
//! explicit `now`, so handlers decide what to load and tests decide what
//! "now" means.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use gigboard_db::entities::{artist, show, venue};

/// Display format for show start times: `MM/DD/YYYY, HH:MM`, 24-hour clock.
const START_TIME_FORMAT: &str = "%m/%d/%Y, %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowTiming {
    Upcoming,
    Past,
    /// Starts exactly at `now`, or has no start time.
    Neither,
}

/// Strict comparison on both sides: a show starting at exactly `now` is neither.
pub fn classify(start_time: Option<&DateTime<FixedOffset>>, now: DateTime<FixedOffset>) -> ShowTiming {
    match start_time {
        Some(t) if *t > now => ShowTiming::Upcoming,
        Some(t) if *t < now => ShowTiming::Past,
        _ => ShowTiming::Neither,
    }
}

pub fn format_start_time(start_time: Option<&DateTime<FixedOffset>>) -> String {
    start_time
        .map(|t| t.format(START_TIME_FORMAT).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueSummary>,
}

/// Upcoming show count per venue id. Venues without shows are absent.
fn upcoming_by_venue(shows: &[show::Model], now: DateTime<FixedOffset>) -> HashMap<i32, usize> {
    let mut counts = HashMap::new();
    for s in shows {
        if classify(s.start_time.as_ref(), now) == ShowTiming::Upcoming {
            *counts.entry(s.venue_id).or_insert(0) += 1;
        }
    }
    counts
}

pub fn count_upcoming<'a>(
    shows: impl IntoIterator<Item = &'a show::Model>,
    now: DateTime<FixedOffset>,
) -> usize {
    shows
        .into_iter()
        .filter(|s| classify(s.start_time.as_ref(), now) == ShowTiming::Upcoming)
        .count()
}

/// Bucket venues by exact `(city, state)`.
///
/// Groups come out sorted by city then state; venues inside a group by
/// name, then id.
pub fn group_venues_by_location(
    venues: &[venue::Model],
    shows: &[show::Model],
    now: DateTime<FixedOffset>,
) -> Vec<LocationGroup> {
    let upcoming = upcoming_by_venue(shows, now);

    let mut groups: BTreeMap<(String, String), Vec<VenueSummary>> = BTreeMap::new();
    for v in venues {
        groups
            .entry((v.city.clone(), v.state.clone()))
            .or_default()
            .push(VenueSummary {
                id: v.id,
                name: v.name.clone(),
                num_upcoming_shows: upcoming.get(&v.id).copied().unwrap_or(0),
            });
    }

    groups
        .into_iter()
        .map(|((city, state), mut venues)| {
            venues.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            LocationGroup {
                city,
                state,
                venues,
            }
        })
        .collect()
}

/// A show as listed on an artist's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistShow {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: String,
}

/// A show as listed on a venue's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueShow {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowPartition<T> {
    pub upcoming_shows: Vec<T>,
    pub past_shows: Vec<T>,
    pub upcoming_shows_count: usize,
    pub past_shows_count: usize,
}

impl<T> Default for ShowPartition<T> {
    fn default() -> Self {
        Self {
            upcoming_shows: Vec::new(),
            past_shows: Vec::new(),
            upcoming_shows_count: 0,
            past_shows_count: 0,
        }
    }
}

/// Split `shows` into upcoming and past, oldest first. `entry` returns
/// `None` when the joined row is missing, which drops the show like an
/// inner join would.
fn partition<'a, T>(
    shows: impl Iterator<Item = &'a show::Model>,
    now: DateTime<FixedOffset>,
    entry: impl Fn(&show::Model, String) -> Option<T>,
) -> ShowPartition<T> {
    let mut ordered: Vec<&show::Model> = shows.collect();
    ordered.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));

    let mut out = ShowPartition::default();
    for s in ordered {
        let timing = classify(s.start_time.as_ref(), now);
        if timing == ShowTiming::Neither {
            continue;
        }
        let Some(item) = entry(s, format_start_time(s.start_time.as_ref())) else {
            continue;
        };
        match timing {
            ShowTiming::Upcoming => out.upcoming_shows.push(item),
            ShowTiming::Past => out.past_shows.push(item),
            ShowTiming::Neither => {}
        }
    }
    out.upcoming_shows_count = out.upcoming_shows.len();
    out.past_shows_count = out.past_shows.len();
    out
}

pub fn partition_for_artist(
    artist_id: i32,
    shows: &[show::Model],
    venues: &[venue::Model],
    now: DateTime<FixedOffset>,
) -> ShowPartition<ArtistShow> {
    let by_id: HashMap<i32, &venue::Model> = venues.iter().map(|v| (v.id, v)).collect();
    partition(
        shows.iter().filter(|s| s.artist_id == artist_id),
        now,
        |s, start_time| {
            by_id.get(&s.venue_id).map(|v| ArtistShow {
                venue_id: v.id,
                venue_name: v.name.clone(),
                venue_image_link: v.image_link.clone(),
                start_time,
            })
        },
    )
}

pub fn partition_for_venue(
    venue_id: i32,
    shows: &[show::Model],
    artists: &[artist::Model],
    now: DateTime<FixedOffset>,
) -> ShowPartition<VenueShow> {
    let by_id: HashMap<i32, &artist::Model> = artists.iter().map(|a| (a.id, a)).collect();
    partition(
        shows.iter().filter(|s| s.venue_id == venue_id),
        now,
        |s, start_time| {
            by_id.get(&s.artist_id).map(|a| VenueShow {
                artist_id: a.id,
                artist_name: a.name.clone(),
                artist_image_link: a.image_link.clone(),
                start_time,
            })
        },
    )
}

/// One row of the show listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: String,
}

/// Every show, newest first; shows without a start time go last.
pub fn list_shows(
    shows: &[show::Model],
    venues: &[venue::Model],
    artists: &[artist::Model],
) -> Vec<ShowListing> {
    let venues: HashMap<i32, &venue::Model> = venues.iter().map(|v| (v.id, v)).collect();
    let artists: HashMap<i32, &artist::Model> = artists.iter().map(|a| (a.id, a)).collect();

    let mut ordered: Vec<&show::Model> = shows.iter().collect();
    ordered.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(a.id.cmp(&b.id)));

    ordered
        .into_iter()
        .filter_map(|s| {
            let v = venues.get(&s.venue_id)?;
            let a = artists.get(&s.artist_id)?;
            Some(ShowListing {
                id: s.id,
                venue_id: v.id,
                venue_name: v.name.clone(),
                artist_id: a.id,
                artist_name: a.name.clone(),
                artist_image_link: a.image_link.clone(),
                start_time: format_start_time(s.start_time.as_ref()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use gigboard_db::GenreList;

    fn now() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap().fixed_offset()
    }

    fn make_venue(id: i32, name: &str, city: &str, state: &str) -> venue::Model {
        venue::Model {
            id,
            name: name.into(),
            city: city.into(),
            state: state.into(),
            address: "1015 Folsom Street".into(),
            phone: None,
            image_link: Some(format!("https://img.example.com/venue-{id}.jpg")),
            genres: GenreList::new(["Jazz"]),
            website: None,
            facebook_link: None,
            seeking_talent: false,
            seeking_description: None,
        }
    }

    fn make_artist(id: i32, name: &str) -> artist::Model {
        artist::Model {
            id,
            name: name.into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: None,
            website: None,
            image_link: Some(format!("https://img.example.com/artist-{id}.jpg")),
            genres: GenreList::new(["Rock n Roll"]),
            facebook_link: None,
            seeking_venue: false,
            seeking_description: None,
        }
    }

    fn make_show(id: i32, artist_id: i32, venue_id: i32, start: Option<DateTime<FixedOffset>>) -> show::Model {
        show::Model {
            id,
            artist_id,
            venue_id,
            start_time: start,
        }
    }

    // ── classify ──────────────────────────────────────────────────────

    #[test]
    fn test_classify_boundaries() {
        let n = now();
        assert_eq!(classify(Some(&(n + Duration::seconds(1))), n), ShowTiming::Upcoming);
        assert_eq!(classify(Some(&(n - Duration::seconds(1))), n), ShowTiming::Past);
        assert_eq!(classify(Some(&n), n), ShowTiming::Neither);
        assert_eq!(classify(None, n), ShowTiming::Neither);
    }

    #[test]
    fn test_classify_compares_instants_across_offsets() {
        let n = now();
        // Same instant expressed at UTC-7
        let same = n.with_timezone(&FixedOffset::west_opt(7 * 3600).unwrap());
        assert_eq!(classify(Some(&same), n), ShowTiming::Neither);
    }

    #[test]
    fn test_format_start_time() {
        let t = Utc.with_ymd_and_hms(2035, 4, 8, 21, 5, 0).unwrap().fixed_offset();
        assert_eq!(format_start_time(Some(&t)), "04/08/2035, 21:05");
        assert_eq!(format_start_time(None), "");
    }

    // ── grouping ──────────────────────────────────────────────────────

    #[test]
    fn test_same_city_and_state_share_a_group() {
        let venues = vec![
            make_venue(1, "The Musical Hop", "San Francisco", "CA"),
            make_venue(2, "Park Square Live Music & Coffee", "San Francisco", "CA"),
        ];
        let groups = group_venues_by_location(&venues, &[], now());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].city, "San Francisco");
        assert_eq!(groups[0].state, "CA");
        assert_eq!(groups[0].venues.len(), 2);
    }

    #[test]
    fn test_groups_sorted_by_city_then_state() {
        let venues = vec![
            make_venue(1, "A", "Springfield", "OR"),
            make_venue(2, "B", "New York", "NY"),
            make_venue(3, "C", "Springfield", "IL"),
        ];
        let groups = group_venues_by_location(&venues, &[], now());
        let keys: Vec<(&str, &str)> = groups
            .iter()
            .map(|g| (g.city.as_str(), g.state.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("New York", "NY"), ("Springfield", "IL"), ("Springfield", "OR")]
        );
    }

    #[test]
    fn test_venue_without_shows_has_zero_upcoming() {
        let venues = vec![make_venue(1, "Quiet Room", "Austin", "TX")];
        let shows = vec![make_show(1, 1, 2, Some(now() + Duration::days(3)))];
        let groups = group_venues_by_location(&venues, &shows, now());
        assert_eq!(groups[0].venues[0].num_upcoming_shows, 0);
    }

    #[test]
    fn test_num_upcoming_counts_only_future_shows() {
        let n = now();
        let venues = vec![make_venue(1, "The Musical Hop", "San Francisco", "CA")];
        let shows = vec![
            make_show(1, 1, 1, Some(n + Duration::days(1))),
            make_show(2, 1, 1, Some(n + Duration::seconds(1))),
            make_show(3, 1, 1, Some(n - Duration::days(1))),
            make_show(4, 1, 1, Some(n)),
            make_show(5, 1, 1, None),
        ];
        let groups = group_venues_by_location(&venues, &shows, n);
        assert_eq!(groups[0].venues[0].num_upcoming_shows, 2);
        assert_eq!(count_upcoming(shows.iter().filter(|s| s.venue_id == 1), n), 2);
        assert_eq!(count_upcoming(shows.iter().filter(|s| s.venue_id == 2), n), 0);
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_venues_by_location(&[], &[], now()).is_empty());
    }

    // ── partitions ────────────────────────────────────────────────────

    #[test]
    fn test_partition_for_artist_splits_and_denormalizes() {
        let n = now();
        let venues = vec![
            make_venue(1, "The Musical Hop", "San Francisco", "CA"),
            make_venue(2, "The Dueling Pianos Bar", "New York", "NY"),
        ];
        let shows = vec![
            make_show(1, 7, 1, Some(n - Duration::seconds(1))),
            make_show(2, 7, 2, Some(n + Duration::seconds(1))),
            make_show(3, 7, 2, Some(n)),
            make_show(4, 8, 1, Some(n + Duration::days(1))),
        ];
        let p = partition_for_artist(7, &shows, &venues, n);
        assert_eq!(p.past_shows_count, 1);
        assert_eq!(p.upcoming_shows_count, 1);
        assert_eq!(p.past_shows[0].venue_id, 1);
        assert_eq!(p.past_shows[0].venue_name, "The Musical Hop");
        assert_eq!(
            p.past_shows[0].venue_image_link.as_deref(),
            Some("https://img.example.com/venue-1.jpg")
        );
        assert_eq!(p.upcoming_shows[0].venue_name, "The Dueling Pianos Bar");
        assert_eq!(p.upcoming_shows[0].start_time, "04/01/2035, 20:00");
    }

    #[test]
    fn test_partition_for_venue_orders_oldest_first() {
        let n = now();
        let artists = vec![make_artist(1, "Guns N Petals"), make_artist(2, "Matt Quevedo")];
        let shows = vec![
            make_show(1, 2, 5, Some(n + Duration::days(10))),
            make_show(2, 1, 5, Some(n + Duration::days(2))),
            make_show(3, 1, 5, Some(n - Duration::days(30))),
            make_show(4, 2, 5, Some(n - Duration::days(60))),
        ];
        let p = partition_for_venue(5, &shows, &artists, n);
        let upcoming: Vec<&str> = p.upcoming_shows.iter().map(|s| s.artist_name.as_str()).collect();
        let past: Vec<&str> = p.past_shows.iter().map(|s| s.artist_name.as_str()).collect();
        assert_eq!(upcoming, vec!["Guns N Petals", "Matt Quevedo"]);
        assert_eq!(past, vec!["Matt Quevedo", "Guns N Petals"]);
        assert_eq!(p.upcoming_shows_count, 2);
        assert_eq!(p.past_shows_count, 2);
    }

    #[test]
    fn test_partition_skips_shows_with_missing_join() {
        let n = now();
        let shows = vec![make_show(1, 1, 9, Some(n + Duration::days(1)))];
        let p = partition_for_venue(9, &shows, &[], n);
        assert_eq!(p, ShowPartition::default());
    }

    #[test]
    fn test_every_show_lands_in_exactly_one_bucket() {
        let n = now();
        let venues = vec![make_venue(1, "Hall", "Austin", "TX")];
        let offsets = [-3600, -1, 0, 1, 3600];
        let shows: Vec<show::Model> = offsets
            .iter()
            .enumerate()
            .map(|(i, secs)| make_show(i as i32 + 1, 1, 1, Some(n + Duration::seconds(*secs))))
            .collect();
        let p = partition_for_artist(1, &shows, &venues, n);
        assert_eq!(p.upcoming_shows_count, 2);
        assert_eq!(p.past_shows_count, 2);
        // the show at exactly `now` is in neither list
        assert_eq!(p.upcoming_shows_count + p.past_shows_count, shows.len() - 1);
    }

    // ── listing ───────────────────────────────────────────────────────

    #[test]
    fn test_list_shows_newest_first_nulls_last() {
        let n = now();
        let venues = vec![make_venue(1, "The Musical Hop", "San Francisco", "CA")];
        let artists = vec![make_artist(4, "Guns N Petals")];
        let shows = vec![
            make_show(1, 4, 1, Some(n - Duration::days(1))),
            make_show(2, 4, 1, None),
            make_show(3, 4, 1, Some(n + Duration::days(1))),
        ];
        let listing = list_shows(&shows, &venues, &artists);
        let ids: Vec<i32> = listing.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(listing[0].artist_name, "Guns N Petals");
        assert_eq!(listing[0].venue_name, "The Musical Hop");
        assert_eq!(listing[2].start_time, "");
    }
}

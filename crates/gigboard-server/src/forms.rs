//! Submitted form payloads and their validation.
//!
//! Forms deserialize leniently (every field optional) so that a missing
//! field surfaces as a `BookingError::Validation` naming it, rather than
//! an opaque JSON rejection.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, BookingResult};
use gigboard_db::entities::{artist, venue};
use gigboard_db::GenreList;

pub const GENRE_CHOICES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

pub const STATE_CHOICES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH",
    "OK", "OR", "MD", "MA", "MI", "MN", "MS", "MO", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY",
];

/// Genres arrive either as a list or as one comma-joined string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenresInput {
    List(Vec<String>),
    Joined(String),
}

impl From<GenresInput> for GenreList {
    fn from(input: GenresInput) -> Self {
        match input {
            GenresInput::List(items) => GenreList::new(items),
            GenresInput::Joined(raw) => GenreList::from_legacy(&raw),
        }
    }
}

/// A checkbox-style value.
///
/// Mapping: absent is false; JSON booleans are taken as-is; the strings
/// `y`, `yes`, `on`, `true`, `1` are true and `n`, `no`, `off`, `false`,
/// `0` and the empty string are false (case-insensitive). The numbers `1`
/// and `0` read like their text forms. Anything else is rejected by
/// `is_checked`, not by the deserializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Checkbox {
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

impl Checkbox {
    pub fn is_checked(&self, field: &str) -> BookingResult<bool> {
        match self {
            Checkbox::Flag(b) => Ok(*b),
            Checkbox::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "on" | "true" | "1" => Ok(true),
                "n" | "no" | "off" | "false" | "0" | "" => Ok(false),
                other => Err(BookingError::Validation(format!(
                    "{field} must be a checkbox value, got {other:?}"
                ))),
            },
            Checkbox::Other(v) => match v.as_i64() {
                Some(1) => Ok(true),
                Some(0) => Ok(false),
                _ => Err(BookingError::Validation(format!(
                    "{field} must be a checkbox value, got {v}"
                ))),
            },
        }
    }
}

fn checked(value: Option<&Checkbox>, field: &str) -> BookingResult<bool> {
    value.map_or(Ok(false), |c| c.is_checked(field))
}

fn required(value: Option<String>, field: &str) -> BookingResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BookingError::missing(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required_genres(value: Option<GenresInput>) -> BookingResult<GenreList> {
    let genres: GenreList = value.map(GenreList::from).unwrap_or_default();
    if genres.is_empty() {
        return Err(BookingError::missing("genres"));
    }
    Ok(genres)
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DD HH:MM[:SS]` (space or `T`
/// separator) taken as UTC.
pub fn parse_start_time(raw: &str) -> BookingResult<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t);
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    Err(BookingError::Validation(format!(
        "start_time {raw:?} is not a recognised date and time"
    )))
}

/// What the create pages hand to a renderer: a blank (or prefilled) form
/// plus the selectable values.
#[derive(Debug, Serialize)]
pub struct FormPage<F: Serialize> {
    /// Id of the record being edited; absent on create pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<i32>,
    pub form: F,
    pub genre_choices: &'static [&'static str],
    pub state_choices: &'static [&'static str],
}

impl<F: Serialize> FormPage<F> {
    pub fn new(form: F) -> Self {
        Self {
            record_id: None,
            form,
            genre_choices: GENRE_CHOICES,
            state_choices: STATE_CHOICES,
        }
    }

    pub fn editing(record_id: i32, form: F) -> Self {
        Self {
            record_id: Some(record_id),
            ..Self::new(form)
        }
    }
}

// ─── Venue ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub genres: Option<GenresInput>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub seeking_talent: Option<Checkbox>,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVenue {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: Option<String>,
    pub image_link: Option<String>,
    pub genres: GenreList,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_talent: bool,
    pub seeking_description: Option<String>,
}

/// The only venue fields an edit may touch.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueEdits {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub facebook_link: Option<String>,
    pub genres: GenreList,
}

impl VenueForm {
    pub fn validate(self) -> BookingResult<NewVenue> {
        Ok(NewVenue {
            seeking_talent: checked(self.seeking_talent.as_ref(), "seeking_talent")?,
            name: required(self.name, "name")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            address: required(self.address, "address")?,
            genres: required_genres(self.genres)?,
            phone: optional(self.phone),
            image_link: optional(self.image_link),
            website: optional(self.website),
            facebook_link: optional(self.facebook_link),
            seeking_description: optional(self.seeking_description),
        })
    }

    /// Address, website, image and seeking fields are ignored here even if
    /// submitted.
    pub fn validate_edits(self) -> BookingResult<VenueEdits> {
        Ok(VenueEdits {
            name: required(self.name, "name")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            genres: required_genres(self.genres)?,
            phone: optional(self.phone),
            facebook_link: optional(self.facebook_link),
        })
    }
}

impl From<&venue::Model> for VenueForm {
    fn from(v: &venue::Model) -> Self {
        Self {
            name: Some(v.name.clone()),
            city: Some(v.city.clone()),
            state: Some(v.state.clone()),
            address: Some(v.address.clone()),
            phone: v.phone.clone(),
            image_link: v.image_link.clone(),
            genres: Some(GenresInput::List(v.genres.0.clone())),
            website: v.website.clone(),
            facebook_link: v.facebook_link.clone(),
            seeking_talent: Some(Checkbox::Flag(v.seeking_talent)),
            seeking_description: v.seeking_description.clone(),
        }
    }
}

// ─── Artist ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub genres: Option<GenresInput>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub seeking_venue: Option<Checkbox>,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewArtist {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub image_link: Option<String>,
    pub genres: GenreList,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistEdits {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub facebook_link: Option<String>,
    pub genres: GenreList,
}

impl ArtistForm {
    pub fn validate(self) -> BookingResult<NewArtist> {
        Ok(NewArtist {
            seeking_venue: checked(self.seeking_venue.as_ref(), "seeking_venue")?,
            name: required(self.name, "name")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            genres: required_genres(self.genres)?,
            phone: optional(self.phone),
            website: optional(self.website),
            image_link: optional(self.image_link),
            facebook_link: optional(self.facebook_link),
            seeking_description: optional(self.seeking_description),
        })
    }

    pub fn validate_edits(self) -> BookingResult<ArtistEdits> {
        Ok(ArtistEdits {
            name: required(self.name, "name")?,
            city: required(self.city, "city")?,
            state: required(self.state, "state")?,
            genres: required_genres(self.genres)?,
            phone: optional(self.phone),
            facebook_link: optional(self.facebook_link),
        })
    }
}

impl From<&artist::Model> for ArtistForm {
    fn from(a: &artist::Model) -> Self {
        Self {
            name: Some(a.name.clone()),
            city: Some(a.city.clone()),
            state: Some(a.state.clone()),
            phone: a.phone.clone(),
            website: a.website.clone(),
            image_link: a.image_link.clone(),
            genres: Some(GenresInput::List(a.genres.0.clone())),
            facebook_link: a.facebook_link.clone(),
            seeking_venue: Some(Checkbox::Flag(a.seeking_venue)),
            seeking_description: a.seeking_description.clone(),
        }
    }
}

// ─── Show ───────────────────────────────────────────────────────────

/// Ids may come through as numbers or as the text of a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormId {
    Number(i32),
    Text(String),
}

impl FormId {
    fn parse(&self, field: &str) -> BookingResult<i32> {
        match self {
            FormId::Number(n) => Ok(*n),
            FormId::Text(s) if s.trim().is_empty() => Err(BookingError::missing(field)),
            FormId::Text(s) => s.trim().parse().map_err(|_| {
                BookingError::Validation(format!("{field} must be an integer id"))
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowForm {
    #[serde(default)]
    pub artist_id: Option<FormId>,
    #[serde(default)]
    pub venue_id: Option<FormId>,
    #[serde(default)]
    pub start_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewShow {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<FixedOffset>,
}

impl ShowForm {
    pub fn validate(self) -> BookingResult<NewShow> {
        let artist_id = self
            .artist_id
            .ok_or_else(|| BookingError::missing("artist_id"))?
            .parse("artist_id")?;
        let venue_id = self
            .venue_id
            .ok_or_else(|| BookingError::missing("venue_id"))?
            .parse("venue_id")?;
        let start_time = parse_start_time(&required(self.start_time, "start_time")?)?;
        Ok(NewShow {
            artist_id,
            venue_id,
            start_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    fn venue_form() -> VenueForm {
        VenueForm {
            name: Some("The Musical Hop".into()),
            city: Some("San Francisco".into()),
            state: Some("CA".into()),
            address: Some("1015 Folsom Street".into()),
            phone: Some("123-123-1234".into()),
            image_link: None,
            genres: Some(GenresInput::List(vec!["Jazz".into(), "Reggae".into()])),
            website: Some("".into()),
            facebook_link: None,
            seeking_talent: None,
            seeking_description: None,
        }
    }

    #[test]
    fn test_checkbox_mapping() {
        for truthy in ["y", "Yes", "on", "TRUE", "1"] {
            assert!(Checkbox::Text(truthy.into()).is_checked("f").unwrap(), "{truthy}");
        }
        for falsy in ["n", "no", "Off", "false", "0", ""] {
            assert!(!Checkbox::Text(falsy.into()).is_checked("f").unwrap(), "{falsy}");
        }
        assert!(Checkbox::Flag(true).is_checked("f").unwrap());
        assert!(!Checkbox::Flag(false).is_checked("f").unwrap());
    }

    #[test]
    fn test_checkbox_rejects_unknown_text() {
        let err = Checkbox::Text("maybe".into()).is_checked("seeking_talent").unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert!(err.to_string().contains("seeking_talent"));
    }

    #[test]
    fn test_checkbox_other_json_values() {
        let form: VenueForm = serde_json::from_value(serde_json::json!({
            "seeking_talent": 5
        }))
        .unwrap();
        let err = form.validate().unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref m) if m.contains("seeking_talent")));

        assert!(Checkbox::Other(serde_json::json!(1)).is_checked("f").unwrap());
        assert!(!Checkbox::Other(serde_json::json!(0)).is_checked("f").unwrap());
        assert!(Checkbox::Other(serde_json::json!(["y"])).is_checked("f").is_err());
    }

    #[test]
    fn test_absent_checkbox_is_false() {
        let v = venue_form().validate().unwrap();
        assert!(!v.seeking_talent);
    }

    #[test]
    fn test_submitted_false_is_false() {
        let mut form = venue_form();
        form.seeking_talent = Some(Checkbox::Text("false".into()));
        assert!(!form.validate().unwrap().seeking_talent);
    }

    #[test]
    fn test_venue_validate_blank_optional_becomes_none() {
        let v = venue_form().validate().unwrap();
        assert_eq!(v.website, None);
        assert_eq!(v.phone.as_deref(), Some("123-123-1234"));
        assert_eq!(v.genres.0, vec!["Jazz", "Reggae"]);
    }

    #[test]
    fn test_venue_validate_missing_required() {
        let mut form = venue_form();
        form.address = Some("   ".into());
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation error: address is required");

        let mut form = venue_form();
        form.genres = Some(GenresInput::List(vec![]));
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation error: genres is required");
    }

    #[test]
    fn test_venue_edits_do_not_need_address() {
        let mut form = venue_form();
        form.address = None;
        let edits = form.validate_edits().unwrap();
        assert_eq!(edits.name, "The Musical Hop");
    }

    #[test]
    fn test_genres_accept_joined_string() {
        let json = r#"{"name":"Guns N Petals","city":"San Francisco","state":"CA","genres":"{Rock n Roll,Blues}"}"#;
        let form: ArtistForm = serde_json::from_str(json).unwrap();
        let artist = form.validate().unwrap();
        assert_eq!(artist.genres.0, vec!["Rock n Roll", "Blues"]);
    }

    #[test]
    fn test_artist_form_deserialize_checkbox_text() {
        let json = r#"{"name":"A","city":"B","state":"CA","genres":["Jazz"],"seeking_venue":"y"}"#;
        let form: ArtistForm = serde_json::from_str(json).unwrap();
        assert!(form.validate().unwrap().seeking_venue);
    }

    #[test]
    fn test_artist_form_missing_name() {
        let json = r#"{"city":"B","state":"CA","genres":["Jazz"]}"#;
        let form: ArtistForm = serde_json::from_str(json).unwrap();
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation error: name is required");
    }

    #[test]
    fn test_prefill_from_venue_round_trips_through_validate() {
        let model = venue::Model {
            id: 1,
            name: "The Musical Hop".into(),
            city: "San Francisco".into(),
            state: "CA".into(),
            address: "1015 Folsom Street".into(),
            phone: None,
            image_link: None,
            genres: GenreList::new(["Jazz"]),
            website: None,
            facebook_link: None,
            seeking_talent: true,
            seeking_description: Some("We are on the lookout".into()),
        };
        let v = VenueForm::from(&model).validate().unwrap();
        assert!(v.seeking_talent);
        assert_eq!(v.address, "1015 Folsom Street");
        assert_eq!(v.seeking_description.as_deref(), Some("We are on the lookout"));
    }

    #[test]
    fn test_parse_start_time_formats() {
        let expected = Utc.with_ymd_and_hms(2035, 4, 1, 20, 0, 0).unwrap();
        for raw in [
            "2035-04-01T20:00:00Z",
            "2035-04-01T22:00:00+02:00",
            "2035-04-01 20:00:00",
            "2035-04-01 20:00",
            "2035-04-01T20:00",
        ] {
            let t = parse_start_time(raw).unwrap();
            assert_eq!(t, expected, "{raw}");
        }
        assert_eq!(parse_start_time("2035-04-01 20:00").unwrap().hour(), 20);
    }

    #[test]
    fn test_parse_start_time_rejects_garbage() {
        assert!(matches!(
            parse_start_time("next tuesday"),
            Err(BookingError::Validation(_))
        ));
    }

    #[test]
    fn test_show_form_accepts_text_ids() {
        let json = r#"{"artist_id":"4","venue_id":1,"start_time":"2035-04-01 20:00:00"}"#;
        let form: ShowForm = serde_json::from_str(json).unwrap();
        let show = form.validate().unwrap();
        assert_eq!(show.artist_id, 4);
        assert_eq!(show.venue_id, 1);
    }

    #[test]
    fn test_show_form_missing_fields() {
        let err = ShowForm::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "validation error: artist_id is required");

        let form = ShowForm {
            artist_id: Some(FormId::Number(1)),
            venue_id: Some(FormId::Text("abc".into())),
            start_time: Some("2035-04-01 20:00".into()),
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation error: venue_id must be an integer id");

        let form = ShowForm {
            artist_id: Some(FormId::Number(1)),
            venue_id: Some(FormId::Number(1)),
            start_time: None,
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "validation error: start_time is required");
    }

    #[test]
    fn test_form_page_serialization() {
        let page = FormPage::new(VenueForm::default());
        let json = serde_json::to_value(&page).unwrap();
        assert!(json["form"]["name"].is_null());
        assert!(json.get("record_id").is_none());
        assert_eq!(json["genre_choices"].as_array().unwrap().len(), GENRE_CHOICES.len());
        assert!(json["state_choices"]
            .as_array()
            .unwrap()
            .iter()
            .any(|s| s == "CA"));
    }
}

//! Extractors whose rejections come back as `BookingError` documents
//! instead of axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::BookingError;

/// JSON body. Malformed or mistyped input is a validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BookingError))]
pub struct ApiJson<T>(pub T);

/// Path parameters. A segment that does not parse (`/venues/abc`) names
/// no record, so it is reported as not found.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BookingError))]
pub struct ApiPath<T>(pub T);

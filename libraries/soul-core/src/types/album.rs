//! Album listing types

use super::{AlbumId, TrackRef};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An album together with its ordered tracks, as returned by a resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumListing {
    pub id: AlbumId,
    pub name: String,
    pub artwork: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub tracks: Vec<TrackRef>,
}

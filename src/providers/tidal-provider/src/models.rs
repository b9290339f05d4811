//! Objects as returned by the Tidal SDK.
//!
//! Field names follow the Tidal v1 JSON payloads. Numeric ids are normalized to
//! strings on the way in so every id is handled as an opaque provider-scoped
//! value.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

fn available_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TidalArtistRef {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TidalAlbumRef {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TidalArtist {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Image id of the artist picture.
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalAlbum {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<TidalArtistRef>,
    #[serde(default)]
    pub artists: Vec<TidalArtistRef>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalTrack {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub artist: Option<TidalArtistRef>,
    #[serde(default)]
    pub artists: Vec<TidalArtistRef>,
    #[serde(default)]
    pub album: Option<TidalAlbumRef>,
    #[serde(default)]
    pub isrc: Option<String>,
    #[serde(default)]
    pub explicit: bool,
    /// False when the track cannot be streamed in the user's region/subscription.
    #[serde(rename = "streamReady", default = "available_by_default")]
    pub available: bool,
}

impl Default for TidalTrack {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: None,
            duration: None,
            track_number: None,
            artist: None,
            artists: Vec::new(),
            album: None,
            isrc: None,
            explicit: false,
            available: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TidalCreator {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TidalPlaylist {
    #[serde(rename = "uuid", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_of_tracks: Option<u32>,
    #[serde(default)]
    pub creator: Option<TidalCreator>,
    #[serde(default)]
    pub square_image: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Catalog search hits grouped per kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TidalSearchResults {
    #[serde(default)]
    pub artists: Vec<TidalArtist>,
    #[serde(default)]
    pub albums: Vec<TidalAlbum>,
    #[serde(default)]
    pub tracks: Vec<TidalTrack>,
    #[serde(default)]
    pub playlists: Vec<TidalPlaylist>,
}

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! provider_id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

provider_id_type!(
    /// A provider-scoped track identifier.
    ///
    /// Providers MUST treat this as an opaque, case-sensitive identifier that is
    /// stable across runs.
    TrackId
);
provider_id_type!(
    /// A provider-scoped album identifier.
    AlbumId
);
provider_id_type!(
    /// A provider-scoped artist identifier.
    ArtistId
);
provider_id_type!(
    /// A provider-scoped playlist identifier.
    PlaylistId
);

/// Kinds of media items the host understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Artist,
    Album,
    Track,
    Playlist,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Artist,
        MediaType::Album,
        MediaType::Track,
        MediaType::Playlist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Artist => "artist",
            MediaType::Album => "album",
            MediaType::Track => "track",
            MediaType::Playlist => "playlist",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaType::Artist => "Artist",
            MediaType::Album => "Album",
            MediaType::Track => "Track",
            MediaType::Playlist => "Playlist",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub provider_id: String,
    pub name: String,
    pub image_url: Option<String>,
}

/// The track metadata the host needs for library views and playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub provider_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Duration in seconds when known.
    pub duration_seconds: Option<u32>,
    /// Track number within album when known.
    pub track_number: Option<u32>,
    /// 1-based position within the listing that produced this track.
    pub position: Option<u32>,
    pub isrc: Option<String>,
    pub explicit: bool,
}

/// Minimal album metadata to support browse/detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub provider_id: String,
    pub title: String,
    pub artist: String,
    pub year: Option<u32>,
    pub track_count: Option<u32>,
    pub duration_seconds: Option<u32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub provider_id: String,
    pub name: String,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub track_count: Option<u32>,
    pub is_editable: bool,
    pub image_url: Option<String>,
}

/// Search results grouped per media kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
    pub playlists: Vec<Playlist>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
            && self.albums.is_empty()
            && self.tracks.is_empty()
            && self.playlists.is_empty()
    }
}

/// Audio container/codec of a resolved stream. Lossless FLAC is the only
/// format providers currently hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Flac,
}

/// Everything the host needs to start playback of a track. Providers return a
/// direct URL; the host reads and decodes the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDetails {
    pub item_id: TrackId,
    /// Instance id of the provider that resolved the stream.
    pub provider: String,
    pub content_type: ContentType,
    pub duration_seconds: Option<u32>,
    pub direct: String,
}

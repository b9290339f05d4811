//! Surface of the Tidal SDK the provider is written against.
//!
//! Network transport and OAuth live behind these traits; the provider only
//! sequences calls and translates results.

use crate::models::{TidalAlbum, TidalArtist, TidalPlaylist, TidalSearchResults, TidalTrack};
use crate::session::SessionCredentials;
use async_trait::async_trait;
use chorus_core::models::MediaType;
use chorus_core::provider::ProviderError;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("tidal resource not found: {resource}")]
    NotFound { resource: String },
    #[error("tidal authentication failed: {message}")]
    Auth { message: String },
    #[error("tidal request failed: {message}")]
    Transport { message: String },
}

impl From<SdkError> for ProviderError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::NotFound { .. } => ProviderError::NotFound {
                message: err.to_string(),
            },
            SdkError::Auth { message } => ProviderError::AuthenticationError { message },
            SdkError::Transport { message } => ProviderError::NetworkError { message },
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;

/// Release groups listed on an artist page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtistAlbumKind {
    Albums,
    EpsAndSingles,
    Other,
}

/// An authenticated SDK session.
pub trait SessionHandle: Send + Sync + 'static {
    fn access_token(&self) -> &str;

    fn refresh_token(&self) -> &str;

    fn expiry_time(&self) -> DateTime<Utc>;

    fn user_id(&self) -> &str;
}

/// Establishes sessions from stored credentials, refreshing tokens as needed.
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: SessionHandle;

    async fn open_session(&self, credentials: &SessionCredentials) -> SdkResult<Self::Session>;
}

/// Catalog and library calls available on an authenticated session.
///
/// Single-object lookups return `Ok(None)` when the object does not exist.
#[async_trait]
pub trait TidalCatalog: SessionHandle {
    async fn favorite_artists(&self, user_id: &str) -> SdkResult<Vec<TidalArtist>>;

    async fn favorite_albums(&self, user_id: &str) -> SdkResult<Vec<TidalAlbum>>;

    async fn favorite_tracks(&self, user_id: &str) -> SdkResult<Vec<TidalTrack>>;

    /// Playlists the user created followed by the ones they favourited.
    async fn user_playlists(&self, user_id: &str) -> SdkResult<Vec<TidalPlaylist>>;

    async fn artist(&self, artist_id: &str) -> SdkResult<Option<TidalArtist>>;

    async fn album(&self, album_id: &str) -> SdkResult<Option<TidalAlbum>>;

    async fn track(&self, track_id: &str) -> SdkResult<Option<TidalTrack>>;

    async fn playlist(&self, playlist_id: &str) -> SdkResult<Option<TidalPlaylist>>;

    async fn album_tracks(&self, album_id: &str) -> SdkResult<Vec<TidalTrack>>;

    async fn artist_albums(
        &self,
        artist_id: &str,
        kind: ArtistAlbumKind,
    ) -> SdkResult<Vec<TidalAlbum>>;

    async fn artist_top_tracks(&self, artist_id: &str, limit: u32) -> SdkResult<Vec<TidalTrack>>;

    async fn playlist_tracks(&self, playlist_id: &str) -> SdkResult<Vec<TidalTrack>>;

    async fn similar_tracks(&self, track_id: &str, limit: u32) -> SdkResult<Vec<TidalTrack>>;

    /// Direct, time-limited stream URL for a track.
    async fn track_url(&self, track_id: &str) -> SdkResult<String>;

    async fn search(
        &self,
        query: &str,
        media_types: &[MediaType],
        limit: u32,
    ) -> SdkResult<TidalSearchResults>;

    async fn add_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        media_type: MediaType,
    ) -> SdkResult<()>;

    async fn remove_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        media_type: MediaType,
    ) -> SdkResult<()>;

    async fn add_playlist_tracks(&self, playlist_id: &str, track_ids: &[String]) -> SdkResult<()>;

    async fn remove_playlist_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> SdkResult<()>;

    async fn create_playlist(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
    ) -> SdkResult<TidalPlaylist>;
}

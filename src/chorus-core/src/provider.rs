use crate::models::{
    Album, AlbumId, Artist, ArtistId, MediaType, Playlist, PlaylistId, SearchResults,
    StreamDetails, Track, TrackId,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Feature flags a provider advertises to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFeature {
    LibraryArtists,
    LibraryAlbums,
    LibraryTracks,
    LibraryPlaylists,
    ArtistAlbums,
    ArtistTopTracks,
    Search,
    LibraryArtistsEdit,
    LibraryAlbumsEdit,
    LibraryTracksEdit,
    LibraryPlaylistsEdit,
    PlaylistCreate,
    SimilarTracks,
    Browse,
    PlaylistTracksEdit,
}

/// Common categories of provider failures surfaced to the host.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {message}")]
    NetworkError { message: String },
    #[error("authentication error: {message}")]
    AuthenticationError { message: String },
    #[error("{message}")]
    NotFound { message: String },
    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },
    #[error("{message}")]
    Other { message: String },
}

impl ProviderError {
    pub fn not_supported(operation: &str) -> Self {
        ProviderError::NotSupported {
            operation: operation.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Outcome of resolving a single entity.
///
/// Translation from provider objects reports a missing or unusable entity as
/// `NotFound` with a reason instead of failing; callers decide how to surface
/// it via [`Lookup::or_not_found`] or [`Lookup::into_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound(String),
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(found) => Lookup::Found(f(found)),
            Lookup::NotFound(reason) => Lookup::NotFound(reason),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Keeps the translation reason as the error message.
    pub fn into_result(self) -> ProviderResult<T> {
        match self {
            Lookup::Found(found) => Ok(found),
            Lookup::NotFound(message) => Err(ProviderError::NotFound { message }),
        }
    }

    /// Replaces the reason with one naming the requested entity.
    pub fn or_not_found(self, kind: MediaType, id: &str) -> ProviderResult<T> {
        match self {
            Lookup::Found(found) => Ok(found),
            Lookup::NotFound(reason) => {
                tracing::debug!(kind = %kind, id, reason = %reason, "entity lookup failed");
                Err(ProviderError::NotFound {
                    message: format!("{kind} {id} not found"),
                })
            }
        }
    }
}

/// Music provider contract consumed by the host aggregator.
///
/// Providers return **stream details only**; playback is handled by the host.
/// Listing operations return lazy streams: no provider call is made until the
/// stream is first polled, and a stream may be dropped at any point.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Provider instance identifier; stamped on every entity the provider returns.
    fn instance_id(&self) -> &str;

    /// Human-friendly provider name.
    fn name(&self) -> &str;

    fn supported_features(&self) -> &[ProviderFeature];

    fn supports(&self, feature: ProviderFeature) -> bool {
        self.supported_features().contains(&feature)
    }

    /// Searches the catalog. An empty `media_types` slice means every kind;
    /// `limit` applies per kind.
    async fn search(
        &self,
        query: &str,
        media_types: &[MediaType],
        limit: u32,
    ) -> ProviderResult<SearchResults>;

    async fn get_track(&self, track_id: &TrackId) -> ProviderResult<Track>;

    /// Returns playable stream details for the given track.
    async fn get_stream_details(&self, track_id: &TrackId) -> ProviderResult<StreamDetails>;

    fn get_library_artists(&self) -> BoxStream<'_, ProviderResult<Artist>> {
        unsupported_stream("get_library_artists")
    }

    fn get_library_albums(&self) -> BoxStream<'_, ProviderResult<Album>> {
        unsupported_stream("get_library_albums")
    }

    fn get_library_tracks(&self) -> BoxStream<'_, ProviderResult<Track>> {
        unsupported_stream("get_library_tracks")
    }

    fn get_library_playlists(&self) -> BoxStream<'_, ProviderResult<Playlist>> {
        unsupported_stream("get_library_playlists")
    }

    fn get_playlist_tracks(
        &self,
        _playlist_id: &PlaylistId,
    ) -> BoxStream<'_, ProviderResult<Track>> {
        unsupported_stream("get_playlist_tracks")
    }

    async fn get_artist(&self, _artist_id: &ArtistId) -> ProviderResult<Artist> {
        Err(ProviderError::not_supported("get_artist"))
    }

    async fn get_album(&self, _album_id: &AlbumId) -> ProviderResult<Album> {
        Err(ProviderError::not_supported("get_album"))
    }

    async fn get_playlist(&self, _playlist_id: &PlaylistId) -> ProviderResult<Playlist> {
        Err(ProviderError::not_supported("get_playlist"))
    }

    async fn get_album_tracks(&self, _album_id: &AlbumId) -> ProviderResult<Vec<Track>> {
        Err(ProviderError::not_supported("get_album_tracks"))
    }

    async fn get_artist_albums(&self, _artist_id: &ArtistId) -> ProviderResult<Vec<Album>> {
        Err(ProviderError::not_supported("get_artist_albums"))
    }

    async fn get_artist_toptracks(&self, _artist_id: &ArtistId) -> ProviderResult<Vec<Track>> {
        Err(ProviderError::not_supported("get_artist_toptracks"))
    }

    async fn get_similar_tracks(
        &self,
        _track_id: &TrackId,
        _limit: u32,
    ) -> ProviderResult<Vec<Track>> {
        Err(ProviderError::not_supported("get_similar_tracks"))
    }

    async fn library_add(&self, _item_id: &str, _media_type: MediaType) -> ProviderResult<()> {
        Err(ProviderError::not_supported("library_add"))
    }

    async fn library_remove(&self, _item_id: &str, _media_type: MediaType) -> ProviderResult<()> {
        Err(ProviderError::not_supported("library_remove"))
    }

    async fn add_playlist_tracks(
        &self,
        _playlist_id: &PlaylistId,
        _track_ids: &[TrackId],
    ) -> ProviderResult<()> {
        Err(ProviderError::not_supported("add_playlist_tracks"))
    }

    /// Removes the tracks at the given 1-based positions.
    async fn remove_playlist_tracks(
        &self,
        _playlist_id: &PlaylistId,
        _positions: &[u32],
    ) -> ProviderResult<()> {
        Err(ProviderError::not_supported("remove_playlist_tracks"))
    }

    async fn create_playlist(&self, _name: &str) -> ProviderResult<Playlist> {
        Err(ProviderError::not_supported("create_playlist"))
    }
}

fn unsupported_stream<'a, T: Send + 'a>(operation: &str) -> BoxStream<'a, ProviderResult<T>> {
    stream::once(futures::future::ready(Err(ProviderError::not_supported(
        operation,
    ))))
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_not_found_names_kind_and_id() {
        let lookup: Lookup<Track> = Lookup::NotFound("missing title".into());
        let err = lookup.or_not_found(MediaType::Track, "missing-id").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Track missing-id not found");
    }

    #[test]
    fn into_result_keeps_reason() {
        let lookup: Lookup<u32> = Lookup::NotFound("no such thing".into());
        let err = lookup.into_result().unwrap_err();
        assert_eq!(err.to_string(), "no such thing");
    }

    #[test]
    fn map_keeps_not_found_reason() {
        assert_eq!(Lookup::Found(2).map(|n| n * 2), Lookup::Found(4));
        let missing: Lookup<u32> = Lookup::NotFound("gone".into());
        assert_eq!(missing.map(|n| n + 1), Lookup::NotFound("gone".into()));
    }
}

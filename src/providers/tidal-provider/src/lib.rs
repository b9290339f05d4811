//! Tidal music provider for the Chorus aggregator.
//!
//! The provider keeps one authenticated SDK session per instance, translates
//! Tidal catalog objects into host entities and resolves direct stream URLs.
//! The SDK itself is reached through the traits in [`sdk`].

pub mod mapping;
pub mod models;
pub mod sdk;
pub mod session;

use chorus_core::config::ProviderSettings;
use chorus_core::context::ProviderContext;
use chorus_core::host::{ConfigEntry, HostDatabase};
use chorus_core::models::{
    Album, AlbumId, Artist, ArtistId, ContentType, MediaType, Playlist, PlaylistId,
    SearchResults, StreamDetails, Track, TrackId,
};
use chorus_core::provider::{
    Lookup, MusicProvider, ProviderError, ProviderFeature, ProviderResult,
};
use chrono::Duration;
use futures::stream::{self, BoxStream, StreamExt};
use futures::{Future, TryFutureExt};
use sdk::{ArtistAlbumKind, SdkError, SdkResult, SessionFactory, TidalCatalog};
use session::{
    CurrentSession, SessionCredentials, SessionManager, ACCESS_TOKEN_KEY, EXPIRY_TIME_KEY,
    REFRESH_TOKEN_KEY, USER_ID_KEY,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const PROVIDER_NAME: &str = "Tidal";
pub const PROVIDER_DOMAIN: &str = "tidal";

pub const SUPPORTED_FEATURES: &[ProviderFeature] = &[
    ProviderFeature::LibraryArtists,
    ProviderFeature::LibraryAlbums,
    ProviderFeature::LibraryTracks,
    ProviderFeature::LibraryPlaylists,
    ProviderFeature::ArtistAlbums,
    ProviderFeature::ArtistTopTracks,
    ProviderFeature::Search,
    ProviderFeature::LibraryArtistsEdit,
    ProviderFeature::LibraryAlbumsEdit,
    ProviderFeature::LibraryTracksEdit,
    ProviderFeature::LibraryPlaylistsEdit,
    ProviderFeature::PlaylistCreate,
    ProviderFeature::SimilarTracks,
    ProviderFeature::Browse,
    ProviderFeature::PlaylistTracksEdit,
];

const ARTIST_ALBUM_KINDS: [ArtistAlbumKind; 3] = [
    ArtistAlbumKind::Albums,
    ArtistAlbumKind::EpsAndSingles,
    ArtistAlbumKind::Other,
];

/// Configuration schema registered with the host. All values are written by
/// the provider itself after login.
pub fn config_entries() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::hidden_string(USER_ID_KEY, "User ID"),
        ConfigEntry::hidden_string(ACCESS_TOKEN_KEY, "Access Token"),
        ConfigEntry::hidden_string(REFRESH_TOKEN_KEY, "Refresh Token"),
        ConfigEntry::hidden_string(EXPIRY_TIME_KEY, "Expiry Time"),
    ]
}

pub struct TidalProvider<F: SessionFactory> {
    instance_id: String,
    settings: ProviderSettings,
    cache_dir: PathBuf,
    session: SessionManager<F>,
    database: Arc<dyn HostDatabase>,
}

impl<F> TidalProvider<F>
where
    F: SessionFactory,
    F::Session: TidalCatalog,
{
    /// Builds a provider from the credentials stored for the context's
    /// instance and logs in. An error here means the instance cannot be
    /// started.
    pub async fn setup(factory: F, context: ProviderContext) -> ProviderResult<Self> {
        let cache_dir = context.cache_dir()?;
        let ProviderContext {
            instance_id,
            settings,
            config,
            database,
            ..
        } = context;
        let credentials = SessionCredentials::load(config.as_ref(), &instance_id)?;
        let refresh_margin = Duration::minutes(i64::from(settings.refresh_margin_minutes));
        let provider = Self {
            session: SessionManager::new(
                instance_id.clone(),
                factory,
                config,
                credentials,
                refresh_margin,
            ),
            instance_id,
            settings,
            cache_dir,
            database,
        };
        provider.login().await.map_err(|err| {
            tracing::error!(provider = %provider.instance_id, error = %err, "tidal setup failed");
            err
        })?;
        tracing::info!(
            provider = %provider.instance_id,
            cache_dir = %provider.cache_dir.display(),
            "tidal provider ready"
        );
        Ok(provider)
    }

    /// Makes sure a session valid beyond the refresh margin is established.
    pub async fn login(&self) -> ProviderResult<()> {
        self.session.ensure_session().await.map(|_| ())
    }

    pub fn session(&self) -> &SessionManager<F> {
        &self.session
    }

    /// Per-instance cache directory handed out by the host.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    async fn current(&self) -> ProviderResult<CurrentSession<F::Session>> {
        self.session.current().await
    }

    fn track_listing<'a, Fut>(&'a self, fetch: Fut) -> BoxStream<'a, ProviderResult<Track>>
    where
        Fut: Future<Output = ProviderResult<Vec<models::TidalTrack>>> + Send + 'a,
    {
        let provider_id = self.instance_id.clone();
        let positioned =
            fetch.map_ok(move |tracks| mapping::positioned_tracks(tracks, provider_id));
        lazy_listing(positioned)
    }

    fn collect_tracks(
        &self,
        tracks: SdkResult<Vec<models::TidalTrack>>,
    ) -> ProviderResult<Vec<Track>> {
        mapping::positioned_tracks(tracks?, self.instance_id.clone()).collect()
    }
}

/// Defers `fetch` until first poll, then yields its items one by one.
fn lazy_listing<'a, T, I, Fut>(fetch: Fut) -> BoxStream<'a, ProviderResult<T>>
where
    T: Send + 'a,
    I: Iterator<Item = ProviderResult<T>> + Send + 'a,
    Fut: Future<Output = ProviderResult<I>> + Send + 'a,
{
    fetch.map_ok(stream::iter).try_flatten_stream().boxed()
}

/// Folds a missing SDK object into `Lookup::NotFound`; other failures
/// propagate.
fn lookup<T, U>(
    fetched: SdkResult<Option<T>>,
    translate: impl FnOnce(&T) -> Lookup<U>,
) -> ProviderResult<Lookup<U>> {
    match fetched {
        Ok(Some(object)) => Ok(translate(&object)),
        Ok(None) => Ok(Lookup::NotFound("no object returned".into())),
        Err(err @ SdkError::NotFound { .. }) => Ok(Lookup::NotFound(err.to_string())),
        Err(err) => Err(err.into()),
    }
}

/// Search hits that fail translation are dropped.
fn found_only<T, U>(objects: &[T], translate: impl Fn(&T) -> Lookup<U>) -> Vec<U> {
    objects
        .iter()
        .filter_map(|object| match translate(object) {
            Lookup::Found(found) => Some(found),
            Lookup::NotFound(_) => None,
        })
        .collect()
}

#[async_trait::async_trait]
impl<F> MusicProvider for TidalProvider<F>
where
    F: SessionFactory,
    F::Session: TidalCatalog,
{
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn supported_features(&self) -> &[ProviderFeature] {
        SUPPORTED_FEATURES
    }

    async fn search(
        &self,
        query: &str,
        media_types: &[MediaType],
        limit: u32,
    ) -> ProviderResult<SearchResults> {
        let session = self.current().await?;
        let query = query.replace('\'', "");
        let media_types: &[MediaType] = if media_types.is_empty() {
            &MediaType::ALL
        } else {
            media_types
        };
        let limit = if limit == 0 {
            self.settings.search_limit
        } else {
            limit
        };

        let found = session.handle.search(&query, media_types, limit).await?;
        let id = self.instance_id.as_str();
        let results = SearchResults {
            artists: found_only(&found.artists, |a| mapping::parse_artist(a, id)),
            albums: found_only(&found.albums, |a| mapping::parse_album(a, id)),
            tracks: found_only(&found.tracks, |t| mapping::parse_track(t, id)),
            playlists: found_only(&found.playlists, |p| {
                mapping::parse_playlist(p, id, Some(&session.user_id))
            }),
        };
        tracing::debug!(
            provider = %self.instance_id,
            query = %query,
            artists = results.artists.len(),
            albums = results.albums.len(),
            tracks = results.tracks.len(),
            playlists = results.playlists.len(),
            "tidal search finished"
        );
        Ok(results)
    }

    async fn get_track(&self, track_id: &TrackId) -> ProviderResult<Track> {
        let session = self.current().await?;
        let fetched = session.handle.track(track_id.as_ref()).await;
        lookup(fetched, |t| mapping::parse_track(t, &self.instance_id))?
            .or_not_found(MediaType::Track, track_id.as_ref())
    }

    async fn get_stream_details(&self, track_id: &TrackId) -> ProviderResult<StreamDetails> {
        let session = self.current().await?;
        let (track, direct) = futures::try_join!(
            async {
                let fetched = session.handle.track(track_id.as_ref()).await;
                lookup(fetched, |t| mapping::parse_track(t, &self.instance_id))?
                    .or_not_found(MediaType::Track, track_id.as_ref())
            },
            session
                .handle
                .track_url(track_id.as_ref())
                .map_err(ProviderError::from),
        )?;

        self.session.ensure_session().await?;
        tracing::debug!(
            provider = %self.instance_id,
            track_id = %track_id,
            "resolved stream url"
        );
        Ok(StreamDetails {
            item_id: track.id,
            provider: self.instance_id.clone(),
            content_type: ContentType::Flac,
            duration_seconds: track.duration_seconds,
            direct,
        })
    }

    fn get_library_artists(&self) -> BoxStream<'_, ProviderResult<Artist>> {
        lazy_listing(async move {
            let session = self.current().await?;
            let artists = session.handle.favorite_artists(&session.user_id).await?;
            let provider_id = self.instance_id.clone();
            let parsed = artists
                .into_iter()
                .map(move |a| mapping::parse_artist(&a, &provider_id).into_result());
            Ok::<_, ProviderError>(parsed)
        })
    }

    fn get_library_albums(&self) -> BoxStream<'_, ProviderResult<Album>> {
        lazy_listing(async move {
            let session = self.current().await?;
            let albums = session.handle.favorite_albums(&session.user_id).await?;
            let provider_id = self.instance_id.clone();
            let parsed = albums
                .into_iter()
                .map(move |a| mapping::parse_album(&a, &provider_id).into_result());
            Ok::<_, ProviderError>(parsed)
        })
    }

    fn get_library_tracks(&self) -> BoxStream<'_, ProviderResult<Track>> {
        self.track_listing(async move {
            let session = self.current().await?;
            let tracks = session.handle.favorite_tracks(&session.user_id).await?;
            Ok::<_, ProviderError>(tracks)
        })
    }

    fn get_library_playlists(&self) -> BoxStream<'_, ProviderResult<Playlist>> {
        lazy_listing(async move {
            let session = self.current().await?;
            let playlists = session.handle.user_playlists(&session.user_id).await?;
            let provider_id = self.instance_id.clone();
            let user_id = session.user_id;
            let parsed = playlists.into_iter().map(move |p| {
                mapping::parse_playlist(&p, &provider_id, Some(&user_id)).into_result()
            });
            Ok::<_, ProviderError>(parsed)
        })
    }

    fn get_playlist_tracks(
        &self,
        playlist_id: &PlaylistId,
    ) -> BoxStream<'_, ProviderResult<Track>> {
        let playlist_id = playlist_id.clone();
        self.track_listing(async move {
            let session = self.current().await?;
            let tracks = session.handle.playlist_tracks(playlist_id.as_ref()).await?;
            Ok::<_, ProviderError>(tracks)
        })
    }

    async fn get_artist(&self, artist_id: &ArtistId) -> ProviderResult<Artist> {
        let session = self.current().await?;
        let fetched = session.handle.artist(artist_id.as_ref()).await;
        lookup(fetched, |a| mapping::parse_artist(a, &self.instance_id))?
            .or_not_found(MediaType::Artist, artist_id.as_ref())
    }

    async fn get_album(&self, album_id: &AlbumId) -> ProviderResult<Album> {
        let session = self.current().await?;
        let fetched = session.handle.album(album_id.as_ref()).await;
        lookup(fetched, |a| mapping::parse_album(a, &self.instance_id))?
            .or_not_found(MediaType::Album, album_id.as_ref())
    }

    async fn get_playlist(&self, playlist_id: &PlaylistId) -> ProviderResult<Playlist> {
        let session = self.current().await?;
        let fetched = session.handle.playlist(playlist_id.as_ref()).await;
        lookup(fetched, |p| {
            mapping::parse_playlist(p, &self.instance_id, Some(&session.user_id))
        })?
        .or_not_found(MediaType::Playlist, playlist_id.as_ref())
    }

    async fn get_album_tracks(&self, album_id: &AlbumId) -> ProviderResult<Vec<Track>> {
        let session = self.current().await?;
        let tracks = session.handle.album_tracks(album_id.as_ref()).await;
        self.collect_tracks(tracks)
    }

    async fn get_artist_albums(&self, artist_id: &ArtistId) -> ProviderResult<Vec<Album>> {
        let session = self.current().await?;
        let mut albums = Vec::new();
        for kind in ARTIST_ALBUM_KINDS {
            let batch = session.handle.artist_albums(artist_id.as_ref(), kind).await?;
            for album in &batch {
                albums.push(mapping::parse_album(album, &self.instance_id).into_result()?);
            }
        }
        Ok(albums)
    }

    async fn get_artist_toptracks(&self, artist_id: &ArtistId) -> ProviderResult<Vec<Track>> {
        let session = self.current().await?;
        let tracks = session
            .handle
            .artist_top_tracks(artist_id.as_ref(), self.settings.top_tracks_limit)
            .await;
        self.collect_tracks(tracks)
    }

    async fn get_similar_tracks(
        &self,
        track_id: &TrackId,
        limit: u32,
    ) -> ProviderResult<Vec<Track>> {
        let session = self.current().await?;
        let limit = if limit == 0 {
            self.settings.similar_tracks_limit
        } else {
            limit
        };
        let tracks = session.handle.similar_tracks(track_id.as_ref(), limit).await;
        self.collect_tracks(tracks)
    }

    async fn library_add(&self, item_id: &str, media_type: MediaType) -> ProviderResult<()> {
        let session = self.current().await?;
        session
            .handle
            .add_favorite(&session.user_id, item_id, media_type)
            .await?;
        tracing::info!(
            provider = %self.instance_id,
            item_id,
            kind = %media_type,
            "added to tidal library"
        );
        Ok(())
    }

    async fn library_remove(&self, item_id: &str, media_type: MediaType) -> ProviderResult<()> {
        let session = self.current().await?;
        session
            .handle
            .remove_favorite(&session.user_id, item_id, media_type)
            .await?;
        tracing::info!(
            provider = %self.instance_id,
            item_id,
            kind = %media_type,
            "removed from tidal library"
        );
        Ok(())
    }

    async fn add_playlist_tracks(
        &self,
        playlist_id: &PlaylistId,
        track_ids: &[TrackId],
    ) -> ProviderResult<()> {
        let session = self.current().await?;
        let ids: Vec<String> = track_ids.iter().map(ToString::to_string).collect();
        session
            .handle
            .add_playlist_tracks(playlist_id.as_ref(), &ids)
            .await?;
        tracing::debug!(
            provider = %self.instance_id,
            playlist_id = %playlist_id,
            count = ids.len(),
            "added playlist tracks"
        );
        Ok(())
    }

    async fn remove_playlist_tracks(
        &self,
        playlist_id: &PlaylistId,
        positions: &[u32],
    ) -> ProviderResult<()> {
        let wanted: HashSet<u32> = positions.iter().copied().collect();
        let mut ids = Vec::with_capacity(wanted.len());
        let mut tracks = self.get_playlist_tracks(playlist_id);
        while ids.len() < wanted.len() {
            let Some(track) = tracks.next().await else {
                break;
            };
            let track = track?;
            if track.position.is_some_and(|p| wanted.contains(&p)) {
                ids.push(track.id.to_string());
            }
        }
        drop(tracks);

        if ids.is_empty() {
            tracing::debug!(
                provider = %self.instance_id,
                playlist_id = %playlist_id,
                "no playlist positions matched"
            );
            return Ok(());
        }
        let session = self.current().await?;
        session
            .handle
            .remove_playlist_tracks(playlist_id.as_ref(), &ids)
            .await?;
        tracing::debug!(
            provider = %self.instance_id,
            playlist_id = %playlist_id,
            count = ids.len(),
            "removed playlist tracks"
        );
        Ok(())
    }

    async fn create_playlist(&self, name: &str) -> ProviderResult<Playlist> {
        let session = self.current().await?;
        let created = session
            .handle
            .create_playlist(&session.user_id, name, "")
            .await?;
        let playlist =
            mapping::parse_playlist(&created, &self.instance_id, Some(&session.user_id))
                .into_result()?;
        let stored = self.database.add_playlist(playlist).await?;
        tracing::info!(
            provider = %self.instance_id,
            playlist_id = %stored.id,
            "created tidal playlist"
        );
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_schema_is_four_hidden_strings() {
        let entries = config_entries();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.hidden && !e.required));
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["username", "access_token", "refresh_token", "expiry_time"]
        );
    }

    #[test]
    fn lookup_folds_missing_objects() {
        let absent: SdkResult<Option<u8>> = Ok(None);
        assert!(!lookup(absent, |v| Lookup::Found(*v)).unwrap().is_found());

        let gone: SdkResult<Option<u8>> = Err(SdkError::NotFound {
            resource: "track 1".into(),
        });
        assert!(!lookup(gone, |v| Lookup::Found(*v)).unwrap().is_found());

        let broken: SdkResult<Option<u8>> = Err(SdkError::Transport {
            message: "reset".into(),
        });
        assert!(matches!(
            lookup(broken, |v| Lookup::Found(*v)),
            Err(ProviderError::NetworkError { .. })
        ));
    }

    #[test]
    fn found_only_skips_untranslatable_hits() {
        let kept = found_only(&[1, 2, 3, 4], |n| {
            if n % 2 == 0 {
                Lookup::Found(*n)
            } else {
                Lookup::NotFound("odd".into())
            }
        });
        assert_eq!(kept, vec![2, 4]);
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use chorus_core::config::Config;
use chorus_core::context::ProviderContext;
use chorus_core::host::{HostDatabase, HostResult, MemoryConfigStore};
use chorus_core::models::{MediaType, Playlist};
use chorus_core::paths::AppDirs;
use chorus_core::provider::ProviderResult;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tidal_provider::models::{
    TidalAlbum, TidalArtist, TidalArtistRef, TidalCreator, TidalPlaylist, TidalSearchResults,
    TidalTrack,
};
use tidal_provider::sdk::{
    ArtistAlbumKind, SdkError, SdkResult, SessionFactory, SessionHandle, TidalCatalog,
};
use tidal_provider::session::SessionCredentials;
use tidal_provider::TidalProvider;

pub const INSTANCE_ID: &str = "tidal--fake";
pub const USER_ID: &str = "1234";
pub const PLAYLIST_ID: &str = "pl-1";

/// Backing data and call log shared by the fake factory and its sessions.
#[derive(Default)]
pub struct FakeState {
    /// Lifetime of the next session handed out, in minutes.
    pub session_ttl_minutes: i64,
    /// Scripted login failures, consumed before any success.
    pub login_failures: VecDeque<SdkError>,
    pub logins: usize,
    pub login_credentials: Vec<SessionCredentials>,
    pub calls: Vec<String>,

    pub artists: Vec<TidalArtist>,
    pub albums: Vec<TidalAlbum>,
    pub tracks: Vec<TidalTrack>,
    pub favorite_tracks: Vec<TidalTrack>,
    pub playlists: Vec<TidalPlaylist>,
    pub playlist_tracks: HashMap<String, Vec<TidalTrack>>,
    pub artist_albums: HashMap<ArtistAlbumKind, Vec<TidalAlbum>>,

    pub searches: Vec<(String, Vec<MediaType>, u32)>,
    pub favorites_added: Vec<(String, String, MediaType)>,
    pub favorites_removed: Vec<(String, String, MediaType)>,
    pub tracks_added: Vec<(String, Vec<String>)>,
    pub tracks_removed: Vec<(String, Vec<String>)>,
    pub created_playlists: Vec<String>,
    pub similar_limits: Vec<u32>,
}

pub type Shared = Arc<Mutex<FakeState>>;

#[derive(Clone)]
pub struct FakeTidal {
    pub state: Shared,
}

#[derive(Debug)]
pub struct FakeSession {
    access_token: String,
    refresh_token: String,
    expiry_time: DateTime<Utc>,
    user_id: String,
    state: Shared,
}

impl FakeSession {
    fn record(&self, call: &str) {
        self.state.lock().unwrap().calls.push(call.to_string());
    }

    fn with_state<T>(&self, call: &str, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        f(&mut state)
    }
}

impl std::fmt::Debug for FakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeState")
            .field("logins", &self.logins)
            .field("calls", &self.calls)
            .finish()
    }
}

#[async_trait]
impl SessionFactory for FakeTidal {
    type Session = FakeSession;

    async fn open_session(&self, credentials: &SessionCredentials) -> SdkResult<FakeSession> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.calls.push("login".into());
        state.login_credentials.push(credentials.clone());
        if let Some(err) = state.login_failures.pop_front() {
            return Err(err);
        }
        state.logins += 1;
        let generation = state.logins;
        Ok(FakeSession {
            access_token: format!("access-{generation}"),
            refresh_token: format!("refresh-{generation}"),
            expiry_time: Utc::now() + Duration::minutes(state.session_ttl_minutes),
            user_id: USER_ID.into(),
            state: Arc::clone(&self.state),
        })
    }
}

impl SessionHandle for FakeSession {
    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    fn expiry_time(&self) -> DateTime<Utc> {
        self.expiry_time
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl TidalCatalog for FakeSession {
    async fn favorite_artists(&self, _user_id: &str) -> SdkResult<Vec<TidalArtist>> {
        Ok(self.with_state("favorite_artists", |s| s.artists.clone()))
    }

    async fn favorite_albums(&self, _user_id: &str) -> SdkResult<Vec<TidalAlbum>> {
        Ok(self.with_state("favorite_albums", |s| s.albums.clone()))
    }

    async fn favorite_tracks(&self, _user_id: &str) -> SdkResult<Vec<TidalTrack>> {
        Ok(self.with_state("favorite_tracks", |s| s.favorite_tracks.clone()))
    }

    async fn user_playlists(&self, _user_id: &str) -> SdkResult<Vec<TidalPlaylist>> {
        Ok(self.with_state("user_playlists", |s| s.playlists.clone()))
    }

    async fn artist(&self, artist_id: &str) -> SdkResult<Option<TidalArtist>> {
        Ok(self.with_state("artist", |s| {
            s.artists.iter().find(|a| a.id == artist_id).cloned()
        }))
    }

    async fn album(&self, album_id: &str) -> SdkResult<Option<TidalAlbum>> {
        Ok(self.with_state("album", |s| {
            s.albums.iter().find(|a| a.id == album_id).cloned()
        }))
    }

    async fn track(&self, track_id: &str) -> SdkResult<Option<TidalTrack>> {
        Ok(self.with_state("track", |s| {
            s.tracks.iter().find(|t| t.id == track_id).cloned()
        }))
    }

    async fn playlist(&self, playlist_id: &str) -> SdkResult<Option<TidalPlaylist>> {
        self.with_state("playlist", |s| {
            match s.playlists.iter().find(|p| p.id == playlist_id) {
                Some(found) => Ok(Some(found.clone())),
                None => Err(SdkError::NotFound {
                    resource: format!("playlist {playlist_id}"),
                }),
            }
        })
    }

    async fn album_tracks(&self, album_id: &str) -> SdkResult<Vec<TidalTrack>> {
        Ok(self.with_state("album_tracks", |s| {
            s.tracks
                .iter()
                .filter(|t| t.album.as_ref().is_some_and(|a| a.id == album_id))
                .cloned()
                .collect()
        }))
    }

    async fn artist_albums(
        &self,
        _artist_id: &str,
        kind: ArtistAlbumKind,
    ) -> SdkResult<Vec<TidalAlbum>> {
        Ok(self.with_state("artist_albums", |s| {
            s.artist_albums.get(&kind).cloned().unwrap_or_default()
        }))
    }

    async fn artist_top_tracks(
        &self,
        _artist_id: &str,
        limit: u32,
    ) -> SdkResult<Vec<TidalTrack>> {
        Ok(self.with_state("artist_top_tracks", |s| {
            s.tracks.iter().take(limit as usize).cloned().collect()
        }))
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> SdkResult<Vec<TidalTrack>> {
        self.with_state("playlist_tracks", |s| {
            s.playlist_tracks
                .get(playlist_id)
                .cloned()
                .ok_or_else(|| SdkError::NotFound {
                    resource: format!("playlist {playlist_id}"),
                })
        })
    }

    async fn similar_tracks(&self, _track_id: &str, limit: u32) -> SdkResult<Vec<TidalTrack>> {
        Ok(self.with_state("similar_tracks", |s| {
            s.similar_limits.push(limit);
            s.tracks.clone()
        }))
    }

    async fn track_url(&self, track_id: &str) -> SdkResult<String> {
        self.record("track_url");
        Ok(format!("https://stream.example/{track_id}.flac"))
    }

    async fn search(
        &self,
        query: &str,
        media_types: &[MediaType],
        limit: u32,
    ) -> SdkResult<TidalSearchResults> {
        Ok(self.with_state("search", |s| {
            s.searches
                .push((query.to_string(), media_types.to_vec(), limit));
            let hits: Vec<TidalTrack> = s
                .tracks
                .iter()
                .filter(|t| t.title.as_deref().is_some_and(|title| title.contains(query)))
                .cloned()
                .collect();
            TidalSearchResults {
                tracks: hits,
                ..TidalSearchResults::default()
            }
        }))
    }

    async fn add_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        media_type: MediaType,
    ) -> SdkResult<()> {
        self.with_state("add_favorite", |s| {
            s.favorites_added
                .push((user_id.to_string(), item_id.to_string(), media_type))
        });
        Ok(())
    }

    async fn remove_favorite(
        &self,
        user_id: &str,
        item_id: &str,
        media_type: MediaType,
    ) -> SdkResult<()> {
        self.with_state("remove_favorite", |s| {
            s.favorites_removed
                .push((user_id.to_string(), item_id.to_string(), media_type))
        });
        Ok(())
    }

    async fn add_playlist_tracks(&self, playlist_id: &str, track_ids: &[String]) -> SdkResult<()> {
        self.with_state("add_playlist_tracks", |s| {
            s.tracks_added
                .push((playlist_id.to_string(), track_ids.to_vec()))
        });
        Ok(())
    }

    async fn remove_playlist_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> SdkResult<()> {
        self.with_state("remove_playlist_tracks", |s| {
            s.tracks_removed
                .push((playlist_id.to_string(), track_ids.to_vec()))
        });
        Ok(())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
    ) -> SdkResult<TidalPlaylist> {
        Ok(self.with_state("create_playlist", |s| {
            s.created_playlists.push(title.to_string());
            TidalPlaylist {
                id: format!("created-{}", s.created_playlists.len()),
                title: Some(title.to_string()),
                description: Some(description.to_string()),
                number_of_tracks: Some(0),
                creator: Some(TidalCreator {
                    id: user_id.to_string(),
                    name: None,
                }),
                ..TidalPlaylist::default()
            }
        }))
    }
}

/// Host database double that counts persisted playlists.
#[derive(Default)]
pub struct RecordingDatabase {
    pub playlists: Mutex<Vec<Playlist>>,
}

#[async_trait]
impl HostDatabase for RecordingDatabase {
    async fn add_playlist(&self, playlist: Playlist) -> HostResult<Playlist> {
        self.playlists.lock().unwrap().push(playlist.clone());
        Ok(playlist)
    }
}

pub fn track(id: &str, title: &str, available: bool) -> TidalTrack {
    TidalTrack {
        id: id.into(),
        title: Some(title.into()),
        duration: Some(200),
        artists: vec![TidalArtistRef {
            id: "a1".into(),
            name: Some("Fake Artist".into()),
        }],
        available,
        ..TidalTrack::default()
    }
}

pub fn album(id: &str, title: &str) -> TidalAlbum {
    TidalAlbum {
        id: id.into(),
        title: Some(title.into()),
        ..TidalAlbum::default()
    }
}

/// Catalog with one playlist of five tracks where `t2` and `t4` are
/// unavailable.
pub fn seeded_state(session_ttl_minutes: i64) -> FakeState {
    let catalog = vec![
        track("t1", "Alpha", true),
        track("t2", "Bravo", false),
        track("t3", "Charlie", true),
        track("t4", "Delta", false),
        track("t5", "Echo", true),
        track("ob", "OBrien Blues", true),
    ];
    let mut playlist_tracks = HashMap::new();
    playlist_tracks.insert(PLAYLIST_ID.to_string(), catalog[..5].to_vec());
    playlist_tracks.insert(
        "pl-all".to_string(),
        ["t1", "t2", "t3", "t4", "t5"]
            .iter()
            .map(|id| track(id, id, true))
            .collect(),
    );

    FakeState {
        session_ttl_minutes,
        artists: vec![TidalArtist {
            id: "a1".into(),
            name: Some("Fake Artist".into()),
            picture: None,
        }],
        albums: vec![album("al1", "First")],
        favorite_tracks: catalog.clone(),
        tracks: catalog,
        playlists: vec![TidalPlaylist {
            id: PLAYLIST_ID.into(),
            title: Some("Road Trip".into()),
            creator: Some(TidalCreator {
                id: USER_ID.into(),
                name: Some("me".into()),
            }),
            ..TidalPlaylist::default()
        }],
        playlist_tracks,
        ..FakeState::default()
    }
}

pub struct Harness {
    pub provider: TidalProvider<FakeTidal>,
    pub state: Shared,
    pub config: Arc<MemoryConfigStore>,
    pub database: Arc<RecordingDatabase>,
    pub dirs: AppDirs,
    _root: TempDir,
}

impl Harness {
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn logins(&self) -> usize {
        self.state.lock().unwrap().logins
    }
}

pub async fn harness(state: FakeState) -> Harness {
    try_harness(state).await.unwrap()
}

pub async fn try_harness(state: FakeState) -> ProviderResult<Harness> {
    let root = tempfile::tempdir().unwrap();
    try_harness_with(state, &Config::default(), root).await
}

/// Sets the provider up inside `root` with the given host configuration.
pub async fn try_harness_with(
    state: FakeState,
    host_config: &Config,
    root: TempDir,
) -> ProviderResult<Harness> {
    let state = Arc::new(Mutex::new(state));
    let config = Arc::new(MemoryConfigStore::new());
    let database = Arc::new(RecordingDatabase::default());
    let dirs = AppDirs::rooted_at(root.path());
    let context = ProviderContext::new(
        INSTANCE_ID,
        host_config,
        dirs.clone(),
        config.clone(),
        database.clone(),
    );
    let factory = FakeTidal {
        state: Arc::clone(&state),
    };
    let provider = TidalProvider::setup(factory, context).await?;
    Ok(Harness {
        provider,
        state,
        config,
        database,
        dirs,
        _root: root,
    })
}

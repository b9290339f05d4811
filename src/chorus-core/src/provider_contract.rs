use crate::models::{MediaType, PlaylistId, TrackId};
use crate::provider::{MusicProvider, ProviderError, ProviderFeature};
use futures::TryStreamExt;
use thiserror::Error;

/// Expectations supplied by a provider implementation to run the shared contract suite.
#[derive(Debug, Clone)]
pub struct ProviderContractExpectations {
    /// The instance id that should be stamped on every returned entity.
    pub instance_id: String,
    /// Required search expectation; validates stable ids and metadata.
    pub search: SearchExpectation,
    /// Track id to validate stream resolution.
    pub stream_track_id: TrackId,
    /// Track id that must not resolve.
    pub missing_track_id: TrackId,
    /// Playlist expectations (only required if library playlists are advertised).
    pub playlist: Option<PlaylistExpectation>,
}

/// Search expectation used to validate provider search behavior.
#[derive(Debug, Clone)]
pub struct SearchExpectation {
    pub query: String,
    /// The first track id expected for the search query (deterministic ordering).
    pub expected_first_track_id: TrackId,
}

/// Playlist expectation used when the provider advertises library playlists.
#[derive(Debug, Clone)]
pub struct PlaylistExpectation {
    /// A playlist that must appear in the library listing and have at least one track.
    pub playlist_id: PlaylistId,
}

/// Errors surfaced by the provider contract test harness.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderContractError {
    #[error("search returned no tracks for query: {query}")]
    EmptySearch { query: String },
    #[error("search returned wrong first track id: expected {expected:?}, got {actual:?}")]
    SearchWrongFirstTrack { expected: TrackId, actual: TrackId },
    #[error("entity stamped with a different provider: {actual}")]
    ProviderMismatch { actual: String },
    #[error("get_track returned mismatched id: expected {expected:?}, got {actual:?}")]
    TrackLookupMismatch { expected: TrackId, actual: TrackId },
    #[error("get_track for {track_id:?} did not fail with a not-found error naming the id")]
    MissingTrackNotReported { track_id: TrackId },
    #[error("stream URL was empty for track {track_id:?}")]
    EmptyStreamUrl { track_id: TrackId },
    #[error("stream details were resolved for {actual:?} instead of {expected:?}")]
    StreamTrackMismatch { expected: TrackId, actual: TrackId },
    #[error("provider advertises library playlists but no playlist expectation supplied")]
    MissingPlaylistExpectation,
    #[error("library playlists did not include expected playlist id {expected:?}")]
    PlaylistMissingExpected { expected: PlaylistId },
    #[error("playlist {playlist_id:?} track positions are not 1..N: {positions:?}")]
    PlaylistPositions {
        playlist_id: PlaylistId,
        positions: Vec<Option<u32>>,
    },
    #[error("provider does not advertise library playlists but listing did not return NotSupported")]
    PlaylistsNotSupportedExpected,
    #[error("provider error while running contract: {0}")]
    ProviderFailure(String),
}

fn failure(err: ProviderError) -> ProviderContractError {
    ProviderContractError::ProviderFailure(err.to_string())
}

/// Run the shared provider contract suite against a provider implementation.
///
/// Providers should call this from their crate-level tests with fixtures that
/// exist in their test setup.
pub async fn run_provider_contract<P: MusicProvider + ?Sized>(
    provider: &P,
    expectations: &ProviderContractExpectations,
) -> Result<(), ProviderContractError> {
    verify_search(provider, expectations).await?;
    verify_missing_track(provider, expectations).await?;
    verify_stream(provider, expectations).await?;
    verify_playlists(provider, expectations).await?;
    Ok(())
}

async fn verify_search<P: MusicProvider + ?Sized>(
    provider: &P,
    expectations: &ProviderContractExpectations,
) -> Result<(), ProviderContractError> {
    let results = provider
        .search(&expectations.search.query, &[MediaType::Track], 10)
        .await
        .map_err(failure)?;

    let first = results
        .tracks
        .first()
        .ok_or_else(|| ProviderContractError::EmptySearch {
            query: expectations.search.query.clone(),
        })?;
    if first.id != expectations.search.expected_first_track_id {
        return Err(ProviderContractError::SearchWrongFirstTrack {
            expected: expectations.search.expected_first_track_id.clone(),
            actual: first.id.clone(),
        });
    }
    if first.provider_id != expectations.instance_id {
        return Err(ProviderContractError::ProviderMismatch {
            actual: first.provider_id.clone(),
        });
    }

    let track = provider.get_track(&first.id).await.map_err(failure)?;
    if track.id != first.id {
        return Err(ProviderContractError::TrackLookupMismatch {
            expected: first.id.clone(),
            actual: track.id,
        });
    }
    if track.provider_id != expectations.instance_id {
        return Err(ProviderContractError::ProviderMismatch {
            actual: track.provider_id,
        });
    }
    Ok(())
}

async fn verify_missing_track<P: MusicProvider + ?Sized>(
    provider: &P,
    expectations: &ProviderContractExpectations,
) -> Result<(), ProviderContractError> {
    let track_id = &expectations.missing_track_id;
    match provider.get_track(track_id).await {
        Err(err @ ProviderError::NotFound { .. }) if err.to_string().contains(&track_id.0) => {
            Ok(())
        }
        _ => Err(ProviderContractError::MissingTrackNotReported {
            track_id: track_id.clone(),
        }),
    }
}

async fn verify_stream<P: MusicProvider + ?Sized>(
    provider: &P,
    expectations: &ProviderContractExpectations,
) -> Result<(), ProviderContractError> {
    let track_id = &expectations.stream_track_id;
    let details = provider
        .get_stream_details(track_id)
        .await
        .map_err(failure)?;
    if details.direct.is_empty() {
        return Err(ProviderContractError::EmptyStreamUrl {
            track_id: track_id.clone(),
        });
    }
    if &details.item_id != track_id {
        return Err(ProviderContractError::StreamTrackMismatch {
            expected: track_id.clone(),
            actual: details.item_id,
        });
    }
    if details.provider != expectations.instance_id {
        return Err(ProviderContractError::ProviderMismatch {
            actual: details.provider,
        });
    }
    Ok(())
}

async fn verify_playlists<P: MusicProvider + ?Sized>(
    provider: &P,
    expectations: &ProviderContractExpectations,
) -> Result<(), ProviderContractError> {
    if !provider.supports(ProviderFeature::LibraryPlaylists) {
        return match provider.get_library_playlists().try_collect::<Vec<_>>().await {
            Err(ProviderError::NotSupported { .. }) => Ok(()),
            _ => Err(ProviderContractError::PlaylistsNotSupportedExpected),
        };
    }

    let expectation = expectations
        .playlist
        .as_ref()
        .ok_or(ProviderContractError::MissingPlaylistExpectation)?;

    let playlists: Vec<_> = provider
        .get_library_playlists()
        .try_collect()
        .await
        .map_err(failure)?;
    if !playlists.iter().any(|p| p.id == expectation.playlist_id) {
        return Err(ProviderContractError::PlaylistMissingExpected {
            expected: expectation.playlist_id.clone(),
        });
    }

    let tracks: Vec<_> = provider
        .get_playlist_tracks(&expectation.playlist_id)
        .try_collect()
        .await
        .map_err(failure)?;
    let positions: Vec<Option<u32>> = tracks.iter().map(|t| t.position).collect();
    let contiguous = positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position == Some(index as u32 + 1));
    if tracks.is_empty() || !contiguous {
        return Err(ProviderContractError::PlaylistPositions {
            playlist_id: expectation.playlist_id.clone(),
            positions,
        });
    }
    Ok(())
}

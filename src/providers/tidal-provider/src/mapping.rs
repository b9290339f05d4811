use crate::models::{TidalAlbum, TidalArtist, TidalArtistRef, TidalPlaylist, TidalTrack};
use chorus_core::models::{Album, AlbumId, Artist, ArtistId, Playlist, PlaylistId, Track, TrackId};
use chorus_core::provider::{Lookup, ProviderResult};

const IMAGE_BASE_URL: &str = "https://resources.tidal.com/images";
const ARTIST_IMAGE_SIZE: u32 = 750;
const ALBUM_IMAGE_SIZE: u32 = 1280;
const PLAYLIST_IMAGE_SIZE: u32 = 1080;
const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Resource URL for a Tidal image id at the given square size.
pub fn image_url(image_id: &str, size: u32) -> String {
    format!(
        "{IMAGE_BASE_URL}/{}/{size}x{size}.jpg",
        image_id.replace('-', "/")
    )
}

/// Objects without an id or a usable name cannot be addressed by the host.
fn identified<'a>(kind: &str, id: &str, name: Option<&'a str>) -> Lookup<&'a str> {
    if id.trim().is_empty() {
        return Lookup::NotFound(format!("{kind} object without id"));
    }
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Lookup::Found(name),
        _ => Lookup::NotFound(format!("{kind} {id} has no name")),
    }
}

fn primary_artist(artist: Option<&TidalArtistRef>, artists: &[TidalArtistRef]) -> String {
    artist
        .or_else(|| artists.first())
        .and_then(|a| a.name.clone())
        .unwrap_or_else(|| UNKNOWN_ARTIST.into())
}

pub fn parse_artist(artist: &TidalArtist, provider_id: &str) -> Lookup<Artist> {
    identified("artist", &artist.id, artist.name.as_deref()).map(|name| Artist {
        id: ArtistId::new(artist.id.clone()),
        provider_id: provider_id.to_string(),
        name: name.to_string(),
        image_url: artist
            .picture
            .as_deref()
            .map(|picture| image_url(picture, ARTIST_IMAGE_SIZE)),
    })
}

pub fn parse_album(album: &TidalAlbum, provider_id: &str) -> Lookup<Album> {
    identified("album", &album.id, album.title.as_deref()).map(|title| Album {
        id: AlbumId::new(album.id.clone()),
        provider_id: provider_id.to_string(),
        title: title.to_string(),
        artist: primary_artist(album.artist.as_ref(), &album.artists),
        year: album
            .release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok()),
        track_count: album.number_of_tracks,
        duration_seconds: album.duration,
        image_url: album
            .cover
            .as_deref()
            .map(|cover| image_url(cover, ALBUM_IMAGE_SIZE)),
    })
}

pub fn parse_track(track: &TidalTrack, provider_id: &str) -> Lookup<Track> {
    identified("track", &track.id, track.title.as_deref()).map(|title| Track {
        id: TrackId::new(track.id.clone()),
        provider_id: provider_id.to_string(),
        title: title.to_string(),
        artist: primary_artist(track.artist.as_ref(), &track.artists),
        album: track.album.as_ref().and_then(|a| a.title.clone()),
        duration_seconds: track.duration,
        track_number: track.track_number,
        position: None,
        isrc: track.isrc.clone(),
        explicit: track.explicit,
    })
}

/// `user_id` is the logged-in user; their own playlists are editable.
pub fn parse_playlist(
    playlist: &TidalPlaylist,
    provider_id: &str,
    user_id: Option<&str>,
) -> Lookup<Playlist> {
    identified("playlist", &playlist.id, playlist.title.as_deref()).map(|name| {
        let creator = playlist.creator.as_ref();
        Playlist {
            id: PlaylistId::new(playlist.id.clone()),
            provider_id: provider_id.to_string(),
            name: name.to_string(),
            owner: creator.and_then(|c| c.name.clone()),
            description: playlist
                .description
                .clone()
                .filter(|d| !d.trim().is_empty()),
            track_count: playlist.number_of_tracks,
            is_editable: matches!((creator, user_id), (Some(c), Some(user)) if c.id == user),
            image_url: playlist
                .square_image
                .as_deref()
                .or(playlist.image.as_deref())
                .map(|image| image_url(image, PLAYLIST_IMAGE_SIZE)),
        }
    })
}

/// Drops unavailable tracks and numbers the rest 1..N in listing order.
pub fn positioned_tracks(
    tracks: Vec<TidalTrack>,
    provider_id: String,
) -> impl Iterator<Item = ProviderResult<Track>> + Send {
    tracks
        .into_iter()
        .filter(|track| track.available)
        .zip(1u32..)
        .map(move |(track, position)| {
            parse_track(&track, &provider_id)
                .map(|mut parsed| {
                    parsed.position = Some(position);
                    parsed
                })
                .into_result()
        })
}

//! HTTP client for the local player and lyric services.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::Lazy;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// Shared HTTP client with reasonable defaults for timeouts
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent("lyricbar/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("failed to build HTTP client")
});

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Serde error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Now-playing snapshot reported by the player endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    pub name: String,
    /// Elapsed playback time in seconds.
    pub progress: f64,
    pub id: String,
}

/// Capability seam over the two fetch operations so the engine can run
/// against an in-memory fake in tests.
#[allow(async_fn_in_trait)]
pub trait TrackSource {
    async fn fetch_track_info(&mut self) -> Result<TrackInfo, FetchError>;
    async fn fetch_lyric_text(&mut self, track_id: &str) -> Result<String, FetchError>;
}

/// Talks to the player and lyric endpoints of a locally running player.
pub struct MusicInfoClient {
    player_url: String,
    lyric_url: String,
    logging: Arc<AtomicBool>,
}

impl MusicInfoClient {
    pub fn new(player_url: String, lyric_url: String, logging: Arc<AtomicBool>) -> Self {
        Self {
            player_url,
            lyric_url,
            logging,
        }
    }

    fn log(&self, message: &str) {
        if self.logging.load(Ordering::Relaxed) {
            tracing::debug!(target: "lyricbar::client", "{message}");
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.log(&format!("GET {url}"));
        let resp = HTTP_CLIENT.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Api(format!("{url}: HTTP {}", resp.status())));
        }
        let body: Value = resp.json().await?;
        self.log(&format!("GET {url} ok"));
        Ok(body)
    }
}

impl TrackSource for MusicInfoClient {
    /// Fetch current track identity and playback progress.
    ///
    /// The player endpoint answers with at least
    /// `{ "currentTrack": { "name": ..., "id": ... }, "progress": ... }`;
    /// any absent field is a [`FetchError::MissingField`].
    async fn fetch_track_info(&mut self) -> Result<TrackInfo, FetchError> {
        let url = self.player_url.clone();
        let body = self.get_json(&url).await?;
        track_info_from_body(&body)
    }

    /// Fetch the raw synced lyric text for a track.
    ///
    /// The lyric envelope nests the text at `lrc.lyric`.
    async fn fetch_lyric_text(&mut self, track_id: &str) -> Result<String, FetchError> {
        let url = format!("{}?id={}", self.lyric_url, urlencoding::encode(track_id));
        let body = self.get_json(&url).await?;
        let envelope: LyricEnvelope = serde_json::from_value(body)?;
        envelope
            .lrc
            .and_then(|lrc| lrc.lyric)
            .ok_or(FetchError::MissingField("lrc.lyric"))
    }
}

/// Extract the required track fields from the player response. The id is
/// normalized to a string whether the player reports it as one or as a
/// bare number.
fn track_info_from_body(body: &Value) -> Result<TrackInfo, FetchError> {
    let name = body
        .pointer("/currentTrack/name")
        .and_then(Value::as_str)
        .ok_or(FetchError::MissingField("currentTrack.name"))?
        .to_string();
    let id = match body.pointer("/currentTrack/id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(FetchError::MissingField("currentTrack.id")),
    };
    let progress = body
        .pointer("/progress")
        .and_then(Value::as_f64)
        .ok_or(FetchError::MissingField("progress"))?;
    Ok(TrackInfo { name, progress, id })
}

#[derive(Deserialize)]
struct LyricEnvelope {
    lrc: Option<LrcBody>,
}

#[derive(Deserialize)]
struct LrcBody {
    lyric: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_is_normalized_to_string() {
        let body = serde_json::json!({
            "currentTrack": { "name": "Song", "id": 42 },
            "progress": 12.0
        });
        let info = track_info_from_body(&body).unwrap();
        assert_eq!(info.id, "42");
        assert_eq!(info.name, "Song");
        assert_eq!(info.progress, 12.0);
    }

    #[test]
    fn missing_progress_is_an_error() {
        let body = serde_json::json!({
            "currentTrack": { "name": "Song", "id": "42" }
        });
        assert!(matches!(
            track_info_from_body(&body),
            Err(FetchError::MissingField("progress"))
        ));
    }

    #[test]
    fn missing_track_name_is_an_error() {
        let body = serde_json::json!({
            "currentTrack": { "id": "42" },
            "progress": 1.0
        });
        assert!(matches!(
            track_info_from_body(&body),
            Err(FetchError::MissingField("currentTrack.name"))
        ));
    }

    #[test]
    fn lyric_envelope_nested_path() {
        let body = serde_json::json!({ "lrc": { "lyric": "[00:01.00]hey" } });
        let envelope: LyricEnvelope = serde_json::from_value(body).unwrap();
        assert_eq!(
            envelope.lrc.and_then(|lrc| lrc.lyric).as_deref(),
            Some("[00:01.00]hey")
        );
    }

    #[test]
    fn absent_lyric_field_is_missing_field() {
        let body = serde_json::json!({ "lrc": {} });
        let envelope: LyricEnvelope = serde_json::from_value(body).unwrap();
        let result = envelope
            .lrc
            .and_then(|lrc| lrc.lyric)
            .ok_or(FetchError::MissingField("lrc.lyric"));
        assert!(matches!(result, Err(FetchError::MissingField("lrc.lyric"))));
    }
}

//! Types de données du résolveur
//!
//! `SongMetadata` et `StreamDescriptor` sont les formes canoniques
//! stockées dans le cache et renvoyées sur le fil. `RawTrackInfo` est
//! la forme brute émise par l'outil de recherche, jamais exposée.

use serde::{Deserialize, Serialize};

/// Métadonnées canoniques d'un morceau
///
/// La durée est toujours ramenée à des secondes entières, quelle que
/// soit la forme numérique émise par l'outil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongMetadata {
    pub title: String,
    pub duration_seconds: u64,
    pub artist: String,
}

/// Localisateur de flux audio, à durée de vie limitée côté émetteur
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    #[serde(rename = "sourceURL")]
    pub source_url: String,
}

/// Sortie JSON brute de l'outil de recherche (mode `-j`)
///
/// Seuls les champs utilisés sont déclarés ; le reste du document est
/// ignoré à la désérialisation.
#[derive(Debug, Deserialize)]
pub struct RawTrackInfo {
    pub title: String,
    pub duration: Option<f64>,
    pub artist: Option<String>,
    pub uploader: Option<String>,
}

impl From<RawTrackInfo> for SongMetadata {
    fn from(info: RawTrackInfo) -> Self {
        Self {
            title: info.title,
            duration_seconds: info.duration.map(|d| d.round() as u64).unwrap_or(0),
            artist: info
                .artist
                .or(info.uploader)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_duration_rounds_to_whole_seconds() {
        let info: RawTrackInfo =
            serde_json::from_str(r#"{"title": "t", "duration": 233.48}"#).unwrap();
        let meta = SongMetadata::from(info);
        assert_eq!(meta.duration_seconds, 233);
    }

    #[test]
    fn test_artist_falls_back_to_uploader_then_empty() {
        let with_both: RawTrackInfo = serde_json::from_str(
            r#"{"title": "t", "duration": 1, "artist": "A", "uploader": "U"}"#,
        )
        .unwrap();
        assert_eq!(SongMetadata::from(with_both).artist, "A");

        let uploader_only: RawTrackInfo =
            serde_json::from_str(r#"{"title": "t", "duration": 1, "uploader": "U"}"#).unwrap();
        assert_eq!(SongMetadata::from(uploader_only).artist, "U");

        let neither: RawTrackInfo =
            serde_json::from_str(r#"{"title": "t", "duration": 1}"#).unwrap();
        assert_eq!(SongMetadata::from(neither).artist, "");
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let meta = SongMetadata {
            title: "Perfect".into(),
            duration_seconds: 263,
            artist: "Ed Sheeran".into(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["durationSeconds"], 263);
        assert!(json.get("duration_seconds").is_none());
    }

    #[test]
    fn test_descriptor_uses_source_url_key() {
        let desc = StreamDescriptor {
            source_url: "https://example.com/a.m4a".into(),
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert!(json.get("sourceURL").is_some());
    }
}

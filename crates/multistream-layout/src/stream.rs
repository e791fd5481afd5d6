#![forbid(unsafe_code)]

//! Stream identity and the stream-set signature.
//!
//! Tile identities are per-instance and change whenever a stream is re-added,
//! so persisted customizations are keyed by the *set* of active
//! `platform:channel` pairs instead. The signature is order-independent:
//! reordering tiles keeps the same key, adding or removing a stream switches
//! to a different one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tile::TileId;

/// Prefix prepended to every stream-set signature to form a storage key.
pub const DEFAULT_STORAGE_KEY_PREFIX: &str = "multistream-custom-layout:";

/// Supported live-video platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Kick,
}

impl Platform {
    /// Lowercase platform name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Twitch => "twitch",
            Self::Kick => "kick",
        }
    }

    /// Single-letter abbreviation used in stream-set signatures.
    #[must_use]
    pub const fn initial(self) -> char {
        match self {
            Self::Twitch => 't',
            Self::Kick => 'k',
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown platform name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlatformError {
    input: String,
}

impl fmt::Display for ParsePlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform {:?} (expected twitch or kick)", self.input)
    }
}

impl std::error::Error for ParsePlatformError {}

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitch" | "t" => Ok(Self::Twitch),
            "kick" | "k" => Ok(Self::Kick),
            _ => Err(ParsePlatformError { input: s.to_owned() }),
        }
    }
}

/// One visible stream instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stream {
    /// Tile identity, unique per instance.
    pub id: TileId,
    pub platform: Platform,
    pub channel: String,
}

impl Stream {
    /// Create a stream whose identity is `{platform}:{channel}:{instance}`.
    ///
    /// `instance` distinguishes repeated additions of the same channel (the
    /// browser viewer uses the insertion timestamp).
    #[must_use]
    pub fn new(
        platform: Platform,
        channel: impl Into<String>,
        instance: impl fmt::Display,
    ) -> Self {
        let channel = channel.into();
        let id = TileId::new(format!("{platform}:{channel}:{instance}"));
        Self {
            id,
            platform,
            channel,
        }
    }

    /// Create a stream with an explicit identity.
    #[must_use]
    pub fn with_id(id: impl Into<TileId>, platform: Platform, channel: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            platform,
            channel: channel.into(),
        }
    }

    /// `"{initial}:{channel}"`, this stream's member of a stream-set signature.
    #[must_use]
    pub fn signature_part(&self) -> String {
        format!("{}:{}", self.platform.initial(), self.channel)
    }
}

/// Order-independent identifier of a set of active streams.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamSetSignature(String);

impl StreamSetSignature {
    /// Sorted, comma-joined signature parts of `streams`.
    #[must_use]
    pub fn from_streams<'a>(streams: impl IntoIterator<Item = &'a Stream>) -> Self {
        let mut parts: Vec<String> = streams.into_iter().map(Stream::signature_part).collect();
        parts.sort_unstable();
        Self(parts.join(","))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the set has no streams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Storage key for this set under `prefix`.
    #[must_use]
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }
}

impl fmt::Display for StreamSetSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

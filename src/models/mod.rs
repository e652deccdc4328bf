//! Data model for the channel browser
//!
//! Wire records as returned by the remote channel API, and the immutable
//! domain [`Channel`] derived from them. Channels are created fresh on
//! every successful fetch; there are no partial updates or merges.

use serde::{Deserialize, Serialize};

/// Raw channel record as returned by the remote channel API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub name: String,
    #[serde(rename = "code")]
    pub country_code: String,
    #[serde(rename = "url")]
    pub stream_url: String,
    #[serde(rename = "image")]
    pub image_url: String,
    pub status: String,
    pub viewers: u32,
}

/// Response envelope of the channel list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelListResponse {
    pub total_channels: u32,
    pub channels: Vec<ChannelRecord>,
}

/// A live TV channel with display and playback metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Stable identifier derived from name and country code; used as the
    /// unique list key.
    pub id: String,
    pub name: String,
    pub country_code: String,
    /// Opaque playback URL, not validated here.
    pub stream_url: String,
    pub image_url: String,
    pub is_online: bool,
    pub viewers: u32,
}

impl Channel {
    /// Country code as rendered in the UI.
    pub fn country_name(&self) -> String {
        self.country_code.to_uppercase()
    }

    /// Human-readable online/offline label.
    pub fn status_text(&self) -> &'static str {
        if self.is_online {
            "Online"
        } else {
            "Offline"
        }
    }
}

impl From<ChannelRecord> for Channel {
    fn from(record: ChannelRecord) -> Self {
        let id = format!("{}_{}", record.name, record.country_code)
            .replace(' ', "_")
            .to_lowercase();

        Self {
            id,
            name: record.name,
            country_code: record.country_code,
            stream_url: record.stream_url,
            image_url: record.image_url,
            // Anything other than "online" counts as offline
            is_online: record.status.eq_ignore_ascii_case("online"),
            viewers: record.viewers,
        }
    }
}

/// Status selector used when narrowing the channel list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    #[default]
    All,
    Online,
    Offline,
}

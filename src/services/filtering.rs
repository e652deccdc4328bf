//! Channel narrowing engines
//!
//! Pure functions over channel lists: country/status filtering, the
//! derived country selector options, and case-insensitive name search.
//! None of them reorder the input.

use crate::models::{Channel, ChannelStatus};

/// Narrow a channel list by optional country code and online status.
///
/// Both predicates are applied as a conjunction. The country match is
/// exact against the stored code.
pub fn filter_channels(
    channels: &[Channel],
    country_code: Option<&str>,
    status: ChannelStatus,
) -> Vec<Channel> {
    channels
        .iter()
        .filter(|channel| match country_code {
            Some(code) => channel.country_code == code,
            None => true,
        })
        .filter(|channel| match status {
            ChannelStatus::All => true,
            ChannelStatus::Online => channel.is_online,
            ChannelStatus::Offline => !channel.is_online,
        })
        .cloned()
        .collect()
}

/// Sorted, duplicate-free country codes present in a channel list.
///
/// Callers pass the unfiltered list so selector UIs keep showing every
/// option regardless of the current selection.
pub fn available_countries(channels: &[Channel]) -> Vec<String> {
    let mut countries: Vec<String> = channels
        .iter()
        .map(|channel| channel.country_code.clone())
        .collect();
    countries.sort();
    countries.dedup();
    countries
}

/// Keep channels whose name contains the query, case-insensitively.
///
/// A blank query returns the input unchanged. Only the name is searched.
pub fn search_channels(channels: &[Channel], query: &str) -> Vec<Channel> {
    let normalized = query.trim().to_lowercase();
    if normalized.is_empty() {
        return channels.to_vec();
    }

    channels
        .iter()
        .filter(|channel| channel.name.to_lowercase().contains(&normalized))
        .cloned()
        .collect()
}

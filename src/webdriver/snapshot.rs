//! One tick's view of a browser page, captured by the probe script.
//!
//! The monitor runs synchronously against the snapshot. Writes update the
//! snapshot so later reads in the same tick see them, and are queued as
//! [`Command`]s for the host to replay.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::page::{
    Container, ElementRef, ElementState, Interaction, Media, Page, PageError, PlayerContext,
};

/// Range browsers accept for `HTMLMediaElement.playbackRate` before throwing.
pub const BROWSER_MIN_RATE: f64 = 0.0625;
pub const BROWSER_MAX_RATE: f64 = 16.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSnapshot {
    pub playback_rate: f64,
    pub muted: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub classes: Vec<String>,
    /// Matches per probed selector, in document order.
    #[serde(default)]
    pub elements: HashMap<String, Vec<ElementState>>,
}

/// Probe result. `media`/`player` are absent when the page has no main video
/// or the video sits outside any player container.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: String,
    pub media: Option<MediaSnapshot>,
    pub player: Option<PlayerSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    PlaybackRate {
        value: f64,
    },
    Muted {
        value: bool,
    },
    #[serde(rename_all = "camelCase")]
    Interact {
        selector: String,
        index: usize,
        event: &'static str,
        client_x: f64,
        client_y: f64,
    },
}

#[derive(Debug)]
pub struct SnapshotMedia {
    state: MediaSnapshot,
    commands: Vec<Command>,
}

impl Media for SnapshotMedia {
    fn playback_rate(&self) -> f64 {
        self.state.playback_rate
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), PageError> {
        if !(BROWSER_MIN_RATE..=BROWSER_MAX_RATE).contains(&rate) {
            return Err(PageError::Rejected {
                property: "playbackRate",
                value: rate.to_string(),
            });
        }
        self.state.playback_rate = rate;
        self.commands.push(Command::PlaybackRate { value: rate });
        Ok(())
    }

    fn muted(&self) -> bool {
        self.state.muted
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), PageError> {
        self.state.muted = muted;
        self.commands.push(Command::Muted { value: muted });
        Ok(())
    }
}

#[derive(Debug)]
pub struct SnapshotPlayer {
    state: PlayerSnapshot,
    commands: Vec<Command>,
}

impl Container for SnapshotPlayer {
    fn has_class(&self, class: &str) -> bool {
        self.state.classes.iter().any(|c| c == class)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        self.state
            .elements
            .get(selector)
            .map(|matches| {
                matches
                    .iter()
                    .enumerate()
                    .map(|(index, state)| ElementRef {
                        selector: selector.to_string(),
                        index,
                        state: state.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn dispatch(&mut self, target: &ElementRef, interaction: Interaction) -> Result<(), PageError> {
        let known = self
            .state
            .elements
            .get(&target.selector)
            .is_some_and(|matches| target.index < matches.len());
        if !known {
            return Err(PageError::Detached);
        }
        self.commands.push(Command::Interact {
            selector: target.selector.clone(),
            index: target.index,
            event: interaction.kind.event_name(),
            client_x: interaction.client_x,
            client_y: interaction.client_y,
        });
        Ok(())
    }
}

#[derive(Debug)]
pub struct SnapshotPage {
    url: String,
    resolved: Option<(SnapshotMedia, SnapshotPlayer)>,
}

impl SnapshotPage {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Media writes first, then interactions, in the order they were issued.
    pub fn into_commands(self) -> Vec<Command> {
        match self.resolved {
            Some((media, player)) => media.commands.into_iter().chain(player.commands).collect(),
            None => Vec::new(),
        }
    }
}

impl From<PageSnapshot> for SnapshotPage {
    fn from(snapshot: PageSnapshot) -> Self {
        let resolved = match (snapshot.media, snapshot.player) {
            (Some(media), Some(player)) => Some((
                SnapshotMedia {
                    state: media,
                    commands: Vec::new(),
                },
                SnapshotPlayer {
                    state: player,
                    commands: Vec::new(),
                },
            )),
            _ => None,
        };
        Self {
            url: snapshot.url,
            resolved,
        }
    }
}

impl Page for SnapshotPage {
    type Media = SnapshotMedia;
    type Container = SnapshotPlayer;

    fn resolve(&mut self) -> Option<PlayerContext<'_, SnapshotMedia, SnapshotPlayer>> {
        let (media, container) = self.resolved.as_mut()?;
        Some(PlayerContext { media, container })
    }
}

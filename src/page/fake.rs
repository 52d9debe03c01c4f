//! In-memory document used by tests.

use super::{
    Bounds, Container, ElementRef, ElementState, Interaction, InteractionKind, Media, Page,
    PageError, PlayerContext,
};

#[derive(Debug, Clone)]
pub struct FakeVideo {
    pub rate: f64,
    pub muted: bool,
    /// Carries the `html5-main-video` class.
    pub main: bool,
    /// Index of the enclosing player in [`FakePage::players`].
    pub player: Option<usize>,
    pub max_rate: f64,
    pub rate_writes: u32,
    pub mute_writes: u32,
}

impl FakeVideo {
    pub fn new(rate: f64, muted: bool) -> Self {
        Self {
            rate,
            muted,
            main: true,
            player: Some(0),
            max_rate: 16.0,
            rate_writes: 0,
            mute_writes: 0,
        }
    }
}

impl Media for FakeVideo {
    fn playback_rate(&self) -> f64 {
        self.rate
    }

    fn set_playback_rate(&mut self, rate: f64) -> Result<(), PageError> {
        if rate > self.max_rate {
            return Err(PageError::Rejected {
                property: "playbackRate",
                value: rate.to_string(),
            });
        }
        self.rate = rate;
        self.rate_writes += 1;
        Ok(())
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) -> Result<(), PageError> {
        self.muted = muted;
        self.mute_writes += 1;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub selectors: Vec<String>,
    pub state: ElementState,
}

#[derive(Debug, Clone, Default)]
pub struct FakePlayer {
    pub classes: Vec<String>,
    pub elements: Vec<FakeElement>,
    pub dispatched: Vec<(String, usize, InteractionKind)>,
    pub failing: Vec<InteractionKind>,
}

impl FakePlayer {
    pub fn set_class(&mut self, class: &str, on: bool) {
        self.classes.retain(|c| c != class);
        if on {
            self.classes.push(class.to_string());
        }
    }

    pub fn add(&mut self, selectors: &[&str], state: ElementState) -> usize {
        self.elements.push(FakeElement {
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            state,
        });
        self.elements.len() - 1
    }

    pub fn clicked_selectors(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (sel, _, kind) in &self.dispatched {
            if *kind == InteractionKind::Hover {
                out.push(sel.clone());
            }
        }
        out
    }
}

impl Container for FakePlayer {
    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn query_all(&self, selector: &str) -> Vec<ElementRef> {
        self.elements
            .iter()
            .filter(|el| el.selectors.iter().any(|s| s == selector))
            .enumerate()
            .map(|(index, el)| ElementRef {
                selector: selector.to_string(),
                index,
                state: el.state.clone(),
            })
            .collect()
    }

    fn dispatch(&mut self, target: &ElementRef, interaction: Interaction) -> Result<(), PageError> {
        if self.query_all(&target.selector).len() <= target.index {
            return Err(PageError::Detached);
        }
        if self.failing.contains(&interaction.kind) {
            return Err(PageError::Script(format!(
                "{} threw",
                interaction.kind.event_name()
            )));
        }
        self.dispatched
            .push((target.selector.clone(), target.index, interaction.kind));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub videos: Vec<FakeVideo>,
    pub players: Vec<FakePlayer>,
}

impl FakePage {
    /// One main video inside one player.
    pub fn single(rate: f64, muted: bool) -> Self {
        Self {
            videos: vec![FakeVideo::new(rate, muted)],
            players: vec![FakePlayer::default()],
        }
    }

    pub fn video(&self) -> &FakeVideo {
        &self.videos[0]
    }

    pub fn video_mut(&mut self) -> &mut FakeVideo {
        &mut self.videos[0]
    }

    pub fn player(&self) -> &FakePlayer {
        &self.players[0]
    }

    pub fn player_mut(&mut self) -> &mut FakePlayer {
        &mut self.players[0]
    }
}

impl Page for FakePage {
    type Media = FakeVideo;
    type Container = FakePlayer;

    fn resolve(&mut self) -> Option<PlayerContext<'_, FakeVideo, FakePlayer>> {
        let idx = self
            .videos
            .iter()
            .position(|v| v.main)
            .or_else(|| (!self.videos.is_empty()).then_some(0))?;
        let media = &mut self.videos[idx];
        let container = self.players.get_mut(media.player?)?;
        Some(PlayerContext { media, container })
    }
}

pub fn visible() -> ElementState {
    ElementState {
        bounds: Some(Bounds {
            left: 0.0,
            top: 0.0,
            width: 80.0,
            height: 30.0,
        }),
        ..Default::default()
    }
}

pub fn labelled(label: &str) -> ElementState {
    ElementState {
        label: Some(label.to_string()),
        ..visible()
    }
}

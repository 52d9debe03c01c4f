//! Host page boundary.
//!
//! The monitor never talks to a document directly. A [`Page`] resolves the
//! one player being watched into a [`PlayerContext`], and every read or write
//! afterwards goes through that context, so nothing outside the player's own
//! subtree can leak into a decision.

#[cfg(test)]
pub(crate) mod fake;
pub mod selectors;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PageError {
    #[error("host rejected {property} = {value}")]
    Rejected { property: &'static str, value: String },
    #[error("element is no longer attached")]
    Detached,
    #[error("host script failed: {0}")]
    Script(String),
}

/// The media element half of a player.
pub trait Media {
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&mut self, rate: f64) -> Result<(), PageError>;
    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool) -> Result<(), PageError>;
}

/// The structural container enclosing a media element and its overlays.
/// All lookups are relative to this container's subtree.
pub trait Container {
    fn has_class(&self, class: &str) -> bool;

    /// Every element under the container matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<ElementRef>;

    fn query(&self, selector: &str) -> Option<ElementRef> {
        self.query_all(selector).into_iter().next()
    }

    fn dispatch(&mut self, target: &ElementRef, interaction: Interaction) -> Result<(), PageError>;
}

/// The single playback surface inspected during one tick.
///
/// Only a [`Page`] can build one, and it always derives `container` from
/// `media`. Contexts are never kept across ticks.
pub struct PlayerContext<'a, M, C> {
    pub media: &'a mut M,
    pub container: &'a mut C,
}

pub trait Page {
    type Media: Media;
    type Container: Container;

    /// Resolve the main media element and its enclosing player container.
    /// `None` when either is missing, e.g. mid-navigation.
    fn resolve(&mut self) -> Option<PlayerContext<'_, Self::Media, Self::Container>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Client coordinates of the centre, kept one pixel inside the box.
    pub fn center(&self) -> (f64, f64) {
        let cx = (self.width * 0.5).min(self.width - 1.0).max(1.0);
        let cy = (self.height * 0.5).min(self.height - 1.0).max(1.0);
        (self.left + cx, self.top + cy)
    }
}

/// Rendered state of one element as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementState {
    /// `None` when the host could not measure layout for the element.
    pub bounds: Option<Bounds>,
    /// `visibility: hidden` or `display: none`.
    pub hidden: bool,
    /// `opacity: 0`.
    pub transparent: bool,
    /// `disabled` attribute present or `aria-disabled="true"`.
    pub disabled: bool,
    pub pointer_events_none: bool,
    /// `aria-label`, falling back to text content.
    pub label: Option<String>,
}

impl ElementState {
    /// `Some(true)` only for non-zero size, not hidden and not transparent.
    /// `None` when layout was unavailable and the element is not otherwise
    /// known to be invisible.
    pub fn visibility(&self) -> Option<bool> {
        if self.hidden || self.transparent {
            return Some(false);
        }
        self.bounds.map(|b| b.width > 0.0 && b.height > 0.0)
    }

    pub fn is_visible(&self) -> bool {
        self.visibility().unwrap_or(false)
    }

    pub fn is_clickable(&self) -> bool {
        self.is_visible() && !self.disabled && !self.pointer_events_none
    }

    pub fn normalized_label(&self) -> String {
        self.label
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}

/// A located element: which selector found it, its position among that
/// selector's matches, and its state at lookup time.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRef {
    pub selector: String,
    pub index: usize,
    pub state: ElementState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Hover,
    Press,
    Release,
    /// The element's own activation behaviour (`element.click()`).
    Activate,
    Click,
}

impl InteractionKind {
    pub fn event_name(self) -> &'static str {
        match self {
            InteractionKind::Hover => "mouseover",
            InteractionKind::Press => "mousedown",
            InteractionKind::Release => "mouseup",
            InteractionKind::Activate => "activate",
            InteractionKind::Click => "click",
        }
    }
}

/// Order a viewer's pointer would produce.
pub const INTERACTION_SEQUENCE: [InteractionKind; 5] = [
    InteractionKind::Hover,
    InteractionKind::Press,
    InteractionKind::Release,
    InteractionKind::Activate,
    InteractionKind::Click,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub kind: InteractionKind,
    pub client_x: f64,
    pub client_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(width: f64, height: f64) -> ElementState {
        ElementState {
            bounds: Some(Bounds {
                left: 10.0,
                top: 20.0,
                width,
                height,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn visibility_requires_area_and_style() {
        assert!(sized(40.0, 20.0).is_visible());
        assert!(!sized(0.0, 20.0).is_visible());
        assert!(!sized(40.0, 0.0).is_visible());

        let mut hidden = sized(40.0, 20.0);
        hidden.hidden = true;
        assert!(!hidden.is_visible());

        let mut transparent = sized(40.0, 20.0);
        transparent.transparent = true;
        assert!(!transparent.is_visible());
    }

    #[test]
    fn unmeasured_element_has_unknown_visibility() {
        let unmeasured = ElementState::default();
        assert_eq!(unmeasured.visibility(), None);
        assert!(!unmeasured.is_visible());

        let hidden = ElementState {
            hidden: true,
            ..Default::default()
        };
        assert_eq!(hidden.visibility(), Some(false));
    }

    #[test]
    fn clickable_excludes_disabled_and_pointer_suppressed() {
        assert!(sized(40.0, 20.0).is_clickable());

        let mut disabled = sized(40.0, 20.0);
        disabled.disabled = true;
        assert!(!disabled.is_clickable());

        let mut inert = sized(40.0, 20.0);
        inert.pointer_events_none = true;
        assert!(!inert.is_clickable());
    }

    #[test]
    fn center_stays_inside_tiny_boxes() {
        let b = Bounds {
            left: 100.0,
            top: 50.0,
            width: 1.0,
            height: 60.0,
        };
        assert_eq!(b.center(), (101.0, 80.0));
    }

    #[test]
    fn element_state_deserializes_from_probe_json() {
        let state: ElementState = serde_json::from_str(
            r#"{"bounds":{"left":1,"top":2,"width":3,"height":4},"ariaIgnored":1,"label":"Skip"}"#,
        )
        .unwrap();
        assert_eq!(state.bounds.map(|b| b.width), Some(3.0));
        assert_eq!(state.normalized_label(), "skip");
        assert!(!state.disabled);
    }
}

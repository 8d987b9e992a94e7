//! Previous/next navigation between detail pages.
//!
//! A list view publishes the ids it currently shows under a list key; a
//! detail page then offers "up"/"down" controls and the `k`/`j` shortcuts to
//! move to the neighboring entity without going back to the list.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::keyboard::{FocusTarget, KeyPress, KeyboardHub, ListenerGuard};

/// Analytics event captured when a navigation button is clicked.
pub const NAVIGATE_BUTTON_EVENT: &str = "navigate_detail_pages:button_click_prev_or_next";

pub const PREVIOUS_KEY: &str = "k";
pub const NEXT_KEY: &str = "j";

/// Client-side router.
pub trait Navigator: Send + Sync {
    fn push(&self, url: &str);
}

/// Product analytics sink.
pub trait AnalyticsSink: Send + Sync {
    fn capture(&self, event: &str);
}

/// Analytics sink that records events as `tracing` lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn capture(&self, event: &str) {
        tracing::info!(event = event, "Analytics event captured");
    }
}

/// Ordered id lists keyed by the view that produced them.
#[derive(Debug, Clone, Default)]
pub struct DetailPageLists {
    lists: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl DetailPageLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_list(&self, key: impl Into<String>, ids: Vec<String>) {
        self.lists.write().insert(key.into(), ids);
    }

    /// The ids under `key`, or an empty list when the key is absent.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.lists.read().get(key).cloned().unwrap_or_default()
    }

    pub fn remove_list(&self, key: &str) -> Option<Vec<String>> {
        self.lists.write().remove(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Neighbors of `current_id` in `ids`.
///
/// When `current_id` is not in the list there is no previous entry and the
/// next entry is the head of the list.
pub fn neighbors(ids: &[String], current_id: &str) -> Neighbors {
    match ids.iter().position(|id| id == current_id) {
        Some(pos) => Neighbors {
            previous: pos.checked_sub(1).and_then(|i| ids.get(i)).cloned(),
            next: ids.get(pos + 1).cloned(),
        },
        None => Neighbors {
            previous: None,
            next: ids.first().cloned(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub fn shortcut(&self) -> &'static str {
        match self {
            Self::Previous => PREVIOUS_KEY,
            Self::Next => NEXT_KEY,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Previous => "Navigate up",
            Self::Next => "Navigate down",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            PREVIOUS_KEY => Some(Self::Previous),
            NEXT_KEY => Some(Self::Next),
            _ => None,
        }
    }
}

/// One rendered navigation button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControl {
    pub direction: Direction,
    pub label: &'static str,
    pub shortcut: &'static str,
    pub href: Option<String>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControls {
    pub up: NavControl,
    pub down: NavControl,
}

/// Which focus targets swallow the navigation shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortcutSuppression {
    /// Only single-line text inputs.
    #[default]
    TextInputOnly,
    /// Any surface that accepts typed text.
    AnyEditable,
}

impl ShortcutSuppression {
    pub fn suppresses(&self, focus: FocusTarget) -> bool {
        match self {
            Self::TextInputOnly => focus == FocusTarget::TextInput,
            Self::AnyEditable => focus.is_editable(),
        }
    }
}

pub type PathFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Navigation widget for a single detail page.
///
/// Neighbors are looked up from the shared lists on every render, click and
/// key press, so list updates are picked up without re-creating the widget.
#[derive(Clone)]
pub struct DetailPageNav {
    current_id: String,
    path: PathFn,
    list_key: String,
    lists: DetailPageLists,
    navigator: Arc<dyn Navigator>,
    analytics: Arc<dyn AnalyticsSink>,
    suppression: ShortcutSuppression,
}

impl DetailPageNav {
    pub fn new(
        current_id: impl Into<String>,
        path: impl Fn(&str) -> String + Send + Sync + 'static,
        list_key: impl Into<String>,
        lists: DetailPageLists,
        navigator: Arc<dyn Navigator>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            current_id: current_id.into(),
            path: Arc::new(path),
            list_key: list_key.into(),
            lists,
            navigator,
            analytics,
            suppression: ShortcutSuppression::default(),
        }
    }

    pub fn with_suppression(mut self, suppression: ShortcutSuppression) -> Self {
        self.suppression = suppression;
        self
    }

    pub fn current_id(&self) -> &str {
        &self.current_id
    }

    pub fn neighbors(&self) -> Neighbors {
        neighbors(&self.lists.list(&self.list_key), &self.current_id)
    }

    fn target(&self, direction: Direction) -> Option<String> {
        let n = self.neighbors();
        match direction {
            Direction::Previous => n.previous,
            Direction::Next => n.next,
        }
    }

    /// Controls to draw, or `None` when there is no list to navigate.
    pub fn render(&self) -> Option<NavControls> {
        let ids = self.lists.list(&self.list_key);
        if ids.is_empty() {
            return None;
        }
        let n = neighbors(&ids, &self.current_id);
        Some(NavControls {
            up: self.control(Direction::Previous, n.previous),
            down: self.control(Direction::Next, n.next),
        })
    }

    fn control(&self, direction: Direction, target: Option<String>) -> NavControl {
        NavControl {
            direction,
            label: direction.label(),
            shortcut: direction.shortcut(),
            disabled: target.is_none(),
            href: target.map(|id| (self.path)(&id)),
        }
    }

    /// Button click. Captures the analytics event and navigates; a click on
    /// a disabled control does nothing. Returns the URL navigated to.
    pub fn click(&self, direction: Direction) -> Option<String> {
        let target = self.target(direction)?;
        self.analytics.capture(NAVIGATE_BUTTON_EVENT);
        Some(self.navigate_to(&target))
    }

    /// Keyboard shortcut. No analytics event is captured.
    pub fn handle_key(&self, press: &KeyPress) -> Option<String> {
        if self.suppression.suppresses(press.focus) {
            return None;
        }
        let direction = Direction::from_key(&press.key)?;
        let target = self.target(direction)?;
        Some(self.navigate_to(&target))
    }

    fn navigate_to(&self, id: &str) -> String {
        let url = (self.path)(id);
        tracing::debug!(from = %self.current_id, to = id, url = %url, "Detail page navigation");
        self.navigator.push(&url);
        url
    }

    /// Register the keyboard shortcuts for as long as the returned handle lives.
    pub fn mount(&self, hub: &KeyboardHub) -> MountedNav {
        let widget = self.clone();
        let guard = hub.add_listener(move |press| {
            widget.handle_key(press);
        });
        MountedNav {
            nav: self.clone(),
            hub: hub.clone(),
            _listener: guard,
        }
    }
}

/// A mounted widget. Dropping it unregisters the keyboard shortcuts.
pub struct MountedNav {
    nav: DetailPageNav,
    hub: KeyboardHub,
    _listener: ListenerGuard,
}

impl MountedNav {
    pub fn nav(&self) -> &DetailPageNav {
        &self.nav
    }

    /// Swap in a widget with new inputs (current id, path or router). The
    /// new listener is registered before the old one is released.
    pub fn update(self, nav: DetailPageNav) -> MountedNav {
        nav.mount(&self.hub)
    }

    pub fn unmount(self) {}
}

//! Console-side state for the TraceLens web UI: detail page navigation,
//! global keyboard shortcuts and the optional support chat.

pub mod chat;
pub mod keyboard;
pub mod navigation;

use std::sync::Arc;

use tracelens_core::TracelensConfig;

pub use chat::{ChatTrigger, ChatWidget, SupportChat, TracingChatWidget};
pub use keyboard::{FocusTarget, KeyPress, KeyboardHub, ListenerGuard};
pub use navigation::{
    AnalyticsSink, DetailPageLists, DetailPageNav, Direction, MountedNav, NavControl, NavControls,
    Navigator, Neighbors, ShortcutSuppression, TracingAnalytics,
};

/// Per-session console services, built once from startup configuration.
pub struct Console {
    pub lists: DetailPageLists,
    pub keyboard: KeyboardHub,
    pub chat: SupportChat,
    navigator: Arc<dyn Navigator>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl Console {
    pub fn new(
        config: &TracelensConfig,
        navigator: Arc<dyn Navigator>,
        analytics: Arc<dyn AnalyticsSink>,
        chat_widget: Arc<dyn ChatWidget>,
    ) -> Self {
        let chat = SupportChat::new(&config.chat, chat_widget);
        tracing::debug!(chat_available = chat.chat_available(), "Console initialised");
        Self {
            lists: DetailPageLists::new(),
            keyboard: KeyboardHub::new(),
            chat,
            navigator,
            analytics,
        }
    }

    /// Navigation widget for the detail page of `current_id`.
    pub fn detail_page_nav(
        &self,
        current_id: impl Into<String>,
        path: impl Fn(&str) -> String + Send + Sync + 'static,
        list_key: impl Into<String>,
    ) -> DetailPageNav {
        DetailPageNav::new(
            current_id,
            path,
            list_key,
            self.lists.clone(),
            Arc::clone(&self.navigator),
            Arc::clone(&self.analytics),
        )
    }
}

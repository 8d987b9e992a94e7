//! Optional support chat.
//!
//! The chat is enabled by a single site key. Without one every operation is
//! a silent no-op, so call sites never need to check availability first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracelens_core::config::ChatConfig;

/// Named automations the chat provider can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTrigger {
    AfterProjectCreation,
}

impl ChatTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AfterProjectCreation => "after-project-creation",
        }
    }
}

/// Third-party chat widget.
pub trait ChatWidget: Send + Sync {
    fn configure(&self, website_id: &str);
    fn set_email(&self, email: &str);
    fn set_nickname(&self, nickname: &str);
    fn set_session_data(&self, data: &serde_json::Value);
    fn run_trigger(&self, trigger: &str);
    fn open(&self);
}

/// Widget for headless hosts: every command becomes a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingChatWidget;

impl ChatWidget for TracingChatWidget {
    fn configure(&self, website_id: &str) {
        tracing::info!(website_id = website_id, "Support chat configured");
    }

    fn set_email(&self, email: &str) {
        tracing::debug!(email = email, "Support chat email set");
    }

    fn set_nickname(&self, nickname: &str) {
        tracing::debug!(nickname = nickname, "Support chat nickname set");
    }

    fn set_session_data(&self, data: &serde_json::Value) {
        tracing::debug!(data = %data, "Support chat session data set");
    }

    fn run_trigger(&self, trigger: &str) {
        tracing::info!(trigger = trigger, "Support chat trigger run");
    }

    fn open(&self) {
        tracing::info!("Support chat opened");
    }
}

pub struct SupportChat {
    widget: Arc<dyn ChatWidget>,
    site_key: Option<String>,
    configured: AtomicBool,
}

impl SupportChat {
    /// Availability is fixed here from the config and never re-read.
    pub fn new(config: &ChatConfig, widget: Arc<dyn ChatWidget>) -> Self {
        Self {
            widget,
            site_key: config.site_key().map(str::to_string),
            configured: AtomicBool::new(false),
        }
    }

    pub fn chat_available(&self) -> bool {
        self.site_key.is_some()
    }

    /// Configure the widget with the site key. Only the first call has an effect.
    pub fn initialize(&self) {
        let Some(key) = self.site_key.as_deref() else {
            return;
        };
        if !self.configured.swap(true, Ordering::SeqCst) {
            self.widget.configure(key);
        }
    }

    pub fn set_user(&self, name: &str, email: &str, data: &serde_json::Value) {
        if self.chat_available() {
            self.widget.set_email(email);
            self.widget.set_nickname(name);
            self.widget.set_session_data(data);
        }
    }

    pub fn run_trigger(&self, trigger: ChatTrigger) {
        if self.chat_available() {
            self.widget.run_trigger(trigger.as_str());
        }
    }

    pub fn open_chat(&self) {
        if self.chat_available() {
            self.widget.open();
        }
    }
}

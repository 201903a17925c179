// src/notification.rs
//! Notification channel: one slot, each show replaces the previous message.
//! Dismissal timing belongs to the rendering layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

pub trait Notifier: Send + Sync {
    fn show(&self, notification: Notification);
}

// ==================== SINGLE SLOT ====================

#[derive(Debug, Clone, Default)]
pub struct NotificationSlot {
    current: Arc<Mutex<Option<Notification>>>,
    shown: Arc<AtomicU64>,
}

impl NotificationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Notification> {
        self.current.lock().ok().and_then(|slot| slot.clone())
    }

    /// Clears the slot; called by the rendering layer when it hides the message
    pub fn dismiss(&self) {
        if let Ok(mut slot) = self.current.lock() {
            *slot = None;
        }
    }

    pub fn shown_count(&self) -> u64 {
        self.shown.load(Ordering::Relaxed)
    }
}

impl Notifier for NotificationSlot {
    fn show(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => log::info!("{}", notification.message),
            NotificationKind::Error => log::error!("{}", notification.message),
        }
        if let Ok(mut slot) = self.current.lock() {
            *slot = Some(notification);
        }
        self.shown.fetch_add(1, Ordering::Relaxed);
    }
}

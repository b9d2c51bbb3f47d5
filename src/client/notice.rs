//! Client domain: user-visible notifications.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn color(&self) -> Color {
        match self {
            NoticeLevel::Info => Color::srgb(0.55, 0.75, 0.95),
            NoticeLevel::Success => Color::srgb(0.45, 0.85, 0.5),
            NoticeLevel::Warning => Color::srgb(0.95, 0.8, 0.35),
            NoticeLevel::Error => Color::srgb(0.95, 0.4, 0.4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            detail: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title)
    }

    pub fn warning(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title).with_detail(detail)
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title).with_detail(detail)
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {}", self.title, detail),
            None => f.write_str(&self.title),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub remaining: f32,
}

/// Transient notices waiting to expire. Oldest first.
#[derive(Resource, Debug)]
pub struct NoticeBoard {
    toasts: Vec<Toast>,
    lifetime: f32,
    capacity: usize,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self {
            toasts: Vec::new(),
            lifetime: 4.0,
            capacity: 4,
        }
    }
}

impl NoticeBoard {
    pub fn push(&mut self, notice: Notice) {
        if self.toasts.len() >= self.capacity {
            self.toasts.remove(0);
        }
        self.toasts.push(Toast {
            notice,
            remaining: self.lifetime,
        });
    }

    /// Ages every toast and returns true if any expired.
    pub fn tick(&mut self, delta: f32) -> bool {
        let before = self.toasts.len();
        for toast in &mut self.toasts {
            toast.remaining -= delta;
        }
        self.toasts.retain(|t| t.remaining > 0.0);
        self.toasts.len() != before
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}

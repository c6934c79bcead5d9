//! Mock caller-defined drawables.

use std::sync::Arc;

use parking_lot::Mutex;
use strata_render::Drawable;

/// Shared record of which drawables ran, in order.
#[derive(Debug, Clone, Default)]
pub struct DrawLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl DrawLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn push(&self, label: &str) {
        self.entries.lock().push(label.to_owned());
    }
}

/// A drawable that counts its draws and reports them to a [`DrawLog`].
pub struct MockDrawable {
    label: String,
    draws: Mutex<usize>,
    log: Option<DrawLog>,
}

impl MockDrawable {
    pub fn new(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            draws: Mutex::new(0),
            log: None,
        })
    }

    pub fn logged(label: impl Into<String>, log: &DrawLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            draws: Mutex::new(0),
            log: Some(log.clone()),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn draw_count(&self) -> usize {
        *self.draws.lock()
    }
}

impl Drawable for MockDrawable {
    fn draw(&self) {
        *self.draws.lock() += 1;
        if let Some(log) = &self.log {
            log.push(&self.label);
        }
    }
}

//! Render queue configuration.

/// Default number of idle clears before a layer or bin is dropped.
pub const DEFAULT_EVICTION_EPOCHS: u64 = 100;

/// Tuning for [`RenderQueue`](crate::RenderQueue).
///
/// ```
/// use strata_render::RenderQueueConfig;
///
/// let config = RenderQueueConfig::default()
///     .with_layer_eviction_epochs(10)
///     .with_report_saturation(false);
/// assert_eq!(config.layer_eviction_epochs, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderQueueConfig {
    /// Idle clears after which a layer is evicted. A layer last written in
    /// epoch `e` is dropped by the clear that closes epoch `e + n`.
    pub layer_eviction_epochs: u64,
    /// Same policy for pipeline and material bins inside a layer.
    pub bin_eviction_epochs: u64,
    /// Emit a warning when a key field runs out of slots.
    pub report_saturation: bool,
}

impl Default for RenderQueueConfig {
    fn default() -> Self {
        Self {
            layer_eviction_epochs: DEFAULT_EVICTION_EPOCHS,
            bin_eviction_epochs: DEFAULT_EVICTION_EPOCHS,
            report_saturation: true,
        }
    }
}

impl RenderQueueConfig {
    pub fn with_layer_eviction_epochs(mut self, epochs: u64) -> Self {
        self.layer_eviction_epochs = epochs;
        self
    }

    pub fn with_bin_eviction_epochs(mut self, epochs: u64) -> Self {
        self.bin_eviction_epochs = epochs;
        self
    }

    pub fn with_report_saturation(mut self, report: bool) -> Self {
        self.report_saturation = report;
        self
    }
}

use thiserror::Error;

/// A submission the queue refused.
///
/// Rejected submissions leave the queue exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("submission to layer {order} after sort; clear the queue first")]
    SubmitWhileSorted { order: i32 },

    #[error("{sprites} sprites need {needed} vertices, span holds {available}")]
    SpriteSpanTooShort {
        sprites: usize,
        needed: usize,
        available: usize,
    },

    #[error("billboard attribute `{attribute}` holds {available} elements, {count} requested")]
    AttributeTooShort {
        attribute: &'static str,
        available: usize,
        count: usize,
    },
}

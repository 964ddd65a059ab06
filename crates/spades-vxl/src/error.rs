use thiserror::Error;

#[derive(Debug, Error)]
pub enum VxlError {
    #[error("map data ends early in column ({x}, {y}) at byte {offset}")]
    Truncated { x: i32, y: i32, offset: usize },
    #[error("corrupt span in column ({x}, {y}) at byte {offset}: {reason}")]
    CorruptSpan {
        x: i32,
        y: i32,
        offset: usize,
        reason: &'static str,
    },
    #[error("{extra} unexpected bytes after the last column")]
    TrailingBytes { extra: usize },
    #[error("map load worker panicked")]
    WorkerPanicked,
    #[error("map io: {0}")]
    Io(#[from] std::io::Error),
}

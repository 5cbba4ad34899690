use thiserror::Error;

/// Errors raised by kernel operations.
///
/// All of them are local to a single gesture step; none invalidates the
/// session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error("Degenerate viewport: {width}x{height}")]
    DegenerateViewport { width: f64, height: f64 },
    #[error("Pick has no face or fragment data")]
    NoFaceData,
    #[error("Vertex index {index} out of range for {vertex_count} vertices")]
    GeometryError { index: u32, vertex_count: usize },
    #[error("Invalid mesh buffer: {0}")]
    InvalidBuffer(String),
    #[error("Vertex buffer cannot be viewed as f32: {0}")]
    BufferCast(String),
}

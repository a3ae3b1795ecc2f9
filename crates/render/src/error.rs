use thiserror::Error;

/// Error returned by the public render entry points.
///
/// The cause is logged where it happens and never carried to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Parsing or a rendering stage failed.
    #[error("failed to parse markdown content")]
    Failed,
}

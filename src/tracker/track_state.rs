/// Lifecycle of a trajectory buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BufferState {
    /// Created, nothing appended yet
    #[default]
    Empty,
    /// At least one point appended, still accepting points
    Recording,
    /// Read-only; further appends are ignored
    Sealed,
}


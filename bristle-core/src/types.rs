/// Identifier for a bristle in a [`crate::brush::Brush`].
///
/// This is an index into the brush's bristle arena, and is only meaningful
/// within the lifetime of a given `Brush` instance.
pub type BristleId = usize;

/// Identifier for a step along a [`crate::trace::Trace`] path.
pub type StepId = usize;

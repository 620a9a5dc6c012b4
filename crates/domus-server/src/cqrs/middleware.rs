//! Marker traits separating write operations from reads.

/// A state-changing operation. Every command ends up in the audit trail one
/// way or another (for imports, as an `upload_history` row).
pub trait Command {}

/// A read-only operation.
pub trait Query {}

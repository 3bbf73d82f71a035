/// LAS/LAZ source and sink.
pub mod las;

/// In-memory source and sink.
pub mod memory;

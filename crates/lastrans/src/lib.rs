#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Accumulated statistics over written points.
pub mod inventory;

/// Point stream readers and writers.
pub mod io;

/// Transform matrix and transform file loading.
pub mod matrix;

/// Read, transform and write loop.
pub mod pipeline;

/// Scale/offset quantization of point coordinates.
pub mod quantizer;

/// Point source and sink traits.
pub mod stream;

/// Affine transform of 3D coordinates.
pub mod transform;

use crate::inventory::{Bounds, StreamHeader};
use crate::quantizer::{QuantizeError, QuantizedPoint};

/// Error types for point stream reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Failed to read or write the stream
    #[error("point stream i/o failed")]
    Io(#[from] std::io::Error),

    /// Failed to decode or encode a LAS/LAZ record
    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    /// Failed to quantize a point
    #[error(transparent)]
    Quantize(#[from] QuantizeError),

    /// The stream was already closed
    #[error("point stream is closed")]
    Closed,

    /// The written header disagrees with the inventory
    #[error("output header holds {written} points with bounds {bounds:?} but the inventory holds {accounted} points with bounds {expected:?}")]
    HeaderMismatch {
        /// Point count of the written header.
        written: u64,
        /// Bounds of the written header.
        bounds: Bounds,
        /// Point count of the inventory.
        accounted: u64,
        /// Bounds of the inventory.
        expected: Bounds,
    },
}

/// A stream of points read one at a time.
pub trait PointSource {
    /// Get the header of the stream.
    fn header(&self) -> &StreamHeader;

    /// Read the next point.
    ///
    /// Returns `Ok(None)` at the end of the stream.
    fn read_next(&mut self) -> Result<Option<QuantizedPoint>, StreamError>;

    /// Release the stream.
    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }
}

/// A stream of points written one at a time.
pub trait PointSink {
    /// Write a point.
    fn write(&mut self, point: &QuantizedPoint) -> Result<(), StreamError>;

    /// Account a written point in the inventory.
    fn update_inventory(&mut self, point: &QuantizedPoint);

    /// Reconcile the output header with the inventory.
    ///
    /// # Arguments
    ///
    /// * `header` - The header of the source stream.
    /// * `recompute_bounds` - Take the bounds from the inventory.
    ///
    /// # Returns
    ///
    /// The header the sink will write.
    fn finalize_header(
        &mut self,
        header: &StreamHeader,
        recompute_bounds: bool,
    ) -> Result<StreamHeader, StreamError>;

    /// Flush and release the stream.
    ///
    /// Returns the total number of bytes written. Writes after closing fail.
    fn close(&mut self) -> Result<u64, StreamError>;
}

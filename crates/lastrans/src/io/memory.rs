use crate::inventory::{Bounds, Inventory, StreamHeader};
use crate::quantizer::{QuantizedPoint, Quantizer};
use crate::stream::{PointSink, PointSource, StreamError};

/// A point source over an iterator of records.
///
/// Records are pulled from the iterator one at a time, so a lazy iterator
/// never holds more than one point.
#[derive(Debug)]
pub struct MemorySource<I> {
    header: StreamHeader,
    points: I,
}

impl<I: Iterator<Item = las::Point>> MemorySource<I> {
    /// Create a new source from a header and an iterator of records.
    pub fn new(header: StreamHeader, points: I) -> Self {
        Self { header, points }
    }
}

impl MemorySource<std::vec::IntoIter<las::Point>> {
    /// Create a new source over a vector of records.
    ///
    /// The header point count and bounds are computed from the records.
    pub fn from_points(quantizer: Quantizer, points: Vec<las::Point>) -> Self {
        let mut header = StreamHeader::new(quantizer);
        header.point_count = points.len() as u64;
        let mut it = points.iter().map(|p| [p.x, p.y, p.z]);
        if let Some(first) = it.next() {
            header.bounds = it.fold(Bounds::from_point(&first), |mut b, p| {
                b.grow(&p);
                b
            });
        }
        Self::new(header, points.into_iter())
    }
}

impl<I: Iterator<Item = las::Point>> PointSource for MemorySource<I> {
    fn header(&self) -> &StreamHeader {
        &self.header
    }

    fn read_next(&mut self) -> Result<Option<QuantizedPoint>, StreamError> {
        match self.points.next() {
            Some(p) => Ok(Some(QuantizedPoint::new(p, self.header.quantizer)?)),
            None => Ok(None),
        }
    }
}

/// A point sink collecting records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    points: Vec<las::Point>,
    inventory: Inventory,
    header: Option<StreamHeader>,
    discard: bool,
    closed: bool,
}

impl MemorySink {
    /// Create a new sink keeping every written record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new sink that only keeps the inventory.
    pub fn discarding() -> Self {
        Self {
            discard: true,
            ..Default::default()
        }
    }

    /// Get the written records.
    pub fn points(&self) -> &[las::Point] {
        &self.points
    }

    /// Get the inventory of written points.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Get the finalized header, if any.
    pub fn header(&self) -> Option<&StreamHeader> {
        self.header.as_ref()
    }
}

impl PointSink for MemorySink {
    fn write(&mut self, point: &QuantizedPoint) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::Closed);
        }
        if !self.discard {
            self.points.push(point.as_las().clone());
        }
        Ok(())
    }

    fn update_inventory(&mut self, point: &QuantizedPoint) {
        self.inventory.add(point);
    }

    fn finalize_header(
        &mut self,
        header: &StreamHeader,
        recompute_bounds: bool,
    ) -> Result<StreamHeader, StreamError> {
        let header = self.inventory.finalize_header(header, recompute_bounds);
        self.header = Some(header.clone());
        Ok(header)
    }

    /// Nothing is encoded, so no bytes are reported.
    fn close(&mut self) -> Result<u64, StreamError> {
        self.closed = true;
        Ok(0)
    }
}

use crate::quantizer::{QuantizedPoint, Quantizer};

/// Highest return number tracked per point record.
pub const MAX_RETURN_NUMBER: usize = 15;

/// An axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// The minimum corner.
    pub min: [f64; 3],
    /// The maximum corner.
    pub max: [f64; 3],
}

impl Bounds {
    /// Create a degenerate box holding a single point.
    pub fn from_point(p: &[f64; 3]) -> Self {
        Self { min: *p, max: *p }
    }

    /// Grow the box to include a point.
    pub fn grow(&mut self, p: &[f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from_point(&[0.0; 3])
    }
}

/// Description of a point stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamHeader {
    /// Number of points in the stream.
    pub point_count: u64,
    /// Number of points per return number, index 0 is return 1.
    pub points_by_return: [u64; MAX_RETURN_NUMBER],
    /// The quantizer of the stored coordinates.
    pub quantizer: Quantizer,
    /// Bounding box of the points.
    pub bounds: Bounds,
}

impl StreamHeader {
    /// Create a header for an empty stream.
    pub fn new(quantizer: Quantizer) -> Self {
        Self {
            point_count: 0,
            points_by_return: [0; MAX_RETURN_NUMBER],
            quantizer,
            bounds: Bounds::default(),
        }
    }
}

/// Running statistics over written points.
///
/// Bounds are kept on the integer coordinates and only converted to real
/// coordinates when finalizing.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    point_count: u64,
    points_by_return: [u64; MAX_RETURN_NUMBER],
    raw_bounds: Option<([i32; 3], [i32; 3])>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a written point.
    pub fn add(&mut self, point: &QuantizedPoint) {
        self.point_count += 1;

        let return_number = point.return_number() as usize;
        if (1..=MAX_RETURN_NUMBER).contains(&return_number) {
            self.points_by_return[return_number - 1] += 1;
        }

        let raw = point.raw_xyz();
        let (min, max) = self.raw_bounds.get_or_insert((raw, raw));
        for i in 0..3 {
            min[i] = min[i].min(raw[i]);
            max[i] = max[i].max(raw[i]);
        }
    }

    /// Get the number of points added.
    #[inline]
    pub fn point_count(&self) -> u64 {
        self.point_count
    }

    /// Get the number of points added per return number.
    #[inline]
    pub fn points_by_return(&self) -> &[u64; MAX_RETURN_NUMBER] {
        &self.points_by_return
    }

    /// Get the bounding box of the added points in real coordinates.
    ///
    /// Returns `None` if no point was added.
    pub fn bounds(&self, quantizer: &Quantizer) -> Option<Bounds> {
        self.raw_bounds.map(|(min, max)| {
            // a negative scale factor swaps the corners
            let mut bounds = Bounds::from_point(&quantizer.dequantize_xyz(&min));
            bounds.grow(&quantizer.dequantize_xyz(&max));
            bounds
        })
    }

    /// Reconcile a header with the added points.
    ///
    /// # Arguments
    ///
    /// * `header` - The header to start from.
    /// * `recompute_bounds` - Take the bounds from the added points instead of `header`.
    ///
    /// # Returns
    ///
    /// The header with point counts from the inventory.
    pub fn finalize_header(&self, header: &StreamHeader, recompute_bounds: bool) -> StreamHeader {
        let mut out = header.clone();
        out.point_count = self.point_count;
        out.points_by_return = self.points_by_return;
        if recompute_bounds {
            out.bounds = self.bounds(&header.quantizer).unwrap_or_default();
        }
        out
    }
}

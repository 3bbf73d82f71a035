const AXES: [char; 3] = ['x', 'y', 'z'];

/// Error types for coordinate quantization.
#[derive(Debug, thiserror::Error)]
pub enum QuantizeError {
    /// The scale factor of an axis cannot be used
    #[error("invalid scale factor {scale} for axis {axis}")]
    InvalidScale {
        /// The axis name.
        axis: char,
        /// The rejected scale factor.
        scale: f64,
    },

    /// The coordinate does not fit the 32 bit integer range
    #[error("coordinate {value} on axis {axis} cannot be quantized")]
    OutOfRange {
        /// The axis name.
        axis: char,
        /// The real coordinate.
        value: f64,
    },
}

/// Per axis linear mapping between stored integers and real coordinates.
///
/// `real = integer * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    scale: [f64; 3],
    offset: [f64; 3],
}

impl Quantizer {
    /// Create a new quantizer from per axis scale factors and offsets.
    pub fn new(scale: [f64; 3], offset: [f64; 3]) -> Result<Self, QuantizeError> {
        for (axis, &s) in AXES.iter().zip(scale.iter()) {
            if s == 0.0 || !s.is_finite() {
                return Err(QuantizeError::InvalidScale {
                    axis: *axis,
                    scale: s,
                });
            }
        }
        for (axis, &o) in AXES.iter().zip(offset.iter()) {
            if !o.is_finite() {
                return Err(QuantizeError::OutOfRange {
                    axis: *axis,
                    value: o,
                });
            }
        }
        Ok(Self { scale, offset })
    }

    /// Get the scale factors.
    #[inline]
    pub fn scale(&self) -> [f64; 3] {
        self.scale
    }

    /// Get the offsets.
    #[inline]
    pub fn offset(&self) -> [f64; 3] {
        self.offset
    }

    /// Quantize a real coordinate on the given axis (0, 1 or 2).
    pub fn quantize(&self, axis: usize, value: f64) -> Result<i32, QuantizeError> {
        let n = ((value - self.offset[axis]) / self.scale[axis]).round();
        if !n.is_finite() || n < i32::MIN as f64 || n > i32::MAX as f64 {
            return Err(QuantizeError::OutOfRange {
                axis: AXES[axis],
                value,
            });
        }
        Ok(n as i32)
    }

    /// Convert a stored integer on the given axis (0, 1 or 2) back to a real coordinate.
    #[inline]
    pub fn dequantize(&self, axis: usize, raw: i32) -> f64 {
        raw as f64 * self.scale[axis] + self.offset[axis]
    }

    /// Quantize a 3D point.
    pub fn quantize_xyz(&self, xyz: &[f64; 3]) -> Result<[i32; 3], QuantizeError> {
        Ok([
            self.quantize(0, xyz[0])?,
            self.quantize(1, xyz[1])?,
            self.quantize(2, xyz[2])?,
        ])
    }

    /// Dequantize a 3D point.
    pub fn dequantize_xyz(&self, raw: &[i32; 3]) -> [f64; 3] {
        [
            self.dequantize(0, raw[0]),
            self.dequantize(1, raw[1]),
            self.dequantize(2, raw[2]),
        ]
    }
}

/// A point record with coupled integer and real coordinates.
///
/// The carried [`las::Point`] holds every attribute of the record. Its real
/// coordinates always equal the dequantized integer coordinates, so a writer
/// using the same quantizer stores exactly [`QuantizedPoint::raw_xyz`].
#[derive(Debug, Clone)]
pub struct QuantizedPoint {
    // The record with all its attributes.
    inner: las::Point,
    // The quantizer of the stream the point belongs to.
    quantizer: Quantizer,
    // The stored integer coordinates.
    raw: [i32; 3],
}

impl QuantizedPoint {
    /// Create a new point, quantizing the coordinates of the record.
    pub fn new(point: las::Point, quantizer: Quantizer) -> Result<Self, QuantizeError> {
        let mut this = Self {
            raw: [0; 3],
            inner: point,
            quantizer,
        };
        let xyz = [this.inner.x, this.inner.y, this.inner.z];
        this.set_xyz(xyz)?;
        Ok(this)
    }

    /// Get the real coordinates.
    #[inline]
    pub fn xyz(&self) -> [f64; 3] {
        [self.inner.x, self.inner.y, self.inner.z]
    }

    /// Get the integer coordinates.
    #[inline]
    pub fn raw_xyz(&self) -> [i32; 3] {
        self.raw
    }

    /// Set the real coordinates, updating the integer coordinates.
    ///
    /// The stored real coordinates are the dequantized values, so they may
    /// differ from `xyz` by up to half the scale factor on each axis. On
    /// error the point is left unchanged.
    pub fn set_xyz(&mut self, xyz: [f64; 3]) -> Result<(), QuantizeError> {
        let raw = self.quantizer.quantize_xyz(&xyz)?;
        let [x, y, z] = self.quantizer.dequantize_xyz(&raw);
        self.raw = raw;
        self.inner.x = x;
        self.inner.y = y;
        self.inner.z = z;
        Ok(())
    }

    /// Get the quantizer of the point.
    #[inline]
    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Get the return number of the point.
    #[inline]
    pub fn return_number(&self) -> u8 {
        self.inner.return_number
    }

    /// Get the red, green and blue channels, if the record has a color.
    pub fn rgb(&self) -> Option<[u16; 3]> {
        self.inner.color.map(|c| [c.red, c.green, c.blue])
    }

    /// Get as reference the underlying record.
    #[inline]
    pub fn as_las(&self) -> &las::Point {
        &self.inner
    }

    /// Consume the point and return the underlying record.
    pub fn into_las(self) -> las::Point {
        self.inner
    }
}

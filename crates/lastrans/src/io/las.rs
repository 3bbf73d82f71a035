use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::str::FromStr;

use crate::inventory::{Bounds, Inventory, StreamHeader, MAX_RETURN_NUMBER};
use crate::quantizer::{QuantizedPoint, Quantizer};
use crate::stream::{PointSink, PointSource, StreamError};

/// Where a point stream is read from or written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    /// A file on disk.
    Path(PathBuf),
    /// Standard input or standard output.
    Stdio,
}

impl StreamTarget {
    /// Parse a stream descriptor, `-` being standard input/output.
    pub fn parse(s: &str) -> Self {
        match s {
            "-" => Self::Stdio,
            path => Self::Path(PathBuf::from(path)),
        }
    }
}

impl FromStr for StreamTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Stdio => write!(f, "-"),
        }
    }
}

/// Build the stream header from a LAS header.
pub fn stream_header(header: &las::Header) -> Result<StreamHeader, StreamError> {
    let t = header.transforms();
    let quantizer = Quantizer::new(
        [t.x.scale, t.y.scale, t.z.scale],
        [t.x.offset, t.y.offset, t.z.offset],
    )?;

    let mut points_by_return = [0; MAX_RETURN_NUMBER];
    for (i, count) in points_by_return.iter_mut().enumerate() {
        *count = header
            .number_of_points_by_return(i as u8 + 1)
            .unwrap_or(0);
    }

    let bounds = header.bounds();
    Ok(StreamHeader {
        point_count: header.number_of_points(),
        points_by_return,
        quantizer,
        bounds: Bounds {
            min: [bounds.min.x, bounds.min.y, bounds.min.z],
            max: [bounds.max.x, bounds.max.y, bounds.max.z],
        },
    })
}

/// A point source reading a LAS or LAZ stream.
pub struct LasSource {
    reader: las::Reader,
    header: StreamHeader,
}

impl LasSource {
    /// Open a LAS/LAZ file or standard input.
    ///
    /// Standard input is read to the end before the first point is decoded,
    /// since the LAS reader needs to seek.
    pub fn open(target: &StreamTarget) -> Result<Self, StreamError> {
        let reader = match target {
            StreamTarget::Path(path) => las::Reader::from_path(path)?,
            StreamTarget::Stdio => {
                let mut buf = Vec::new();
                std::io::stdin().lock().read_to_end(&mut buf)?;
                las::Reader::new(Cursor::new(buf))?
            }
        };
        let header = stream_header(reader.header())?;
        Ok(Self { reader, header })
    }

    /// Get the LAS header of the stream.
    pub fn las_header(&self) -> &las::Header {
        self.reader.header()
    }
}

impl PointSource for LasSource {
    fn header(&self) -> &StreamHeader {
        &self.header
    }

    fn read_next(&mut self) -> Result<Option<QuantizedPoint>, StreamError> {
        match self.reader.points().next().transpose()? {
            Some(point) => Ok(Some(QuantizedPoint::new(point, self.header.quantizer)?)),
            None => Ok(None),
        }
    }
}

enum Output {
    Path(PathBuf),
    // anonymous file holding the stream until it is copied to stdout
    Stdout(File),
}

/// A point sink writing a LAS or LAZ stream.
///
/// The `las` writer rewrites the point counts and bounds of the file header
/// from the written points when it is closed. The file always carries the
/// recomputed bounds; `recompute_bounds` only affects the header returned by
/// [`PointSink::finalize_header`]. Closing fails with
/// [`StreamError::HeaderMismatch`] if the written header disagrees with the
/// inventory.
pub struct LasSink {
    writer: Option<las::Writer<BufWriter<File>>>,
    output: Output,
    inventory: Inventory,
}

impl LasSink {
    /// Create a LAS/LAZ file, or a stream to standard output.
    ///
    /// # Arguments
    ///
    /// * `target` - Where to write. A `.laz` path is compressed.
    /// * `header` - The header of the source stream; point format, version,
    ///   scale and offset are kept.
    pub fn create(target: &StreamTarget, header: &las::Header) -> Result<Self, StreamError> {
        let (writer, output) = match target {
            StreamTarget::Path(path) => (
                las::Writer::from_path(path, header.clone())?,
                Output::Path(path.clone()),
            ),
            StreamTarget::Stdio => {
                let file = tempfile::tempfile()?;
                let handle = file.try_clone()?;
                (
                    las::Writer::new(BufWriter::new(file), header.clone())?,
                    Output::Stdout(handle),
                )
            }
        };
        Ok(Self {
            writer: Some(writer),
            output,
            inventory: Inventory::new(),
        })
    }

    /// Get the inventory of written points.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn check_header(&self, header: &las::Header) -> Result<(), StreamError> {
        let written = header.number_of_points();
        let b = header.bounds();
        let bounds = Bounds {
            min: [b.min.x, b.min.y, b.min.z],
            max: [b.max.x, b.max.y, b.max.z],
        };

        let accounted = self.inventory.point_count();
        let quantizer = stream_header(header)?.quantizer;
        let expected = self.inventory.bounds(&quantizer);

        // bounds agree within half a quantization step
        let tolerance = quantizer.scale().map(|s| s.abs() / 2.0);
        let bounds_match = expected.map_or(true, |e| {
            (0..3).all(|i| {
                (e.min[i] - bounds.min[i]).abs() <= tolerance[i]
                    && (e.max[i] - bounds.max[i]).abs() <= tolerance[i]
            })
        });

        if written != accounted || !bounds_match {
            return Err(StreamError::HeaderMismatch {
                written,
                bounds,
                accounted,
                expected: expected.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

impl PointSink for LasSink {
    fn write(&mut self, point: &QuantizedPoint) -> Result<(), StreamError> {
        let writer = self.writer.as_mut().ok_or(StreamError::Closed)?;
        writer.write_point(point.as_las().clone())?;
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
        log::debug!(
            "output header: {} points, bounds {:?} - {:?}",
            header.point_count,
            header.bounds.min,
            header.bounds.max
        );
        Ok(header)
    }

    fn close(&mut self) -> Result<u64, StreamError> {
        let mut writer = self.writer.take().ok_or(StreamError::Closed)?;
        writer.close()?;
        let check = self.check_header(writer.header());
        drop(writer);
        check?;

        let bytes = match &mut self.output {
            Output::Path(path) => std::fs::metadata(path)?.len(),
            Output::Stdout(file) => {
                file.seek(SeekFrom::Start(0))?;
                let mut stdout = std::io::stdout().lock();
                let bytes = std::io::copy(file, &mut stdout)?;
                stdout.flush()?;
                bytes
            }
        };
        Ok(bytes)
    }
}

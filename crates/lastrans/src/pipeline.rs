use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::inventory::StreamHeader;
use crate::io::las::{LasSink, LasSource, StreamTarget};
use crate::matrix::{load_transform, TransformFileError, TransformMatrix};
use crate::stream::{PointSink, PointSource, StreamError};
use crate::transform::transform_point;

/// Number of leading points logged in detail.
const NUM_LOGGED_POINTS: u64 = 5;

/// Number of points between two progress messages.
const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Error types for a transform run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to load the transform file
    #[error("failed to load transform file {path}")]
    Transform {
        /// The transform file.
        path: PathBuf,
        /// The loader error.
        #[source]
        source: TransformFileError,
    },

    /// Failed to open the point source
    #[error("could not open point source '{target}'")]
    SourceOpen {
        /// The input stream.
        target: StreamTarget,
        /// The reader error.
        #[source]
        source: StreamError,
    },

    /// Failed to open the point sink
    #[error("could not open point sink '{target}'")]
    SinkOpen {
        /// The output stream.
        target: StreamTarget,
        /// The writer error.
        #[source]
        source: StreamError,
    },

    /// Failed to read, write or finalize the stream
    #[error("point stream failed after {points} points")]
    Stream {
        /// Number of points written before the failure.
        points: u64,
        /// The stream error.
        #[source]
        source: StreamError,
    },
}

/// Outcome of a transform run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of points transformed and written.
    pub points: u64,
    /// The finalized output header.
    pub header: StreamHeader,
    /// Total bytes written by the sink.
    pub bytes_written: u64,
    /// Wall time of the run.
    pub elapsed: Duration,
}

/// Transform every point of a source and write it to a sink.
///
/// Points are read, transformed, written and accounted one at a time; no
/// point is held past its iteration.
///
/// # Arguments
///
/// * `matrix` - The transform to apply.
/// * `source` - The stream to read from.
/// * `sink` - The stream to write to.
///
/// # Returns
///
/// The number of points processed.
pub fn run_pipeline<S, W>(
    matrix: &TransformMatrix,
    source: &mut S,
    sink: &mut W,
) -> Result<u64, PipelineError>
where
    S: PointSource + ?Sized,
    W: PointSink + ?Sized,
{
    let mut count = 0u64;
    let stream_error = |points, source| PipelineError::Stream { points, source };

    while let Some(mut point) = source.read_next().map_err(|e| stream_error(count, e))? {
        let xyz = transform_point(matrix, &point.xyz());
        point
            .set_xyz(xyz)
            .map_err(|e| stream_error(count, StreamError::from(e)))?;

        sink.write(&point).map_err(|e| stream_error(count, e))?;
        sink.update_inventory(&point);

        if count < NUM_LOGGED_POINTS {
            let [x, y, z] = point.xyz();
            let [raw_x, raw_y, raw_z] = point.raw_xyz();
            let [r, g, b] = point.rgb().unwrap_or_default();
            let q = point.quantizer();
            log::debug!(
                "after: {count}: X {raw_x} Y {raw_y} Z {raw_z} x {x:.6} y {y:.6} z {z:.6} R {r} G {g} B {b} z scale {:.6} z offset {:.6}",
                q.scale()[2],
                q.offset()[2],
            );
        }
        count += 1;
        if count % PROGRESS_INTERVAL == 0 {
            log::debug!("processed {count} points");
        }
    }

    Ok(count)
}

/// Reconcile the sink header with its inventory and close the sink.
///
/// Must be called once, after the last point was written.
///
/// # Returns
///
/// The finalized header and the total number of bytes written.
pub fn finalize_header<W>(
    sink: &mut W,
    header: &StreamHeader,
    points: u64,
) -> Result<(StreamHeader, u64), PipelineError>
where
    W: PointSink + ?Sized,
{
    let stream_error = |source| PipelineError::Stream { points, source };
    let header = sink.finalize_header(header, true).map_err(stream_error)?;
    let bytes = sink.close().map_err(stream_error)?;
    Ok((header, bytes))
}

/// Run the whole transform of an opened source into an opened sink.
///
/// The source is closed after the sink is finalized.
pub fn transform_stream<S, W>(
    matrix: &TransformMatrix,
    source: &mut S,
    sink: &mut W,
) -> Result<RunSummary, PipelineError>
where
    S: PointSource + ?Sized,
    W: PointSink + ?Sized,
{
    let start = Instant::now();

    let points = run_pipeline(matrix, source, sink)?;
    let (header, bytes_written) = finalize_header(sink, source.header(), points)?;
    source
        .close()
        .map_err(|source| PipelineError::Stream { points, source })?;

    let announced = source.header().point_count;
    if announced != points {
        log::warn!("source header announced {announced} points but {points} were read");
    }

    Ok(RunSummary {
        points,
        header,
        bytes_written,
        elapsed: start.elapsed(),
    })
}

/// A transform run from a transform file, an input and an output stream.
#[derive(Debug, Clone)]
pub struct TransformJob {
    /// Path of the transform file.
    pub transform: PathBuf,
    /// The LAS/LAZ input.
    pub input: StreamTarget,
    /// The LAS/LAZ output.
    pub output: StreamTarget,
}

impl TransformJob {
    /// Load the transform, open both streams and transform every point.
    ///
    /// Nothing is opened if the transform file is invalid.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let matrix = load_transform(&self.transform).map_err(|source| PipelineError::Transform {
            path: self.transform.clone(),
            source,
        })?;

        let mut source =
            LasSource::open(&self.input).map_err(|source| PipelineError::SourceOpen {
                target: self.input.clone(),
                source,
            })?;

        let mut sink = LasSink::create(&self.output, source.las_header()).map_err(|source| {
            PipelineError::SinkOpen {
                target: self.output.clone(),
                source,
            }
        })?;

        log::info!(
            "reading {} points from '{}' and writing them modified to '{}'",
            source.header().point_count,
            self.input,
            self.output
        );

        let summary = transform_stream(&matrix, &mut source, &mut sink)?;

        log::info!(
            "total time: {:?} {} bytes for {} points",
            summary.elapsed,
            summary.bytes_written,
            summary.points
        );

        Ok(summary)
    }
}

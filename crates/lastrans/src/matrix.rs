use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Tolerance used when checking the homogeneous row of a matrix.
const AFFINE_ROW_TOLERANCE: f64 = 1e-9;

/// Error types for the transform file loader.
#[derive(Debug, thiserror::Error)]
pub enum TransformFileError {
    /// Failed to read the transform file
    #[error("failed to read transform file")]
    Io(#[from] std::io::Error),

    /// No data rows were found in the file
    #[error("transform file is empty")]
    Empty,

    /// The data rows do not form a 4x4 matrix
    #[error("transform file must hold 4 rows of 4 values, got {rows} rows with {cols} values")]
    Shape {
        /// Number of data rows found.
        rows: usize,
        /// Number of values in the first row of the wrong length.
        cols: usize,
    },

    /// A token is not a real number
    #[error("invalid number '{token}' on line {line}")]
    Parse {
        /// The 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// The last row is not [0, 0, 0, 1]
    #[error("last row must be [0 0 0 1] for an affine transform, got {row:?}")]
    NotAffine {
        /// The last row as read.
        row: [f64; 4],
    },
}

/// A 4x4 homogeneous affine transform, stored row-major.
///
/// The last row is always `[0, 0, 0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix {
    rows: [[f64; 4]; 4],
}

impl TransformMatrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create a transform from its four rows.
    ///
    /// Fails with [`TransformFileError::NotAffine`] if the last row is not `[0, 0, 0, 1]`.
    pub fn from_rows(rows: [[f64; 4]; 4]) -> Result<Self, TransformFileError> {
        let last = rows[3];
        let is_affine = last
            .iter()
            .zip([0.0, 0.0, 0.0, 1.0])
            .all(|(a, b)| (a - b).abs() <= AFFINE_ROW_TOLERANCE);
        if !is_affine {
            return Err(TransformFileError::NotAffine { row: last });
        }
        Ok(Self { rows })
    }

    /// Create a transform from a 3x3 linear part and a translation.
    pub fn from_rotation_translation(linear: &[[f64; 3]; 3], translation: &[f64; 3]) -> Self {
        let mut rows = Self::IDENTITY.rows;
        for i in 0..3 {
            rows[i][..3].copy_from_slice(&linear[i]);
            rows[i][3] = translation[i];
        }
        Self { rows }
    }

    /// Get the rows of the matrix.
    #[inline]
    pub fn rows(&self) -> &[[f64; 4]; 4] {
        &self.rows
    }

    /// Get the 3x3 linear part.
    pub fn linear(&self) -> [[f64; 3]; 3] {
        let mut linear = [[0.0; 3]; 3];
        for (dst, src) in linear.iter_mut().zip(self.rows.iter()) {
            dst.copy_from_slice(&src[..3]);
        }
        linear
    }

    /// Get the translation column.
    pub fn translation(&self) -> [f64; 3] {
        [self.rows[0][3], self.rows[1][3], self.rows[2][3]]
    }
}

impl Default for TransformMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for TransformMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} {} {} {}", row[0], row[1], row[2], row[3])?;
        }
        Ok(())
    }
}

/// Read a transform matrix from a text file.
///
/// # Arguments
///
/// * `path` - The path to the transform file.
///
/// # Returns
///
/// The validated transform matrix.
///
/// See [`parse_transform`] for the file format.
pub fn load_transform(path: impl AsRef<Path>) -> Result<TransformMatrix, TransformFileError> {
    let file = File::open(path)?;
    parse_transform(BufReader::new(file))
}

/// Parse a transform matrix from text.
///
/// Lines starting with `V` or `M` are header lines and are skipped, as are
/// blank lines. Every other line is a row of whitespace separated numbers.
/// Exactly four rows of four numbers must remain, the last one `[0 0 0 1]`.
///
/// Example:
///
/// ```
/// use lastrans::matrix::parse_transform;
///
/// let text = "1 0 0 10\n0 1 0 20\n0 0 1 30\n0 0 0 1\n";
/// let matrix = parse_transform(text.as_bytes()).unwrap();
/// assert_eq!(matrix.translation(), [10.0, 20.0, 30.0]);
/// ```
pub fn parse_transform<R: BufRead>(reader: R) -> Result<TransformMatrix, TransformFileError> {
    let mut data = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('V') || line.starts_with('M') || line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| TransformFileError::Parse {
                    line: idx + 1,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        data.push(row);
    }

    if data.is_empty() {
        return Err(TransformFileError::Empty);
    }

    let shape_error = || TransformFileError::Shape {
        rows: data.len(),
        cols: data
            .iter()
            .map(Vec::len)
            .find(|&n| n != 4)
            .unwrap_or(4),
    };
    if data.len() != 4 || data.iter().any(|row| row.len() != 4) {
        return Err(shape_error());
    }

    let mut rows = [[0.0; 4]; 4];
    for (dst, src) in rows.iter_mut().zip(data.iter()) {
        dst.copy_from_slice(src);
    }

    let matrix = TransformMatrix::from_rows(rows)?;
    log::info!("read transform:\n{matrix}");

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_translation() -> Result<(), TransformFileError> {
        let text = "1 0 0 10\n0 1 0 20\n0 0 1 30\n0 0 0 1\n";
        let matrix = parse_transform(text.as_bytes())?;
        assert_eq!(matrix.translation(), [10.0, 20.0, 30.0]);
        assert_eq!(
            matrix.linear(),
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
        );
        Ok(())
    }

    #[test]
    fn test_parse_skips_header_lines() -> Result<(), TransformFileError> {
        let text = "VERSION 1\nMatrix:\n\n0 -1 0 1.5\n1 0 0 -2\n0 0 1 0.25\n\n0 0 0 1\n";
        let matrix = parse_transform(text.as_bytes())?;
        assert_eq!(matrix.rows()[0], [0.0, -1.0, 0.0, 1.5]);
        assert_eq!(matrix.rows()[1], [1.0, 0.0, 0.0, -2.0]);
        assert_eq!(matrix.translation(), [1.5, -2.0, 0.25]);
        Ok(())
    }

    #[test]
    fn test_parse_tabs_and_exponents() -> Result<(), TransformFileError> {
        let text = "1\t0\t0\t1e3\n0 1 0 -2.5E-1\n0 0 1 0\n0 0 0 1";
        let matrix = parse_transform(text.as_bytes())?;
        assert_eq!(matrix.translation(), [1000.0, -0.25, 0.0]);
        Ok(())
    }

    #[test]
    fn test_parse_empty() {
        let res = parse_transform("".as_bytes());
        assert!(matches!(res, Err(TransformFileError::Empty)));
    }

    #[test]
    fn test_parse_only_header_lines() {
        let res = parse_transform("V 2\nM 4x4\nMETA\n".as_bytes());
        assert!(matches!(res, Err(TransformFileError::Empty)));
    }

    #[test]
    fn test_parse_too_few_rows() {
        let text = "1 0 0 0\n0 1 0 0\n0 0 1 0\n";
        let res = parse_transform(text.as_bytes());
        assert!(matches!(
            res,
            Err(TransformFileError::Shape { rows: 3, cols: 4 })
        ));
    }

    #[test]
    fn test_parse_short_row() {
        let text = "1 0 0 0\n0 1 0\n0 0 1 0\n0 0 0 1\n";
        let res = parse_transform(text.as_bytes());
        assert!(matches!(
            res,
            Err(TransformFileError::Shape { rows: 4, cols: 3 })
        ));
    }

    #[test]
    fn test_parse_extra_row() {
        let text = "1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 0 1\n0 0 0 1\n";
        let res = parse_transform(text.as_bytes());
        assert!(matches!(
            res,
            Err(TransformFileError::Shape { rows: 5, cols: 4 })
        ));
    }

    #[test]
    fn test_parse_invalid_number() {
        let text = "1 0 0 0\n0 1 x 0\n0 0 1 0\n0 0 0 1\n";
        match parse_transform(text.as_bytes()) {
            Err(TransformFileError::Parse { line, token }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "x");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_not_affine() {
        let text = "1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 1 1\n";
        let res = parse_transform(text.as_bytes());
        assert!(matches!(res, Err(TransformFileError::NotAffine { .. })));
    }

    #[test]
    fn test_load_transform_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "V trans")?;
        writeln!(file, "0.5 0 0 1")?;
        writeln!(file, "0 0.5 0 2")?;
        writeln!(file, "0 0 0.5 3")?;
        writeln!(file, "0 0 0 1")?;

        let matrix = load_transform(file.path())?;
        assert_eq!(matrix.rows()[2], [0.0, 0.0, 0.5, 3.0]);
        Ok(())
    }

    #[test]
    fn test_load_transform_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = load_transform(dir.path().join("missing.txt"));
        assert!(matches!(res, Err(TransformFileError::Io(_))));
    }

    #[test]
    fn test_display() {
        let text = format!("{}", TransformMatrix::IDENTITY);
        assert_eq!(text, "1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 0 1");
    }
}

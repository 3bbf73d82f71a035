use crate::matrix::TransformMatrix;

/// Apply an affine transform to a 3D point.
///
/// # Arguments
///
/// * `matrix` - The transform to apply. Its last row is not read.
/// * `point` - The point to transform.
///
/// # Returns
///
/// The transformed point `R * p + t`.
///
/// Example:
///
/// ```
/// use lastrans::matrix::TransformMatrix;
/// use lastrans::transform::transform_point;
///
/// let matrix = TransformMatrix::from_rotation_translation(
///     &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
///     &[10.0, 20.0, 30.0],
/// );
/// assert_eq!(transform_point(&matrix, &[0.0, 0.0, 0.0]), [10.0, 20.0, 30.0]);
/// ```
#[inline]
pub fn transform_point(matrix: &TransformMatrix, point: &[f64; 3]) -> [f64; 3] {
    let rows = matrix.rows();
    let mut out = [0.0; 3];
    for (dst, row) in out.iter_mut().zip(rows.iter()) {
        *dst = row[0] * point[0] + row[1] * point[1] + row[2] * point[2] + row[3];
    }
    out
}

/// Transform a set of points.
///
/// PRECONDITION: `dst_points` has the same length as `src_points`.
pub fn transform_points(
    matrix: &TransformMatrix,
    src_points: &[[f64; 3]],
    dst_points: &mut [[f64; 3]],
) {
    assert_eq!(src_points.len(), dst_points.len());
    for (dst, src) in dst_points.iter_mut().zip(src_points.iter()) {
        *dst = transform_point(matrix, src);
    }
}

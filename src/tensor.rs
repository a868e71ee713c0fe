//! Dense vector and matrix primitives.
//!
//! Vectors and matrices are plain `Vec`s of `f64`: weights are read-only
//! during inference, so there is no need for anything richer than row-major
//! nested vectors. All products accumulate in double precision with strict
//! left-to-right summation order so that results are reproducible across
//! backends for a fixed input.

use crate::errors::{EvaluationError, EvaluationResult};

/// Ordered sequence of 64-bit floats, fixed length once created.
pub type Vector = Vec<f64>;

/// Row-major matrix: `rows × cols`, every row the same length.
pub type Matrix = Vec<Vector>;

/// Number of rows of a matrix.
#[inline]
pub fn rows(a: &Matrix) -> usize {
    a.len()
}

/// Number of columns of a matrix (the length of its first row).
#[inline]
pub fn cols(a: &Matrix) -> usize {
    a.first().map_or(0, |row| row.len())
}

/// Validates that a matrix is non-empty and rectangular.
pub fn validate_matrix(a: &Matrix) -> EvaluationResult<()> {
    if a.is_empty() || a[0].is_empty() {
        return Err(EvaluationError::EmptyMatrix);
    }
    let expected = a[0].len();
    for (i, row) in a.iter().enumerate().skip(1) {
        if row.len() != expected {
            return Err(EvaluationError::RaggedMatrix {
                row: i,
                actual: row.len(),
                expected,
            });
        }
    }
    Ok(())
}

/// Matrix-vector product: `cols(a)` must equal `x.len()`.
///
/// Returns a vector of `rows(a)` elements, `result[i] = Σ_k a[i][k] * x[k]`.
pub fn multiply_matrix_vector(a: &Matrix, x: &Vector) -> EvaluationResult<Vector> {
    let a_cols = cols(a);
    if a.is_empty() || a_cols != x.len() {
        return Err(EvaluationError::MatrixVectorDimensionMismatch {
            cols: a_cols,
            len: x.len(),
        });
    }

    let mut result = vec![0.0f64; a.len()];
    for (i, row) in a.iter().enumerate() {
        let mut sum = 0.0f64;
        for (j, &weight) in row.iter().enumerate() {
            sum += weight * x[j];
        }
        result[i] = sum;
    }
    Ok(result)
}

/// Matrix-matrix product: `cols(a)` must equal `rows(b)`.
///
/// Returns a `rows(a) × cols(b)` matrix of standard dot-product sums.
pub fn multiply_matrix_matrix(a: &Matrix, b: &Matrix) -> EvaluationResult<Matrix> {
    let a_cols = cols(a);
    let b_rows = rows(b);
    if a.is_empty() || b.is_empty() || a_cols != b_rows {
        return Err(EvaluationError::MatrixMatrixDimensionMismatch {
            left_cols: a_cols,
            right_rows: b_rows,
        });
    }

    let b_cols = cols(b);
    let mut result = Vec::with_capacity(a.len());
    for a_row in a {
        let mut out_row = vec![0.0f64; b_cols];
        for (j, out) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0f64;
            for (k, &weight) in a_row.iter().enumerate() {
                sum += weight * b[k][j];
            }
            *out = sum;
        }
        result.push(out_row);
    }
    Ok(result)
}

/// Builds the `n × n` identity matrix.
pub fn identity(n: usize) -> Matrix {
    let mut m = vec![vec![0.0f64; n]; n];
    for (i, row) in m.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    m
}

/// Reinterprets a vector as a single-column matrix.
pub fn as_column(x: &Vector) -> Matrix {
    x.iter().map(|&v| vec![v]).collect()
}

/// Reads column 0 of a matrix back into a vector.
pub fn column_zero(a: &Matrix) -> Vector {
    a.iter().map(|row| row[0]).collect()
}

//! `IntervalAmbiguitySets`: a column container of interval ambiguity sets,
//! backed by either a dense `T x N` matrix pair or a CSC sparse matrix pair
//! (§4.2).

use crate::ambiguity::set::{IntervalAmbiguitySet, Support};
use crate::error::{Error, Result};
use crate::scalar::Scalar;

/// Which backing storage an [`IntervalAmbiguitySets`] collection uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbiguitySetStorage {
    /// Every column stores all `num_targets` rows.
    DenseCols,
    /// Every column stores only its nonzero rows, compressed-sparse-column.
    CscCols,
}

/// A plain dense or CSC matrix, as supplied by a model-ingest caller (§6).
/// `lower` and `upper` passed to [`IntervalAmbiguitySets::build`] must share
/// the same variant and the same sparsity pattern for the CSC case.
#[derive(Debug, Clone)]
pub enum Matrix<R> {
    /// Column-major dense `rows x cols` matrix.
    Dense {
        data: Vec<R>,
        rows: usize,
        cols: usize,
    },
    /// Compressed-sparse-column `rows x cols` matrix.
    Csc {
        colptr: Vec<usize>,
        rowval: Vec<usize>,
        data: Vec<R>,
        rows: usize,
        cols: usize,
    },
}

impl<R: Scalar> Matrix<R> {
    fn shape(&self) -> (usize, usize) {
        match self {
            Self::Dense { rows, cols, .. } => (*rows, *cols),
            Self::Csc { rows, cols, .. } => (*rows, *cols),
        }
    }
}

enum Storage<R> {
    Dense {
        lower: Vec<R>,
        gap: Vec<R>,
    },
    Csc {
        colptr: Vec<usize>,
        rowval: Vec<usize>,
        lower: Vec<R>,
        gap: Vec<R>,
    },
}

/// A collection of `N` columns, each an interval ambiguity set over the
/// same `T` targets.
pub struct IntervalAmbiguitySets<R: Scalar> {
    num_targets: usize,
    num_columns: usize,
    storage: Storage<R>,
}

fn validate_column<R: Scalar>(column: usize, lower: &[R], gap: &[R]) -> Result<()> {
    let mut sum_lower = R::zero();
    let mut sum_upper = R::zero();
    for (&l, &g) in lower.iter().zip(gap.iter()) {
        if l < R::zero() {
            return Err(Error::InvalidProbabilityBounds {
                column,
                reason: "lower bound is negative",
            });
        }
        if g < R::zero() {
            return Err(Error::InvalidProbabilityBounds {
                column,
                reason: "gap is negative",
            });
        }
        let upper = l + g;
        if upper > R::one() {
            return Err(Error::InvalidProbabilityBounds {
                column,
                reason: "lower + gap exceeds one",
            });
        }
        sum_lower = sum_lower + l;
        sum_upper = sum_upper + upper;
    }
    if sum_lower > R::one() {
        return Err(Error::InvalidProbabilityBounds {
            column,
            reason: "sum of lower bounds exceeds one",
        });
    }
    if sum_upper < R::one() {
        return Err(Error::InvalidProbabilityBounds {
            column,
            reason: "sum of upper bounds is below one",
        });
    }
    Ok(())
}

impl<R: Scalar> IntervalAmbiguitySets<R> {
    /// Builds a collection from `lower`/`upper` matrices (§6
    /// `build_interval_ambiguity_sets`). Both matrices must have equal
    /// shape, and for the CSC case, the same sparsity pattern. `gap` is
    /// computed as `upper - lower`, preserving the sparsity pattern of
    /// `upper`.
    pub fn build(lower: Matrix<R>, upper: Matrix<R>) -> Result<Self> {
        if lower.shape() != upper.shape() {
            let (lr, lc) = lower.shape();
            let (ur, uc) = upper.shape();
            return Err(Error::DimensionMismatch {
                expected: vec![lr, lc],
                found: vec![ur, uc],
                context: "IntervalAmbiguitySets::build lower/upper shape",
            });
        }
        match (lower, upper) {
            (
                Matrix::Dense {
                    data: l,
                    rows,
                    cols,
                },
                Matrix::Dense { data: u, .. },
            ) => Self::from_dense(&l, &u, rows, cols),
            (
                Matrix::Csc {
                    colptr: lcp,
                    rowval: lrv,
                    data: l,
                    rows,
                    cols,
                },
                Matrix::Csc {
                    colptr: ucp,
                    rowval: urv,
                    data: u,
                    ..
                },
            ) => {
                if lcp != ucp || lrv != urv {
                    return Err(Error::DimensionMismatch {
                        expected: lrv.clone(),
                        found: urv,
                        context: "IntervalAmbiguitySets::build lower/upper sparsity pattern",
                    });
                }
                Self::from_csc(&lcp, &lrv, &l, &u, rows, cols)
            }
            _ => Err(Error::DimensionMismatch {
                expected: vec![],
                found: vec![],
                context: "IntervalAmbiguitySets::build lower/upper storage kind mismatch",
            }),
        }
    }

    /// Builds a dense collection directly from column-major `lower`/`upper`
    /// slices of length `num_targets * num_columns`.
    pub fn from_dense(
        lower: &[R],
        upper: &[R],
        num_targets: usize,
        num_columns: usize,
    ) -> Result<Self> {
        let expected = num_targets * num_columns;
        if lower.len() != expected || upper.len() != expected {
            return Err(Error::DimensionMismatch {
                expected: vec![expected],
                found: vec![lower.len(), upper.len()],
                context: "IntervalAmbiguitySets::from_dense",
            });
        }
        let mut gap = Vec::with_capacity(expected);
        for (&l, &u) in lower.iter().zip(upper.iter()) {
            gap.push(u - l);
        }
        for j in 0..num_columns {
            let start = j * num_targets;
            let end = start + num_targets;
            validate_column(j, &lower[start..end], &gap[start..end])?;
        }
        Ok(Self {
            num_targets,
            num_columns,
            storage: Storage::Dense {
                lower: lower.to_vec(),
                gap,
            },
        })
    }

    /// Builds a CSC collection. `colptr` has length `num_columns + 1`;
    /// `rowval`/`lower`/`upper` each have length `colptr[num_columns]`, and
    /// `rowval` must be strictly increasing within each column.
    pub fn from_csc(
        colptr: &[usize],
        rowval: &[usize],
        lower: &[R],
        upper: &[R],
        num_targets: usize,
        num_columns: usize,
    ) -> Result<Self> {
        if colptr.len() != num_columns + 1 {
            return Err(Error::DimensionMismatch {
                expected: vec![num_columns + 1],
                found: vec![colptr.len()],
                context: "IntervalAmbiguitySets::from_csc colptr length",
            });
        }
        let nnz = *colptr.last().unwrap_or(&0);
        if rowval.len() != nnz || lower.len() != nnz || upper.len() != nnz {
            return Err(Error::DimensionMismatch {
                expected: vec![nnz],
                found: vec![rowval.len(), lower.len(), upper.len()],
                context: "IntervalAmbiguitySets::from_csc nnz length",
            });
        }
        let mut gap = Vec::with_capacity(nnz);
        for (&l, &u) in lower.iter().zip(upper.iter()) {
            gap.push(u - l);
        }
        for j in 0..num_columns {
            let start = colptr[j];
            let end = colptr[j + 1];
            if start > end || end > nnz {
                return Err(Error::DimensionMismatch {
                    expected: vec![],
                    found: vec![start, end],
                    context: "IntervalAmbiguitySets::from_csc colptr monotonicity",
                });
            }
            let rows = &rowval[start..end];
            for w in rows.windows(2) {
                if w[0] >= w[1] {
                    return Err(Error::InvalidProbabilityBounds {
                        column: j,
                        reason: "row indices are not strictly increasing",
                    });
                }
            }
            if let Some(&last) = rows.last() {
                if last >= num_targets {
                    return Err(Error::InvalidIndex {
                        index: last,
                        bound: num_targets,
                        context: "IntervalAmbiguitySets::from_csc row index",
                    });
                }
            }
            validate_column(j, &lower[start..end], &gap[start..end])?;
        }
        Ok(Self {
            num_targets,
            num_columns,
            storage: Storage::Csc {
                colptr: colptr.to_vec(),
                rowval: rowval.to_vec(),
                lower: lower.to_vec(),
                gap,
            },
        })
    }

    /// Number of targets `T` shared by every column.
    pub fn num_targets(&self) -> usize {
        self.num_targets
    }

    /// Number of columns `N`.
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    /// Which storage layout backs this collection.
    pub fn storage_kind(&self) -> AmbiguitySetStorage {
        match &self.storage {
            Storage::Dense { .. } => AmbiguitySetStorage::DenseCols,
            Storage::Csc { .. } => AmbiguitySetStorage::CscCols,
        }
    }

    /// An O(1) view into column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `j >= num_columns()`.
    pub fn get(&self, j: usize) -> IntervalAmbiguitySet<'_, R> {
        assert!(j < self.num_columns, "column index out of bounds");
        match &self.storage {
            Storage::Dense { lower, gap } => {
                let start = j * self.num_targets;
                let end = start + self.num_targets;
                IntervalAmbiguitySet {
                    lower: &lower[start..end],
                    gap: &gap[start..end],
                    support: Support::Dense(self.num_targets),
                    num_targets: self.num_targets,
                }
            }
            Storage::Csc {
                colptr,
                rowval,
                lower,
                gap,
            } => {
                let start = colptr[j];
                let end = colptr[j + 1];
                IntervalAmbiguitySet {
                    lower: &lower[start..end],
                    gap: &gap[start..end],
                    support: Support::Sparse(&rowval[start..end]),
                    num_targets: self.num_targets,
                }
            }
        }
    }

    /// Largest support size across all columns, used for workspace sizing:
    /// `num_targets` for dense, the maximum column nonzero count for CSC.
    pub fn max_support_size(&self) -> usize {
        match &self.storage {
            Storage::Dense { .. } => self.num_targets,
            Storage::Csc { colptr, .. } => colptr
                .windows(2)
                .map(|w| w[1] - w[0])
                .max()
                .unwrap_or(0),
        }
    }
}

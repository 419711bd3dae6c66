use serde::Serialize;

/// Square, row-major matrix indexed by node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix<T> {
    n: usize,
    data: Vec<T>,
}

/// Distances in whole meters.
pub type DistanceMatrix = Matrix<u32>;

/// Road over straight-line distance ratios.
pub type RatioMatrix = Matrix<f64>;

impl<T> Matrix<T> {
    /// Builds an `n`×`n` matrix from rows produced in order.
    ///
    /// # Panics
    ///
    /// If `rows` does not yield exactly `n` rows of length `n`.
    pub fn from_rows<I, R>(n: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = T>,
    {
        let mut data = Vec::with_capacity(n * n);
        let mut row_count = 0;
        for row in rows {
            let before = data.len();
            data.extend(row);
            assert_eq!(data.len() - before, n, "row {row_count} has wrong length");
            row_count += 1;
        }
        assert_eq!(row_count, n, "wrong number of rows");
        Self { n, data }
    }

    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let data = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .map(|(i, j)| f(i, j))
            .collect();
        Self { n, data }
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.n && j < self.n {
            self.data.get(i * self.n + j)
        } else {
            None
        }
    }

    /// Row `i`, or `None` when `i` is out of range.
    pub fn row(&self, i: usize) -> Option<&[T]> {
        (i < self.n).then(|| &self.data[i * self.n..(i + 1) * self.n])
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        let n = self.n;
        (0..n).map(move |i| &self.data[i * n..(i + 1) * n])
    }

    pub fn values(&self) -> &[T] {
        &self.data
    }
}

impl<T: Clone> Matrix<T> {
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }
}

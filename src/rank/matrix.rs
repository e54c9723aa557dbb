//! Dense transition matrix and power iteration
//!
//! Pure functions: every call returns fresh values and no buffer outlives
//! the rank computation that created it.

/// Square matrix stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n + col]
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.n + col] = value;
    }

    fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n..(row + 1) * self.n]
    }

    /// Sum of one column
    pub fn column_sum(&self, col: usize) -> f64 {
        (0..self.n).map(|row| self.get(row, col)).sum()
    }

    /// Computes `self · x`
    pub fn multiply(&self, x: &[f64]) -> Vec<f64> {
        (0..self.n)
            .map(|row| self.row(row).iter().zip(x).map(|(m, v)| m * v).sum())
            .collect()
    }
}

/// Builds the link matrix from `(source, dest)` index pairs
///
/// `M[d][j]` holds the probability of following a link from page `j` to
/// page `d`: column `j` lists page `j`'s outlinks divided by its
/// out-degree, and a page without outlinks spreads uniformly over all `n`
/// pages. Every column sums to 1.
///
/// Duplicate pairs are counted once.
pub fn link_matrix(n: usize, edges: &[(usize, usize)]) -> Matrix {
    let mut m = Matrix::zeros(n);
    for &(source, dest) in edges {
        m.set(dest, source, 1.0);
    }

    for col in 0..n {
        let out_degree = m.column_sum(col);
        if out_degree == 0.0 {
            for row in 0..n {
                m.set(row, col, 1.0 / n as f64);
            }
        } else {
            for row in 0..n {
                let value = m.get(row, col);
                if value != 0.0 {
                    m.set(row, col, value / out_degree);
                }
            }
        }
    }

    m
}

/// Mixes teleportation into a link matrix
///
/// `P = (1 − α)·M + α·(1/n)·J` where `J` is the all-ones matrix.
pub fn transition_matrix(links: &Matrix, damping: f64) -> Matrix {
    let n = links.size();
    let teleport = damping / n as f64;
    Matrix {
        n,
        data: links
            .data
            .iter()
            .map(|m| (1.0 - damping) * m + teleport)
            .collect(),
    }
}

/// Euclidean distance between two vectors
pub fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Result of a power iteration
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    pub vector: Vec<f64>,
    pub iterations: u32,
    pub converged: bool,
}

/// Iterates `xₖ₊₁ = P·xₖ` from the uniform vector
///
/// Stops when two successive vectors are closer than `tolerance` or after
/// `max_iterations` steps, whichever comes first. The last vector is kept
/// either way.
pub fn power_iterate(p: &Matrix, tolerance: f64, max_iterations: u32) -> Iteration {
    let n = p.size();
    let mut x = vec![1.0 / n as f64; n];

    for iteration in 1..=max_iterations {
        let next = p.multiply(&x);
        let delta = distance(&next, &x);
        x = next;

        if delta < tolerance {
            return Iteration {
                vector: x,
                iterations: iteration,
                converged: true,
            };
        }
    }

    Iteration {
        vector: x,
        iterations: max_iterations,
        converged: false,
    }
}

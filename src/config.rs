/// Loop generation tunables.
#[derive(Clone, Debug)]
pub struct Params {
    // Ring shape
    pub padding: usize,
    pub center_fill_p: f64,
    pub rim_fill_p: f64,

    // Search budgets
    pub max_attempts: usize,
    pub spiral_runs: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            padding: 2,
            center_fill_p: 1.0,
            rim_fill_p: 0.5,
            max_attempts: 1000,
            spiral_runs: 100,
        }
    }
}

impl Params {
    /// Smoothing passes for a `size`x`size` grid: one per three cells of side, rounded up.
    pub fn smooth_passes(size: usize) -> usize {
        size.div_ceil(3).max(1)
    }
}

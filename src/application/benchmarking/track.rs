/// Horse-race view of the running totals.
///
/// After `rows_done` rows the leader stands at `rows_done / rows * width`; every other
/// strategy is placed at `leader_pos * best_total / total`. Positions are relative to
/// the current leader, so a strategy that falls behind can move backwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceTrack {
    width: f64,
    rows: usize,
}

impl RaceTrack {
    pub fn new(width: f64, rows: usize) -> Self {
        Self { width, rows }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Leader position after `rows_done` completed rows.
    pub fn leader_position(&self, rows_done: usize) -> f64 {
        if self.rows == 0 {
            return 0.0;
        }
        rows_done as f64 * self.width / self.rows as f64
    }

    pub fn positions(&self, rows_done: usize, totals: &[f64]) -> Vec<f64> {
        let leader = self.leader_position(rows_done);
        let best = totals.iter().copied().fold(f64::MAX, f64::min);

        totals
            .iter()
            .map(|total| {
                if *total <= 0.0 || best <= 0.0 {
                    leader
                } else {
                    leader * best / total
                }
            })
            .collect()
    }
}

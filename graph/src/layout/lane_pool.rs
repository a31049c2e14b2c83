use super::LaneIdx;

/// Inclusive range a branch keeps its lane busy for.
///
/// Measured in half rows: row `r` is `2 * r`, and `2 * r + 1` is the gap
/// between row `r` and row `r + 1`. A branch merged at row `m` ends at
/// `2 * m + 1`, one forked at row `f` starts at `2 * f - 1`, so a lane can
/// be handed from the merged branch to the forked one at the same commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub top: usize,
    pub bottom: usize,
}

impl RowSpan {
    pub fn new(top: usize, bottom: usize) -> Self {
        Self {
            top: top.min(bottom),
            bottom: top.max(bottom),
        }
    }

    /// Span from commit row `newest` down to commit row `oldest`
    pub fn rows(newest: usize, oldest: usize) -> Self {
        Self::new(2 * newest, 2 * oldest)
    }

    pub fn overlaps(&self, other: &RowSpan) -> bool {
        self.top <= other.bottom && other.top <= self.bottom
    }
}

/// Lane occupancy for branch-first layout.
///
/// Each lane remembers the row spans it has been handed out for. A lane is
/// available to a branch when none of those spans overlaps the branch's own,
/// so a lane vacated by a merged branch is reused by any later branch that
/// lives entirely above the merge or below the fork.
#[derive(Debug, Clone, Default)]
pub struct LanePool {
    occupied: Vec<Vec<RowSpan>>,
}

impl LanePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a lane for a span without searching (the mainline's lane 0)
    pub fn reserve(&mut self, lane: LaneIdx, span: RowSpan) {
        self.ensure(lane);
        self.occupied[lane].push(span);
    }

    /// Smallest lane strictly right of `parent_lane` that is free for `span`
    pub fn allocate(&mut self, parent_lane: LaneIdx, span: RowSpan) -> LaneIdx {
        let mut lane = parent_lane + 1;
        while !self.is_free(lane, &span) {
            lane += 1;
        }
        self.reserve(lane, span);
        lane
    }

    pub fn is_free(&self, lane: LaneIdx, span: &RowSpan) -> bool {
        self.occupied
            .get(lane)
            .map_or(true, |spans| spans.iter().all(|taken| !taken.overlaps(span)))
    }

    /// Number of lanes ever handed out
    pub fn width(&self) -> usize {
        self.occupied.len()
    }

    fn ensure(&mut self, lane: LaneIdx) {
        if lane >= self.occupied.len() {
            self.occupied.resize_with(lane + 1, Vec::new);
        }
    }
}

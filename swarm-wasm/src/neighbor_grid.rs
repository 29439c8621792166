use crate::math::Vec2;

const MIN_BOUND: f32 = 1.0e-6;
const MIN_CELL_SIZE: f32 = 1.0e-6;
const INVALID_INDEX: usize = usize::MAX;

/// Uniform bucket grid over an axis-aligned region. Points outside the
/// region land in the nearest edge cell, which keeps radius queries exact:
/// clamping never moves two points further apart in cell space.
pub struct NeighborGrid {
    cell_size: f32,
    origin: Vec2,
    width: f32,
    height: f32,
    cols: usize,
    rows: usize,
    point_count: usize,
    head: Vec<usize>,
    next: Vec<usize>,
    cached: Vec<Vec2>,
}

impl NeighborGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(MIN_CELL_SIZE),
            origin: Vec2::ZERO,
            width: MIN_BOUND,
            height: MIN_BOUND,
            cols: 0,
            rows: 0,
            point_count: 0,
            head: Vec::new(),
            next: Vec::new(),
            cached: Vec::new(),
        }
    }

    pub fn rebuild(&mut self, points: &[Vec2], min: Vec2, max: Vec2) {
        let count = points.len();
        self.ensure_layout(count, min, max);
        self.head.fill(INVALID_INDEX);

        if count == 0 {
            return;
        }

        self.cached.copy_from_slice(points);

        for (i, &p) in points.iter().enumerate() {
            let cell = self.cell_index_for_position(p);
            self.next[i] = self.head[cell];
            self.head[cell] = i;
        }
    }

    pub fn for_each_neighbor<F>(&self, i: usize, radius: f32, mut callback: F)
    where
        F: FnMut(usize),
    {
        if i >= self.point_count {
            return;
        }

        let radius = radius.max(0.0);
        let radius_sq = radius * radius;
        let cell_radius = (radius / self.cell_size).ceil() as isize;

        let p = self.cached[i];
        let base_cell_x = self.cell_x(p.x);
        let base_cell_y = self.cell_y(p.y);

        let min_y = (base_cell_y - cell_radius).max(0);
        let max_y = (base_cell_y + cell_radius).min(self.rows as isize - 1);
        let min_x = (base_cell_x - cell_radius).max(0);
        let max_x = (base_cell_x + cell_radius).min(self.cols as isize - 1);

        for cell_y in min_y..=max_y {
            for cell_x in min_x..=max_x {
                self.scan_cell(
                    cell_x as usize,
                    cell_y as usize,
                    i,
                    p,
                    radius_sq,
                    &mut callback,
                );
            }
        }
    }

    fn ensure_layout(&mut self, count: usize, min: Vec2, max: Vec2) {
        self.origin = min;
        self.width = (max.x - min.x).max(MIN_BOUND);
        self.height = (max.y - min.y).max(MIN_BOUND);
        self.point_count = count;

        let cols = ((self.width / self.cell_size).ceil() as usize).max(1);
        let rows = ((self.height / self.cell_size).ceil() as usize).max(1);

        if cols != self.cols || rows != self.rows {
            self.cols = cols;
            self.rows = rows;
            self.head.resize(cols * rows, INVALID_INDEX);
        }

        if self.next.len() != count {
            self.next.resize(count, INVALID_INDEX);
            self.cached.resize(count, Vec2::ZERO);
        }
    }

    fn cell_index_for_position(&self, p: Vec2) -> usize {
        self.cell_y(p.y) as usize * self.cols + self.cell_x(p.x) as usize
    }

    fn cell_x(&self, x: f32) -> isize {
        (((x - self.origin.x) / self.cell_size).floor() as isize).clamp(0, self.cols as isize - 1)
    }

    fn cell_y(&self, y: f32) -> isize {
        (((y - self.origin.y) / self.cell_size).floor() as isize).clamp(0, self.rows as isize - 1)
    }

    fn scan_cell<F>(
        &self,
        cell_x: usize,
        cell_y: usize,
        i: usize,
        p: Vec2,
        radius_sq: f32,
        callback: &mut F,
    ) where
        F: FnMut(usize),
    {
        let mut candidate = self.head[cell_y * self.cols + cell_x];

        while candidate != INVALID_INDEX {
            if candidate != i && p.distance_sq(self.cached[candidate]) < radius_sq {
                callback(candidate);
            }
            candidate = self.next[candidate];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NeighborGrid;
    use crate::math::Vec2;

    fn sorted_neighbors(grid: &NeighborGrid, i: usize, radius: f32) -> Vec<usize> {
        let mut neighbors = Vec::new();
        grid.for_each_neighbor(i, radius, |j| neighbors.push(j));
        neighbors.sort_unstable();
        neighbors
    }

    fn points(coords: &[(f32, f32)]) -> Vec<Vec2> {
        coords.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    #[test]
    fn finds_neighbors_in_known_layout() {
        let pts = points(&[(1.0, 1.0), (1.5, 1.2), (8.0, 8.0), (2.7, 1.1)]);

        let mut grid = NeighborGrid::new(2.0);
        grid.rebuild(&pts, Vec2::ZERO, Vec2::new(10.0, 10.0));

        assert_eq!(sorted_neighbors(&grid, 0, 2.0), vec![1, 3]);
        assert_eq!(sorted_neighbors(&grid, 2, 2.0), Vec::<usize>::new());
    }

    #[test]
    fn checks_across_cell_boundaries() {
        let pts = points(&[(1.9, 1.0), (2.1, 1.0), (5.0, 5.0)]);

        let mut grid = NeighborGrid::new(2.0);
        grid.rebuild(&pts, Vec2::ZERO, Vec2::new(10.0, 10.0));

        assert_eq!(sorted_neighbors(&grid, 0, 0.25), vec![1]);
        assert_eq!(sorted_neighbors(&grid, 1, 0.25), vec![0]);
    }

    #[test]
    fn handles_negative_origin_and_out_of_bounds_points() {
        let pts = points(&[(-90.0, 50.0), (-60.0, 50.0), (130.0, 50.0), (95.0, 50.0)]);

        let mut grid = NeighborGrid::new(40.0);
        grid.rebuild(&pts, Vec2::new(-80.0, 0.0), Vec2::new(100.0, 100.0));

        assert_eq!(sorted_neighbors(&grid, 0, 40.0), vec![1]);
        assert_eq!(sorted_neighbors(&grid, 2, 40.0), vec![3]);
    }

    #[test]
    fn matches_brute_force_on_scattered_points() {
        let pts: Vec<Vec2> = (0..120)
            .map(|i| {
                let t = i as f32;
                Vec2::new((t * 37.3) % 410.0 - 60.0, (t * 91.7) % 300.0)
            })
            .collect();

        let mut grid = NeighborGrid::new(50.0);
        grid.rebuild(&pts, Vec2::new(-80.0, 0.0), Vec2::new(400.0, 300.0));

        for i in 0..pts.len() {
            let mut expected: Vec<usize> = (0..pts.len())
                .filter(|&j| j != i && pts[i].distance_sq(pts[j]) < 50.0 * 50.0)
                .collect();
            expected.sort_unstable();
            assert_eq!(sorted_neighbors(&grid, i, 50.0), expected, "point {i}");
        }
    }
}

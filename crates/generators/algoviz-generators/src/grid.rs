//! Pathfinding on a 4-connected grid, plus a seeded maze generator.
//!
//! All moves cost 1. Neighbours are expanded in a fixed order (up, right,
//! down, left) so runs are reproducible.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;

use algoviz_player_core::{FrameRecorder, FrameSequence};
use hashbrown::{HashMap, HashSet};
use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::GenerateError;
use crate::limits::GeneratorLimits;
use crate::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Open,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    /// Row-major.
    pub cells: Vec<Cell>,
}

impl Grid {
    pub fn open(width: usize, height: usize) -> Result<Self> {
        check_dims(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Open; width * height],
        })
    }

    /// Parse rows of text: `#` is a wall, anything else is open.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(GenerateError::empty("grid"));
        };
        let width = first.as_ref().chars().count();
        check_dims(width, rows.len())?;
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.chars().count() != width {
                return Err(GenerateError::malformed(format!(
                    "row {y} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            cells.extend(row.chars().map(|c| if c == '#' { Cell::Wall } else { Cell::Open }));
        }
        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    #[inline]
    fn idx(&self, p: Pos) -> usize {
        p.y * self.width + p.x
    }

    pub fn contains(&self, p: Pos) -> bool {
        p.x < self.width && p.y < self.height
    }

    pub fn cell(&self, p: Pos) -> Option<Cell> {
        self.contains(p).then(|| self.cells[self.idx(p)])
    }

    pub fn is_open(&self, p: Pos) -> bool {
        self.cell(p) == Some(Cell::Open)
    }

    pub fn set(&mut self, p: Pos, cell: Cell) {
        if self.contains(p) {
            let i = self.idx(p);
            self.cells[i] = cell;
        }
    }

    /// Open neighbours in up, right, down, left order.
    pub fn neighbours(&self, p: Pos) -> impl Iterator<Item = Pos> + '_ {
        const STEPS: [(isize, isize); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];
        STEPS.into_iter().filter_map(move |(dx, dy)| {
            let x = p.x.checked_add_signed(dx)?;
            let y = p.y.checked_add_signed(dy)?;
            let n = Pos::new(x, y);
            self.is_open(n).then_some(n)
        })
    }

    /// Rows of text in the `from_rows` format.
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1))
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Cell::Open => '.',
                        Cell::Wall => '#',
                    })
                    .collect()
            })
            .collect()
    }

    fn validate(&self, start: Pos, end: Pos) -> Result<()> {
        check_dims(self.width, self.height)?;
        if self.cells.len() != self.width * self.height {
            return Err(GenerateError::malformed(format!(
                "{} cells for a {}x{} grid",
                self.cells.len(),
                self.width,
                self.height
            )));
        }
        for (what, p) in [("start", start), ("end", end)] {
            if p.x >= self.width {
                return Err(GenerateError::out_of_range(
                    format!("{what} x"),
                    p.x as i64,
                    0,
                    self.width as i64 - 1,
                ));
            }
            if p.y >= self.height {
                return Err(GenerateError::out_of_range(
                    format!("{what} y"),
                    p.y as i64,
                    0,
                    self.height as i64 - 1,
                ));
            }
            if !self.is_open(p) {
                return Err(GenerateError::malformed(format!("{what} {p} is a wall")));
            }
        }
        Ok(())
    }
}

fn check_dims(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(GenerateError::empty("grid"));
    }
    let max = GeneratorLimits::default().max_grid_cells;
    let cells = width.saturating_mul(height);
    if cells > max {
        return Err(GenerateError::too_large("grid", cells, max));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellState {
    Open,
    Wall,
    Start,
    End,
    Frontier,
    Visited,
    Current,
    Path,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellState>,
    pub current: Option<Pos>,
    /// Start to end inclusive, filled once a path is found.
    pub path: Vec<Pos>,
    /// Cells expanded so far.
    pub visited: usize,
}

impl GridSnapshot {
    pub fn state(&self, p: Pos) -> Option<CellState> {
        (p.x < self.width && p.y < self.height).then(|| self.cells[p.y * self.width + p.x])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathAlgorithm {
    Bfs,
    Dijkstra,
    AStar,
}

impl PathAlgorithm {
    pub const ALL: [PathAlgorithm; 3] = [Self::Bfs, Self::Dijkstra, Self::AStar];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dijkstra => "dijkstra",
            Self::AStar => "a*",
        }
    }
}

pub fn find_path(
    grid: &Grid,
    algorithm: PathAlgorithm,
    start: Pos,
    end: Pos,
) -> Result<FrameSequence<GridSnapshot>> {
    match algorithm {
        PathAlgorithm::Bfs => grid_bfs(grid, start, end),
        PathAlgorithm::Dijkstra => grid_dijkstra(grid, start, end),
        PathAlgorithm::AStar => grid_astar(grid, start, end),
    }
}

struct GridTrace<'g> {
    grid: &'g Grid,
    start: Pos,
    end: Pos,
    s: GridSnapshot,
    rec: FrameRecorder<GridSnapshot>,
}

impl<'g> GridTrace<'g> {
    fn new(grid: &'g Grid, start: Pos, end: Pos) -> Self {
        let mut cells: Vec<CellState> = grid
            .cells
            .iter()
            .map(|c| match c {
                Cell::Open => CellState::Open,
                Cell::Wall => CellState::Wall,
            })
            .collect();
        cells[grid.idx(start)] = CellState::Start;
        cells[grid.idx(end)] = CellState::End;
        Self {
            grid,
            start,
            end,
            s: GridSnapshot {
                width: grid.width,
                height: grid.height,
                cells,
                current: None,
                path: Vec::new(),
                visited: 0,
            },
            rec: FrameRecorder::new(),
        }
    }

    /// Paint `p` unless it is the start or end cell.
    fn paint(&mut self, p: Pos, state: CellState) {
        if p != self.start && p != self.end {
            let i = self.grid.idx(p);
            self.s.cells[i] = state;
        }
    }

    fn record(&mut self, desc: impl Into<String>) {
        self.rec.record(&self.s, desc);
    }

    fn expand(&mut self, p: Pos) {
        if let Some(prev) = self.s.current.replace(p) {
            self.paint(prev, CellState::Visited);
        }
        self.paint(p, CellState::Current);
        self.s.visited += 1;
    }

    fn found(mut self, came_from: &HashMap<Pos, Pos>) -> FrameSequence<GridSnapshot> {
        if let Some(prev) = self.s.current.take() {
            self.paint(prev, CellState::Visited);
        }
        let mut path = vec![self.end];
        let mut at = self.end;
        while let Some(&p) = came_from.get(&at) {
            path.push(p);
            at = p;
        }
        path.reverse();
        for &p in &path {
            self.paint(p, CellState::Path);
        }
        let steps = path.len() - 1;
        self.s.path = path;
        debug!(
            "path {} -> {}: {steps} steps, {} cells expanded",
            self.start, self.end, self.s.visited
        );
        self.record(format!(
            "Path found: {steps} steps after expanding {} cells",
            self.s.visited
        ));
        self.rec.finish()
    }

    fn no_path(mut self) -> FrameSequence<GridSnapshot> {
        if let Some(prev) = self.s.current.take() {
            self.paint(prev, CellState::Visited);
        }
        self.record(format!(
            "No path from {} to {}: {} cells explored",
            self.start, self.end, self.s.visited
        ));
        self.rec.finish()
    }
}

/// Breadth-first search; finds a shortest path since every move costs 1.
pub fn grid_bfs(grid: &Grid, start: Pos, end: Pos) -> Result<FrameSequence<GridSnapshot>> {
    grid.validate(start, end)?;
    let mut t = GridTrace::new(grid, start, end);
    t.record(format!("BFS from {start} to {end}"));

    let mut came_from: HashMap<Pos, Pos> = HashMap::new();
    let mut seen: HashSet<Pos> = HashSet::new();
    seen.insert(start);
    let mut queue = VecDeque::from([start]);
    while let Some(p) = queue.pop_front() {
        t.expand(p);
        if p == end {
            return Ok(t.found(&came_from));
        }
        let mut added = 0;
        for n in grid.neighbours(p) {
            if seen.insert(n) {
                came_from.insert(n, p);
                queue.push_back(n);
                t.paint(n, CellState::Frontier);
                added += 1;
            }
        }
        t.record(format!("Visit {p}: {added} new cells queued"));
    }
    Ok(t.no_path())
}

/// Dijkstra with unit edge costs.
pub fn grid_dijkstra(grid: &Grid, start: Pos, end: Pos) -> Result<FrameSequence<GridSnapshot>> {
    best_first(grid, start, end, false)
}

/// A* with the Manhattan distance heuristic.
pub fn grid_astar(grid: &Grid, start: Pos, end: Pos) -> Result<FrameSequence<GridSnapshot>> {
    best_first(grid, start, end, true)
}

fn best_first(
    grid: &Grid,
    start: Pos,
    end: Pos,
    heuristic: bool,
) -> Result<FrameSequence<GridSnapshot>> {
    grid.validate(start, end)?;
    let h = |p: Pos| if heuristic { p.manhattan(end) } else { 0 };
    let mut t = GridTrace::new(grid, start, end);
    t.record(if heuristic {
        format!("A* from {start} to {end}, guided by Manhattan distance")
    } else {
        format!("Dijkstra from {start} to {end}")
    });

    let mut came_from: HashMap<Pos, Pos> = HashMap::new();
    let mut g_score: HashMap<Pos, usize> = HashMap::new();
    let mut closed: HashSet<Pos> = HashSet::new();
    // (f, h, insertion order, pos): ties go to the cell nearer the goal,
    // then to the one queued first.
    let mut open = BinaryHeap::new();
    let mut seq = 0usize;
    g_score.insert(start, 0);
    open.push(Reverse((h(start), h(start), seq, start)));

    while let Some(Reverse((_, _, _, p))) = open.pop() {
        if !closed.insert(p) {
            continue;
        }
        t.expand(p);
        if p == end {
            return Ok(t.found(&came_from));
        }
        let g = g_score.get(&p).copied().unwrap_or(0);
        let mut improved = 0;
        for n in grid.neighbours(p) {
            if closed.contains(&n) {
                continue;
            }
            let tentative = g + 1;
            if g_score.get(&n).map_or(true, |&old| tentative < old) {
                g_score.insert(n, tentative);
                came_from.insert(n, p);
                seq += 1;
                open.push(Reverse((tentative + h(n), h(n), seq, n)));
                t.paint(n, CellState::Frontier);
                improved += 1;
            }
        }
        t.record(if heuristic {
            format!("Expand {p} (g = {g}, h = {}): {improved} neighbours updated", h(p))
        } else {
            format!("Settle {p} at distance {g}: {improved} neighbours updated")
        });
    }
    Ok(t.no_path())
}

/// Perfect maze carved by a seeded randomized depth-first search.
///
/// Rooms sit on odd coordinates; everything else starts as wall. The result
/// is a spanning tree over the rooms, so any two rooms have exactly one path.
pub fn generate_maze(width: usize, height: usize, seed: u64) -> Result<Grid> {
    let max_side = GeneratorLimits::default().max_grid_cells / 3;
    for (what, v) in [("maze width", width), ("maze height", height)] {
        if !(3..=max_side).contains(&v) {
            return Err(GenerateError::out_of_range(what, v as i64, 3, max_side as i64));
        }
    }
    check_dims(width, height)?;

    let mut grid = Grid {
        width,
        height,
        cells: vec![Cell::Wall; width * height],
    };
    let mut rng = StdRng::seed_from_u64(seed);
    let room = |x: usize, y: usize| x % 2 == 1 && y % 2 == 1 && x < width - 1 && y < height - 1;

    let first = Pos::new(1, 1);
    grid.set(first, Cell::Open);
    let mut stack = vec![first];
    while let Some(&p) = stack.last() {
        let mut options: Vec<Pos> = [(0isize, -2isize), (2, 0), (0, 2), (-2, 0)]
            .iter()
            .filter_map(|&(dx, dy)| {
                let x = p.x.checked_add_signed(dx)?;
                let y = p.y.checked_add_signed(dy)?;
                (room(x, y) && grid.cell(Pos::new(x, y)) == Some(Cell::Wall))
                    .then_some(Pos::new(x, y))
            })
            .collect();
        options.shuffle(&mut rng);
        match options.first() {
            Some(&next) => {
                grid.set(Pos::new((p.x + next.x) / 2, (p.y + next.y) / 2), Cell::Open);
                grid.set(next, Cell::Open);
                stack.push(next);
            }
            None => {
                stack.pop();
            }
        }
    }
    Ok(grid)
}

//! Tile-matching puzzle: swap neighbours to line up three or more gems
//!
//! Matches clear at once; dropping, refilling and cascade re-checks are paced
//! by short frame delays so each stage is visible. Input is only accepted
//! while the board is settled.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::session::{GameEvent, SessionState};
use super::{Action, Flow, InputModel, Kernel};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::params::ParameterSet;
use crate::renderer::{Surface, palette};
use crate::templates::TemplateId;

/// Gem colors in palette order; `numColors` takes a prefix
pub const GEM_COLORS: [&str; 6] = ["#EF4444", "#3B82F6", "#22C55E", "#FBBF24", "#A855F7", "#F97316"];
pub const POINTS_PER_GEM: u64 = 10;
/// Frames between cascade stages (about 200 ms)
pub const STAGE_DELAY: u32 = 12;
const GEM_INSET: f32 = 4.0;
const SELECTION_WIDTH: f32 = 3.0;
const MIN_RUN: usize = 3;

/// Grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance of exactly one
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

/// Square grid of colored cells; `None` is a cleared, not yet refilled cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub size: usize,
    pub colors: u8,
    cells: Vec<Option<u8>>,
}

impl Board {
    /// Fresh board with no initial runs.
    ///
    /// Each cell excludes the color that would complete a run with the two
    /// cells to its left or above, so with at least three colors the fill
    /// never needs to be regenerated.
    pub fn generate(size: usize, colors: u8, rng: &mut Pcg32) -> Self {
        let mut board = Self {
            size,
            colors,
            cells: vec![None; size * size],
        };
        for row in 0..size {
            for col in 0..size {
                let left = (col >= 2)
                    .then(|| board.run_color(Cell::new(row, col - 1), Cell::new(row, col - 2)))
                    .flatten();
                let up = (row >= 2)
                    .then(|| board.run_color(Cell::new(row - 1, col), Cell::new(row - 2, col)))
                    .flatten();
                let allowed: Vec<u8> = (0..colors).filter(|c| Some(*c) != left && Some(*c) != up).collect();
                let color = if allowed.is_empty() {
                    rng.random_range(0..colors)
                } else {
                    allowed[rng.random_range(0..allowed.len())]
                };
                board.set(Cell::new(row, col), Some(color));
            }
        }
        board
    }

    fn run_color(&self, a: Cell, b: Cell) -> Option<u8> {
        match (self.get(a), self.get(b)) {
            (Some(x), Some(y)) if x == y => Some(x),
            _ => None,
        }
    }

    #[inline]
    fn index(&self, cell: Cell) -> usize {
        cell.row * self.size + cell.col
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.size && cell.col < self.size
    }

    pub fn get(&self, cell: Cell) -> Option<u8> {
        if !self.contains(cell) {
            return None;
        }
        self.cells[self.index(cell)]
    }

    fn set(&mut self, cell: Cell, color: Option<u8>) {
        let i = self.index(cell);
        self.cells[i] = color;
    }

    pub fn swap(&mut self, a: Cell, b: Cell) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
    }

    /// Every cell that is part of a horizontal or vertical run of three or
    /// more, in row-major order without duplicates
    pub fn find_matches(&self) -> Vec<Cell> {
        let n = self.size;
        let mut hit = vec![false; n * n];
        let lines = (0..n).flat_map(|r| {
            [
                (0..n).map(move |c| Cell::new(r, c)).collect::<Vec<_>>(),
                (0..n).map(move |c| Cell::new(c, r)).collect::<Vec<_>>(),
            ]
        });
        for line in lines {
            let mut start = 0;
            while start < line.len() {
                let color = self.get(line[start]);
                let mut end = start + 1;
                while end < line.len() && color.is_some() && self.get(line[end]) == color {
                    end += 1;
                }
                if color.is_some() && end - start >= MIN_RUN {
                    for cell in &line[start..end] {
                        hit[self.index(*cell)] = true;
                    }
                }
                start = end;
            }
        }
        hit.iter()
            .enumerate()
            .filter(|(_, h)| **h)
            .map(|(i, _)| Cell::new(i / n, i % n))
            .collect()
    }

    pub fn clear(&mut self, cells: &[Cell]) {
        for cell in cells {
            self.set(*cell, None);
        }
    }

    /// Let gems fall into empty cells below them, column by column
    pub fn drop_down(&mut self) {
        for col in 0..self.size {
            let mut write = self.size;
            for row in (0..self.size).rev() {
                let cell = Cell::new(row, col);
                if let Some(color) = self.get(cell) {
                    write -= 1;
                    if write != row {
                        self.set(Cell::new(write, col), Some(color));
                        self.set(cell, None);
                    }
                }
            }
        }
    }

    /// Fill every empty cell with a random color
    pub fn refill(&mut self, rng: &mut Pcg32) {
        for i in 0..self.cells.len() {
            if self.cells[i].is_none() {
                self.cells[i] = Some(rng.random_range(0..self.colors));
            }
        }
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    #[cfg(test)]
    pub(crate) fn from_rows(colors: u8, rows: &[&[u8]]) -> Self {
        Self {
            size: rows.len(),
            colors,
            cells: rows.iter().flat_map(|r| r.iter().map(|c| Some(*c))).collect(),
        }
    }
}

/// Board interaction stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Settled; accepts clicks
    Ready,
    /// Matches just cleared; gems fall when the wait runs out
    Dropping { wait: u32 },
    /// Dropped and refilled; re-check for cascades when the wait runs out
    Settling { wait: u32 },
    /// Swap made no run; swap back when the wait runs out
    Reverting { wait: u32, a: Cell, b: Cell },
}

#[derive(Debug, Clone)]
pub struct Match3 {
    pub board: Board,
    pub selected: Option<Cell>,
    pub stage: Stage,
    /// Cell edge length in pixels
    pub cell_size: f32,
    /// Top-left corner of the grid on the canvas
    pub origin: Vec2,
}

impl Match3 {
    pub fn cell_rect(&self, cell: Cell) -> Rect {
        let size = self.cell_size - GEM_INSET;
        Rect::new(
            self.origin.x + cell.col as f32 * self.cell_size,
            self.origin.y + cell.row as f32 * self.cell_size,
            size,
            size,
        )
    }

    /// Grid cell under a canvas point
    pub fn cell_at(&self, point: Vec2) -> Option<Cell> {
        let local = (point - self.origin) / self.cell_size;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let cell = Cell::new(local.y.floor() as usize, local.x.floor() as usize);
        self.board.contains(cell).then_some(cell)
    }

    /// Clear current runs and score them; false if there were none
    fn clear_matches(&mut self, state: &mut SessionState) -> bool {
        let matches = self.board.find_matches();
        if matches.is_empty() {
            return false;
        }
        self.board.clear(&matches);
        let cleared = matches.len() as u32;
        state.add_score(u64::from(cleared) * POINTS_PER_GEM);
        state.emit(GameEvent::Matched { cleared });
        self.stage = Stage::Dropping { wait: STAGE_DELAY };
        true
    }

    fn select(&mut self, state: &mut SessionState, cell: Cell) {
        let Some(first) = self.selected else {
            self.selected = Some(cell);
            return;
        };
        if !first.is_adjacent(&cell) {
            self.selected = Some(cell);
            return;
        }
        self.selected = None;
        self.board.swap(first, cell);
        if !self.clear_matches(state) {
            self.stage = Stage::Reverting {
                wait: STAGE_DELAY,
                a: first,
                b: cell,
            };
        }
    }
}

impl Kernel for Match3 {
    fn init(params: &ParameterSet, rng: &mut Pcg32) -> Self {
        let t = TemplateId::Match3.template();
        let size = params.integer(t, "gridSize", 3, 12) as usize;
        let colors = params.integer(t, "numColors", 3, 6) as u8;
        let cell_size = CANVAS_WIDTH.min(CANVAS_HEIGHT) / (size as f32 + 2.0);
        let origin = Vec2::new((CANVAS_WIDTH - cell_size * size as f32) / 2.0, cell_size);
        Self {
            board: Board::generate(size, colors, rng),
            selected: None,
            stage: Stage::Ready,
            cell_size,
            origin,
        }
    }

    fn input_model(&self) -> InputModel {
        InputModel::Point
    }

    fn step(&mut self, state: &mut SessionState) -> Flow {
        self.stage = match self.stage {
            Stage::Ready => Stage::Ready,
            Stage::Dropping { wait } if wait > 1 => Stage::Dropping { wait: wait - 1 },
            Stage::Dropping { .. } => {
                self.board.drop_down();
                self.board.refill(&mut state.rng);
                Stage::Settling { wait: STAGE_DELAY }
            }
            Stage::Settling { wait } if wait > 1 => Stage::Settling { wait: wait - 1 },
            Stage::Settling { .. } => {
                self.stage = Stage::Ready;
                self.clear_matches(state);
                self.stage
            }
            Stage::Reverting { wait, a, b } if wait > 1 => Stage::Reverting { wait: wait - 1, a, b },
            Stage::Reverting { a, b, .. } => {
                self.board.swap(a, b);
                Stage::Ready
            }
        };
        // No terminal condition: the board plays on indefinitely
        Flow::Continue
    }

    fn handle_action(&mut self, state: &mut SessionState, action: Action) {
        if self.stage != Stage::Ready {
            return;
        }
        let Action::PointAt(point) = action else {
            return;
        };
        if let Some(cell) = self.cell_at(point) {
            self.select(state, cell);
        }
    }

    fn draw(&self, _state: &SessionState, surface: &mut dyn Surface) {
        for row in 0..self.board.size {
            for col in 0..self.board.size {
                let cell = Cell::new(row, col);
                let Some(color) = self.board.get(cell) else {
                    continue;
                };
                let rect = self.cell_rect(cell);
                surface.fill_rect(rect, GEM_COLORS[usize::from(color) % GEM_COLORS.len()]);
                if self.selected == Some(cell) {
                    surface.stroke_rect(rect, palette::TEXT, SELECTION_WIDTH);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recorder::{DrawCmd, Recorder};
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn kernel(params: ParameterSet) -> (Match3, SessionState) {
        let mut state = SessionState::new(21);
        let k = Match3::init(&params, &mut state.rng);
        state.start();
        (k, state)
    }

    fn defaults() -> ParameterSet {
        ParameterSet::defaults(TemplateId::Match3.template())
    }

    fn click(k: &mut Match3, state: &mut SessionState, cell: Cell) {
        let center = k.cell_rect(cell).center();
        k.handle_action(state, Action::PointAt(center));
    }

    /// No runs, and swapping (0,0) with (0,1) makes none
    fn scripted() -> Board {
        Board::from_rows(
            4,
            &[
                &[0, 1, 2, 0],
                &[2, 3, 0, 1],
                &[1, 2, 3, 2],
                &[3, 0, 1, 3],
            ],
        )
    }

    #[test]
    fn test_generate_has_no_runs() {
        let mut rng = Pcg32::seed_from_u64(3);
        for size in 3..=12 {
            for colors in 3..=6 {
                let board = Board::generate(size, colors, &mut rng);
                assert!(board.find_matches().is_empty(), "{size}x{size} / {colors}");
                assert!(board.is_full());
            }
        }
    }

    #[test]
    fn test_find_matches_rows_and_columns() {
        let board = Board::from_rows(
            4,
            &[
                &[1, 1, 1, 1],
                &[0, 2, 3, 1],
                &[0, 3, 2, 1],
                &[0, 2, 3, 0],
            ],
        );
        let matches = board.find_matches();
        assert_eq!(matches.len(), 9);
        assert!(matches.contains(&Cell::new(0, 3)));
        assert!(matches.contains(&Cell::new(2, 3)));
        assert!(matches.contains(&Cell::new(3, 0)));
        assert!(!matches.contains(&Cell::new(3, 3)));
    }

    #[test]
    fn test_drop_down_compacts_columns() {
        let mut board = Board::from_rows(3, &[&[0, 1, 2], &[1, 2, 0], &[2, 0, 1]]);
        board.clear(&[Cell::new(2, 0), Cell::new(1, 1)]);
        board.drop_down();
        assert_eq!(board.get(Cell::new(0, 0)), None);
        assert_eq!(board.get(Cell::new(1, 0)), Some(0));
        assert_eq!(board.get(Cell::new(2, 0)), Some(1));
        assert_eq!(board.get(Cell::new(0, 1)), None);
        assert_eq!(board.get(Cell::new(1, 1)), Some(1));
        assert_eq!(board.get(Cell::new(2, 1)), Some(0));
        let mut rng = Pcg32::seed_from_u64(0);
        board.refill(&mut rng);
        assert!(board.is_full());
    }

    #[test]
    fn test_non_adjacent_click_moves_selection() {
        let (mut k, mut state) = kernel(defaults());
        click(&mut k, &mut state, Cell::new(0, 0));
        assert_eq!(k.selected, Some(Cell::new(0, 0)));
        click(&mut k, &mut state, Cell::new(3, 3));
        assert_eq!(k.selected, Some(Cell::new(3, 3)));
        assert_eq!(k.stage, Stage::Ready);
    }

    #[test]
    fn test_unmatched_swap_reverts_after_delay() {
        let (mut k, mut state) = kernel(defaults().with("gridSize", 4.0));
        k.board = scripted();
        let before = k.board.clone();
        click(&mut k, &mut state, Cell::new(0, 0));
        click(&mut k, &mut state, Cell::new(0, 1));
        assert_eq!(k.board.get(Cell::new(0, 0)), Some(1));
        assert!(matches!(k.stage, Stage::Reverting { .. }));

        // Locked while reverting
        click(&mut k, &mut state, Cell::new(2, 2));
        assert_eq!(k.selected, None);

        for _ in 0..STAGE_DELAY {
            k.step(&mut state);
        }
        assert_eq!(k.stage, Stage::Ready);
        assert_eq!(k.board, before);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_matched_swap_scores_and_cascades_to_rest() {
        let (mut k, mut state) = kernel(defaults().with("gridSize", 4.0));
        // Swapping (0,2) down brings a third 0 into row 0
        k.board = Board::from_rows(
            4,
            &[
                &[0, 0, 1, 2],
                &[2, 3, 0, 1],
                &[1, 2, 3, 2],
                &[3, 1, 2, 3],
            ],
        );
        click(&mut k, &mut state, Cell::new(0, 2));
        click(&mut k, &mut state, Cell::new(1, 2));
        assert_eq!(state.score(), 3 * POINTS_PER_GEM);
        assert!(state.drain_events().contains(&GameEvent::Matched { cleared: 3 }));
        assert!(matches!(k.stage, Stage::Dropping { .. }));

        for _ in 0..500 {
            k.step(&mut state);
            if k.stage == Stage::Ready {
                break;
            }
        }
        assert_eq!(k.stage, Stage::Ready);
        assert!(k.board.is_full());
        assert!(k.board.find_matches().is_empty());
        assert!(state.score() >= 30);
    }

    #[test]
    fn test_layout_fits_canvas() {
        for size in [3.0, 8.0, 12.0] {
            let (k, _) = kernel(defaults().with("gridSize", size));
            let last = k.cell_rect(Cell::new(k.board.size - 1, k.board.size - 1));
            assert!(k.origin.x >= 0.0);
            assert!(last.right() <= CANVAS_WIDTH);
            assert!(last.bottom() <= CANVAS_HEIGHT);
        }
    }

    #[test]
    fn test_draw_marks_selection() {
        let (mut k, mut state) = kernel(defaults());
        click(&mut k, &mut state, Cell::new(1, 1));
        let mut rec = Recorder::new();
        k.draw(&state, &mut rec);
        let strokes = rec
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::StrokeRect { .. }))
            .count();
        assert_eq!(strokes, 1);
        let gems = rec
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { .. }))
            .count();
        assert_eq!(gems, 64);
    }

    proptest! {
        #[test]
        fn prop_double_swap_restores_unmatched_board(
            seed in any::<u64>(),
            size in 3usize..=12,
            colors in 3u8..=6,
            row in 0usize..12,
            col in 0usize..12,
            horizontal in any::<bool>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut board = Board::generate(size, colors, &mut rng);
            let a = Cell::new(row % size, col % size);
            let b = if horizontal {
                Cell::new(a.row, if a.col + 1 < size { a.col + 1 } else { a.col - 1 })
            } else {
                Cell::new(if a.row + 1 < size { a.row + 1 } else { a.row - 1 }, a.col)
            };
            prop_assert!(a.is_adjacent(&b));
            let before = board.clone();
            board.swap(a, b);
            prop_assume!(board.find_matches().is_empty());
            board.swap(a, b);
            prop_assert_eq!(board, before);
        }
    }
}

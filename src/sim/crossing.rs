//! Lane-crossing game: hop across traffic and rivers to the far bank
//!
//! Rows from the top: one safe bank, `lanes` hazard lanes, one safe bank
//! where the player starts. Lane items wrap around the canvas edges, so every
//! lane keeps a steady population for the whole session.

use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::Rect;
use super::session::{GameEvent, SessionState};
use super::{Action, Direction, Flow, InputModel, Kernel};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::params::ParameterSet;
use crate::renderer::{Sprite, Surface, draw_sprite_or, palette};
use crate::templates::TemplateId;

pub const MAX_PLAYER_SIZE: f32 = 30.0;
pub const MIN_ITEM_WIDTH: f32 = 40.0;
pub const MAX_ITEM_WIDTH: f32 = 80.0;
/// Items live in `[-MAX_ITEM_WIDTH, CANVAS_WIDTH)` and wrap over this span
const WRAP_SPAN: f32 = CANVAS_WIDTH + MAX_ITEM_WIDTH;
const MIN_ITEM_GAP: f32 = 60.0;
const MAX_ITEM_GAP: f32 = 200.0;

const SAFE_COLOR: &str = "#4CAF50";
const ROAD_COLOR: &str = "#555";
const RIVER_COLOR: &str = "#1E90FF";
const CAR_COLOR: &str = "yellow";
const LOG_COLOR: &str = "#8B4513";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingParams {
    pub traffic_speed: f32,
    pub log_speed: f32,
    pub lanes: usize,
}

impl CrossingParams {
    pub fn from_set(set: &ParameterSet) -> Self {
        let t = TemplateId::CrossyRoad.template();
        Self {
            traffic_speed: set.number(t, "trafficSpeed", 2.0) as f32,
            log_speed: set.number(t, "logSpeed", 1.5) as f32,
            lanes: set.integer(t, "lanes", 1, 20) as usize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneKind {
    /// Cars; touching one is fatal
    Traffic,
    /// Logs; standing anywhere else is fatal
    River,
}

/// A car or a log
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub x: f32,
    pub width: f32,
}

impl Item {
    fn advance(&mut self, speed: f32) {
        self.x += speed;
        if !(-MAX_ITEM_WIDTH..CANVAS_WIDTH).contains(&self.x) {
            self.x = (self.x + MAX_ITEM_WIDTH).rem_euclid(WRAP_SPAN) - MAX_ITEM_WIDTH;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub kind: LaneKind,
    /// Signed horizontal velocity (px/frame)
    pub speed: f32,
    pub items: Vec<Item>,
}

impl Lane {
    fn random(params: &CrossingParams, rng: &mut Pcg32) -> Self {
        let kind = if rng.random_bool(0.5) {
            LaneKind::Traffic
        } else {
            LaneKind::River
        };
        let base = match kind {
            LaneKind::Traffic => params.traffic_speed,
            LaneKind::River => params.log_speed,
        };
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed = base * sign * (0.5 + rng.random::<f32>());

        let mut items = Vec::new();
        let mut x = -MAX_ITEM_WIDTH + rng.random::<f32>() * MAX_ITEM_GAP;
        while x < CANVAS_WIDTH {
            let width = rng.random_range(MIN_ITEM_WIDTH..MAX_ITEM_WIDTH);
            items.push(Item { x, width });
            x += width + rng.random_range(MIN_ITEM_GAP..MAX_ITEM_GAP);
        }
        Self { kind, speed, items }
    }

    /// First item overlapping the horizontal span `[x, x + w)`
    fn item_under(&self, x: f32, w: f32) -> Option<&Item> {
        self.items.iter().find(|i| x < i.x + i.width && x + w > i.x)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f32,
    /// Row index, 0 is the far bank
    pub row: usize,
}

#[derive(Debug, Clone)]
pub struct Crossing {
    pub params: CrossingParams,
    pub lanes: Vec<Lane>,
    pub player: Player,
    pub lane_height: f32,
    pub player_size: f32,
}

impl Crossing {
    fn start_row(&self) -> usize {
        self.lanes.len() + 1
    }

    fn start_x(&self) -> f32 {
        CANVAS_WIDTH / 2.0 - self.player_size / 2.0
    }

    fn reset_player(&mut self) {
        self.player = Player {
            x: self.start_x(),
            row: self.start_row(),
        };
    }

    /// Hazard lane under the player, if any
    pub fn current_lane(&self) -> Option<&Lane> {
        self.player.row.checked_sub(1).and_then(|i| self.lanes.get(i))
    }

    pub fn row_y(&self, row: usize) -> f32 {
        row as f32 * self.lane_height
    }

    pub fn player_rect(&self) -> Rect {
        let inset = (self.lane_height - self.player_size) / 2.0;
        Rect::new(
            self.player.x,
            self.row_y(self.player.row) + inset,
            self.player_size,
            self.player_size,
        )
    }

    fn item_rect(&self, row: usize, item: &Item) -> Rect {
        let inset = (self.lane_height - self.player_size) / 2.0;
        Rect::new(item.x, self.row_y(row) + inset, item.width, self.player_size)
    }

    fn move_player(&mut self, dir: Direction) {
        let last_row = self.start_row();
        match dir {
            Direction::Up => self.player.row = self.player.row.saturating_sub(1),
            Direction::Down => self.player.row = (self.player.row + 1).min(last_row),
            Direction::Left => self.player.x -= self.player_size,
            Direction::Right => self.player.x += self.player_size,
        }
        self.player.x = self.player.x.clamp(0.0, CANVAS_WIDTH - self.player_size);
    }
}

impl Kernel for Crossing {
    fn init(params: &ParameterSet, rng: &mut Pcg32) -> Self {
        let params = CrossingParams::from_set(params);
        let lanes: Vec<Lane> = (0..params.lanes).map(|_| Lane::random(&params, rng)).collect();
        let lane_height = CANVAS_HEIGHT / (lanes.len() as f32 + 2.0);
        let player_size = MAX_PLAYER_SIZE.min(lane_height * 0.8);
        let mut k = Self {
            params,
            lanes,
            player: Player { x: 0.0, row: 0 },
            lane_height,
            player_size,
        };
        k.reset_player();
        k
    }

    fn input_model(&self) -> InputModel {
        InputModel::Directional
    }

    fn step(&mut self, state: &mut SessionState) -> Flow {
        for lane in &mut self.lanes {
            for item in &mut lane.items {
                item.advance(lane.speed);
            }
        }

        let (x, w) = (self.player.x, self.player_size);
        let footing = self
            .current_lane()
            .map(|lane| (lane.kind, lane.speed, lane.item_under(x, w).is_some()));
        match footing {
            Some((LaneKind::Traffic, _, true)) => return Flow::Over,
            Some((LaneKind::River, _, false)) => return Flow::Over,
            Some((LaneKind::River, speed, true)) => {
                self.player.x += speed;
                if self.player.x + w < 0.0 || self.player.x > CANVAS_WIDTH {
                    return Flow::Over;
                }
            }
            _ => {}
        }

        if self.player.row == 0 {
            state.add_score(1);
            state.emit(GameEvent::Crossed);
            state.emit(GameEvent::Scored);
            self.reset_player();
        }
        Flow::Continue
    }

    fn handle_action(&mut self, state: &mut SessionState, action: Action) {
        if let Action::Move(dir) = action {
            self.move_player(dir);
            state.emit(GameEvent::Jumped);
        }
    }

    fn draw(&self, _state: &SessionState, surface: &mut dyn Surface) {
        let bank = |row| Rect::new(0.0, self.row_y(row), CANVAS_WIDTH, self.lane_height);
        surface.fill_rect(bank(0), SAFE_COLOR);
        surface.fill_rect(bank(self.start_row()), SAFE_COLOR);

        for (i, lane) in self.lanes.iter().enumerate() {
            let row = i + 1;
            let (ground, item_color) = match lane.kind {
                LaneKind::Traffic => (ROAD_COLOR, CAR_COLOR),
                LaneKind::River => (RIVER_COLOR, LOG_COLOR),
            };
            surface.fill_rect(bank(row), ground);
            for item in &lane.items {
                draw_sprite_or(surface, Sprite::Npc, self.item_rect(row, item), item_color);
            }
        }

        draw_sprite_or(surface, Sprite::MainCharacter, self.player_rect(), palette::PLACEHOLDER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recorder::Recorder;

    fn kernel(params: ParameterSet) -> (Crossing, SessionState) {
        let mut state = SessionState::new(8);
        let k = Crossing::init(&params, &mut state.rng);
        state.start();
        (k, state)
    }

    fn defaults() -> ParameterSet {
        ParameterSet::defaults(TemplateId::CrossyRoad.template())
    }

    fn lane(kind: LaneKind, speed: f32, items: &[(f32, f32)]) -> Lane {
        Lane {
            kind,
            speed,
            items: items.iter().map(|&(x, width)| Item { x, width }).collect(),
        }
    }

    #[test]
    fn test_layout() {
        let (k, _) = kernel(defaults());
        assert_eq!(k.lanes.len(), 10);
        assert_eq!(k.lane_height, 450.0 / 12.0);
        assert_eq!(k.player_size, 30.0);
        assert_eq!(k.player.row, 11);
        assert_eq!(k.player.x, 385.0);
        assert!(k.current_lane().is_none());
        for lane in &k.lanes {
            assert!(!lane.items.is_empty());
            let base = match lane.kind {
                LaneKind::Traffic => 2.0,
                LaneKind::River => 1.5,
            };
            assert!(lane.speed.abs() >= base * 0.5 && lane.speed.abs() <= base * 1.5);
        }
    }

    #[test]
    fn test_river_without_log_ends_in_one_step() {
        let (mut k, mut state) = kernel(defaults());
        k.lanes[0] = lane(LaneKind::River, 1.5, &[]);
        k.player.row = 1;
        assert_eq!(k.step(&mut state), Flow::Over);
    }

    #[test]
    fn test_log_carries_player() {
        let (mut k, mut state) = kernel(defaults());
        k.lanes[3] = lane(LaneKind::River, 2.0, &[(300.0, 80.0)]);
        k.player = Player { x: 320.0, row: 4 };
        assert_eq!(k.step(&mut state), Flow::Continue);
        assert_eq!(k.player.x, 322.0);
    }

    #[test]
    fn test_drifting_off_canvas_ends() {
        let (mut k, mut state) = kernel(defaults());
        k.lanes[3] = lane(LaneKind::River, -3.0, &[(-40.0, 80.0)]);
        k.player = Player { x: -28.0, row: 4 };
        assert_eq!(k.step(&mut state), Flow::Over);
    }

    #[test]
    fn test_car_hit_ends() {
        let (mut k, mut state) = kernel(defaults());
        k.lanes[0] = lane(LaneKind::Traffic, 2.0, &[(380.0, 40.0)]);
        k.player.row = 1;
        assert_eq!(k.step(&mut state), Flow::Over);

        let (mut k, mut state) = kernel(defaults());
        k.lanes[0] = lane(LaneKind::Traffic, 2.0, &[(10.0, 40.0)]);
        k.player.row = 1;
        assert_eq!(k.step(&mut state), Flow::Continue);
    }

    #[test]
    fn test_reaching_far_bank_scores_and_resets() {
        let (mut k, mut state) = kernel(defaults());
        k.player.row = 1;
        k.handle_action(&mut state, Action::Move(Direction::Up));
        assert_eq!(k.player.row, 0);
        assert_eq!(k.step(&mut state), Flow::Continue);
        assert_eq!(state.score(), 1);
        assert_eq!(k.player.row, 11);
        assert_eq!(k.player.x, 385.0);
        assert!(state.drain_events().contains(&GameEvent::Crossed));
    }

    #[test]
    fn test_moves_clamp_to_canvas() {
        let (mut k, mut state) = kernel(defaults());
        k.handle_action(&mut state, Action::Move(Direction::Down));
        assert_eq!(k.player.row, 11);
        for _ in 0..40 {
            k.handle_action(&mut state, Action::Move(Direction::Left));
        }
        assert_eq!(k.player.x, 0.0);
        for _ in 0..40 {
            k.handle_action(&mut state, Action::Move(Direction::Right));
        }
        assert_eq!(k.player.x, CANVAS_WIDTH - 30.0);
        k.handle_action(&mut state, Action::Move(Direction::Up));
        assert_eq!(k.player.row, 10);
    }

    #[test]
    fn test_items_wrap() {
        let mut item = Item { x: 799.0, width: 50.0 };
        item.advance(2.0);
        assert_eq!(item.x, 801.0 - WRAP_SPAN);
        let mut item = Item { x: -79.0, width: 50.0 };
        item.advance(-2.0);
        assert_eq!(item.x, -81.0 + WRAP_SPAN);
    }

    #[test]
    fn test_fast_items_stay_in_span() {
        let mut item = Item { x: 100.0, width: 50.0 };
        for _ in 0..10 {
            item.advance(2000.0);
            assert!((-MAX_ITEM_WIDTH..CANVAS_WIDTH).contains(&item.x), "x = {}", item.x);
        }
        let mut item = Item { x: 100.0, width: 50.0 };
        for _ in 0..10 {
            item.advance(-2000.0);
            assert!((-MAX_ITEM_WIDTH..CANVAS_WIDTH).contains(&item.x), "x = {}", item.x);
        }
    }

    #[test]
    fn test_small_lanes_shrink_player() {
        let (k, _) = kernel(defaults().with("lanes", 20.0));
        assert!(k.player_size < 30.0);
        let rect = k.player_rect();
        assert!(rect.bottom() <= CANVAS_HEIGHT);
    }

    #[test]
    fn test_draw_banks_and_player() {
        let (k, state) = kernel(defaults());
        let mut rec = Recorder::new();
        k.draw(&state, &mut rec);
        assert_eq!(rec.fills_of(SAFE_COLOR), 2);
        assert_eq!(rec.fills_of(palette::PLACEHOLDER), 1);
    }
}

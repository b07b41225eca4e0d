/// Tetromino pieces and the block-drop board.
///
/// Board coordinates: x grows right, y grows down, row 0 is the top.
/// Pieces spawn above the visible area only conceptually; a spawn that
/// collides immediately ends the game.

use rand::Rng;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Kind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl Kind {
    pub const ALL: [Kind; 7] = [Kind::I, Kind::O, Kind::T, Kind::S, Kind::Z, Kind::J, Kind::L];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Kind {
        Kind::ALL[rng.gen_range(0..Kind::ALL.len())]
    }

    /// Rotation box size and spawn-orientation cells within it.
    fn shape(self) -> (i32, [(i32, i32); 4]) {
        match self {
            Kind::I => (4, [(0, 1), (1, 1), (2, 1), (3, 1)]),
            Kind::O => (2, [(0, 0), (1, 0), (0, 1), (1, 1)]),
            Kind::T => (3, [(1, 0), (0, 1), (1, 1), (2, 1)]),
            Kind::S => (3, [(1, 0), (2, 0), (0, 1), (1, 1)]),
            Kind::Z => (3, [(0, 0), (1, 0), (1, 1), (2, 1)]),
            Kind::J => (3, [(0, 0), (0, 1), (1, 1), (2, 1)]),
            Kind::L => (3, [(2, 0), (0, 1), (1, 1), (2, 1)]),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: Kind,
    pub rotation: u8,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Absolute board cells occupied by this piece.
    pub fn blocks(&self) -> [(i32, i32); 4] {
        let (size, cells) = self.kind.shape();
        let mut out = cells;
        for cell in out.iter_mut() {
            let (mut cx, mut cy) = *cell;
            for _ in 0..self.rotation % 4 {
                // clockwise inside the rotation box
                let nx = size - 1 - cy;
                cy = cx;
                cx = nx;
            }
            *cell = (self.x + cx, self.y + cy);
        }
        out
    }

    fn shifted(&self, dx: i32, dy: i32) -> Piece {
        Piece { x: self.x + dx, y: self.y + dy, ..*self }
    }

    fn rotated(&self) -> Piece {
        Piece { rotation: (self.rotation + 1) % 4, ..*self }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Landing {
    Moved,
    Locked { lines: u32 },
    GameOver,
}

/// Points for clearing 0..=4 lines at once.
const LINE_POINTS: [u32; 5] = [0, 100, 300, 500, 800];

#[derive(Clone, Debug)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    cells: Vec<Vec<Option<Kind>>>,
    pub active: Option<Piece>,
    pub lines_cleared: u32,
    pub score: u32,
    pub game_over: bool,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Board {
            width,
            height,
            cells: vec![vec![None; width]; height],
            active: None,
            lines_cleared: 0,
            score: 0,
            game_over: false,
        }
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Kind> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    pub fn set_cell(&mut self, x: usize, y: usize, kind: Option<Kind>) {
        if x < self.width && y < self.height {
            self.cells[y][x] = kind;
        }
    }

    fn fits(&self, piece: &Piece) -> bool {
        piece.blocks().iter().all(|&(x, y)| {
            x >= 0 && y >= 0
                && (x as usize) < self.width
                && (y as usize) < self.height
                && self.cells[y as usize][x as usize].is_none()
        })
    }

    /// Place a new piece at the top center. Returns false (and sets
    /// `game_over`) if it does not fit.
    pub fn spawn(&mut self, kind: Kind) -> bool {
        let (size, _) = kind.shape();
        let piece = Piece {
            kind,
            rotation: 0,
            x: (self.width as i32 - size) / 2,
            y: 0,
        };
        if self.fits(&piece) {
            self.active = Some(piece);
            true
        } else {
            self.active = None;
            self.game_over = true;
            false
        }
    }

    fn try_replace(&mut self, candidate: Piece) -> bool {
        if self.fits(&candidate) {
            self.active = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) -> bool {
        match self.active {
            Some(p) => self.try_replace(p.shifted(-1, 0)),
            None => false,
        }
    }

    pub fn move_right(&mut self) -> bool {
        match self.active {
            Some(p) => self.try_replace(p.shifted(1, 0)),
            None => false,
        }
    }

    /// Rotate clockwise, nudging one column either way if blocked.
    pub fn rotate(&mut self) -> bool {
        let Some(p) = self.active else { return false };
        let r = p.rotated();
        self.try_replace(r)
            || self.try_replace(r.shifted(-1, 0))
            || self.try_replace(r.shifted(1, 0))
    }

    /// One gravity step: move down, or lock and clear lines.
    pub fn step_down(&mut self) -> Landing {
        if self.game_over { return Landing::GameOver; }
        let Some(p) = self.active else { return Landing::Moved };
        if self.try_replace(p.shifted(0, 1)) {
            return Landing::Moved;
        }
        let lines = self.lock(p);
        Landing::Locked { lines }
    }

    /// Drop straight to the floor and lock.
    pub fn hard_drop(&mut self) -> Landing {
        loop {
            match self.step_down() {
                Landing::Moved if self.active.is_some() => continue,
                other => return other,
            }
        }
    }

    fn lock(&mut self, piece: Piece) -> u32 {
        for (x, y) in piece.blocks() {
            self.set_cell(x as usize, y as usize, Some(piece.kind));
        }
        self.active = None;
        let lines = self.clear_lines();
        self.lines_cleared += lines;
        self.score += LINE_POINTS[lines.min(4) as usize];
        lines
    }

    fn clear_lines(&mut self) -> u32 {
        let before = self.cells.len();
        self.cells.retain(|row| row.iter().any(|c| c.is_none()));
        let cleared = before - self.cells.len();
        for _ in 0..cleared {
            self.cells.insert(0, vec![None; self.width]);
        }
        cleared as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_rotations_return_to_start() {
        for kind in Kind::ALL {
            let mut p = Piece { kind, rotation: 0, x: 3, y: 3 };
            let start = p.blocks();
            for _ in 0..4 { p = p.rotated(); }
            assert_eq!(p.blocks(), start);
        }
    }

    #[test]
    fn i_piece_rotates_vertical() {
        let p = Piece { kind: Kind::I, rotation: 1, x: 0, y: 0 };
        let xs: Vec<i32> = p.blocks().iter().map(|b| b.0).collect();
        assert!(xs.iter().all(|&x| x == xs[0]));
    }

    #[test]
    fn walls_block_movement() {
        let mut b = Board::new(10, 20);
        assert!(b.spawn(Kind::O));
        for _ in 0..10 { b.move_left(); }
        let min_x = b.active.map(|p| p.blocks().iter().map(|c| c.0).min().unwrap_or(-1));
        assert_eq!(min_x, Some(0));
        assert!(!b.move_left());
    }

    #[test]
    fn hard_drop_lands_on_floor() {
        let mut b = Board::new(10, 20);
        b.spawn(Kind::O);
        assert_eq!(b.hard_drop(), Landing::Locked { lines: 0 });
        assert!(b.cell(4, 19).is_some());
        assert!(b.cell(4, 18).is_some());
        assert!(b.active.is_none());
    }

    #[test]
    fn full_row_is_cleared_and_scored() {
        let mut b = Board::new(4, 6);
        // bottom row full except the two right columns
        b.set_cell(0, 5, Some(Kind::J));
        b.set_cell(1, 5, Some(Kind::J));
        b.set_cell(0, 4, Some(Kind::L));
        // O piece fills (2,4),(3,4),(2,5),(3,5)
        b.active = Some(Piece { kind: Kind::O, rotation: 0, x: 2, y: 0 });
        assert_eq!(b.hard_drop(), Landing::Locked { lines: 1 });
        assert_eq!(b.lines_cleared, 1);
        assert_eq!(b.score, 100);
        // row 4 shifted down into row 5
        assert_eq!(b.cell(0, 5), Some(Kind::L));
        assert_eq!(b.cell(1, 5), None);
        assert_eq!(b.cell(2, 5), Some(Kind::O));
    }

    #[test]
    fn blocked_spawn_is_game_over() {
        let mut b = Board::new(4, 4);
        for x in 0..4 { b.set_cell(x, 0, Some(Kind::I)); }
        assert!(!b.spawn(Kind::T));
        assert!(b.game_over);
        assert_eq!(b.step_down(), Landing::GameOver);
    }
}

/// Cell kinds shared by every grid-based game.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Wall,
    Floor,
    Item,  // Collectible (maze)
    Code,  // Collectible code fragment (code maze variant)
    Exit,
}

impl Cell {
    /// Can the player occupy this cell?
    pub fn is_walkable(self) -> bool {
        !matches!(self, Cell::Wall)
    }

    /// Is this a pickup the player must collect?
    pub fn is_collectible(self) -> bool {
        matches!(self, Cell::Item | Cell::Code)
    }

    pub fn is_exit(self) -> bool {
        matches!(self, Cell::Exit)
    }

    /// Parse a text-diagram character; anything unknown is floor.
    pub fn from_glyph(c: char) -> Cell {
        match c {
            '#' => Cell::Wall,
            '*' => Cell::Item,
            '$' => Cell::Code,
            'E' => Cell::Exit,
            _   => Cell::Floor,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Floor
    }
}

pub mod battle;
pub mod blocks;
pub mod event;
pub mod lifecycle;
pub mod maze;
pub mod pathfind;
pub mod playback;
pub mod race;
pub mod timer;

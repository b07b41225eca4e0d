pub mod cell;
pub mod graph;
pub mod grid;
pub mod regex_trainer;
pub mod score;
pub mod sort;
pub mod stack;
pub mod tetromino;

/// Scrubbable playback over a recorded step sequence.
///
/// Manual stepping works at any time; auto-play advances one step per
/// `interval` of fed frame time and stops by itself on the last step.

use std::time::Duration;

use crate::domain::sort::{self, Algorithm, SortStep};

pub struct Playback {
    steps: Vec<SortStep>,
    position: usize,
    interval: Duration,
    carry: Duration,
    playing: bool,
}

impl Playback {
    pub fn new(steps: Vec<SortStep>, interval: Duration) -> Self {
        Playback {
            steps,
            position: 0,
            interval: interval.max(Duration::from_millis(1)),
            carry: Duration::ZERO,
            playing: false,
        }
    }

    /// Record `input` with `algorithm` and wrap the steps.
    pub fn record(input: &[i32], algorithm: Algorithm, interval: Duration) -> Self {
        Playback::new(sort::record(input, algorithm), interval)
    }

    pub fn current(&self) -> Option<&SortStep> {
        self.steps.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn at_end(&self) -> bool {
        self.steps.is_empty() || self.position + 1 >= self.steps.len()
    }

    pub fn next(&mut self) -> bool {
        if self.at_end() { return false; }
        self.position += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.position == 0 { return false; }
        self.position -= 1;
        true
    }

    pub fn seek(&mut self, position: usize) {
        self.position = position.min(self.steps.len().saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.position = 0;
        self.carry = Duration::ZERO;
        self.playing = false;
    }

    pub fn play(&mut self) {
        if !self.at_end() {
            self.playing = true;
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.carry = Duration::ZERO;
    }

    pub fn toggle(&mut self) {
        if self.playing { self.stop() } else { self.play() }
    }

    /// Feed frame time; returns how many steps were taken.
    pub fn advance(&mut self, dt: Duration) -> usize {
        if !self.playing { return 0; }
        self.carry += dt;
        let mut taken = 0;
        while self.carry >= self.interval {
            self.carry -= self.interval;
            if !self.next() {
                self.stop();
                break;
            }
            taken += 1;
        }
        if self.at_end() {
            self.stop();
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn scrub_both_directions() {
        let mut p = Playback::record(&[3, 1, 2], Algorithm::Bubble, TICK);
        assert!(!p.prev());
        assert!(p.next());
        assert!(p.next());
        assert_eq!(p.position(), 2);
        assert!(p.prev());
        p.seek(1000);
        assert!(p.at_end());
        assert_eq!(p.current().map(|s| s.array.clone()), Some(vec![1, 2, 3]));
    }

    #[test]
    fn auto_play_runs_to_the_end_and_stops() {
        let mut p = Playback::record(&[5, 4, 3, 2, 1], Algorithm::Selection, TICK);
        let total = p.len();
        p.play();
        let mut taken = 0;
        for _ in 0..1000 {
            taken += p.advance(TICK);
        }
        assert_eq!(taken, total - 1);
        assert!(!p.is_playing());
        assert!(p.at_end());
    }

    #[test]
    fn partial_interval_waits() {
        let mut p = Playback::record(&[2, 1], Algorithm::Bubble, TICK);
        p.play();
        assert_eq!(p.advance(Duration::from_millis(60)), 0);
        assert_eq!(p.advance(Duration::from_millis(60)), 1);
    }

    #[test]
    fn empty_sequence_never_plays() {
        let mut p = Playback::record(&[], Algorithm::Bubble, TICK);
        p.play();
        assert!(!p.is_playing());
        assert!(p.current().is_none());
        p.seek(3);
        assert_eq!(p.position(), 0);
    }
}

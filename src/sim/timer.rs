/// Whole-second countdown driven by elapsed wall-clock time.
///
/// The frame loop feeds `advance(dt)` with the time since the previous
/// frame. Every full second decrements `remaining` by one and yields a
/// `Tick`; reaching zero yields `Expired` exactly once. An expired or
/// cancelled timer never emits again, whatever it is fed.
///
/// The timer is a plain owned value: whoever holds it decides its
/// lifetime, and dropping it is the release.

use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerEvent {
    Tick { remaining: u32 },
    Expired,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    Running,
    Paused,
    /// Started at zero or below: expire on the first advance.
    PendingExpiry,
    Expired,
    Cancelled,
}

#[derive(Clone, Debug)]
pub struct CountdownTimer {
    remaining: u32,
    carry: Duration,
    state: State,
}

impl CountdownTimer {
    pub fn start(seconds: i64) -> Self {
        if seconds <= 0 {
            CountdownTimer { remaining: 0, carry: Duration::ZERO, state: State::PendingExpiry }
        } else {
            CountdownTimer {
                remaining: seconds.min(u32::MAX as i64) as u32,
                carry: Duration::ZERO,
                state: State::Running,
            }
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn advance(&mut self, elapsed: Duration) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        match self.state {
            State::PendingExpiry => {
                self.state = State::Expired;
                events.push(TimerEvent::Expired);
            }
            State::Running => {
                self.carry += elapsed;
                while self.carry >= SECOND {
                    self.carry -= SECOND;
                    self.remaining -= 1;
                    events.push(TimerEvent::Tick { remaining: self.remaining });
                    if self.remaining == 0 {
                        self.state = State::Expired;
                        self.carry = Duration::ZERO;
                        events.push(TimerEvent::Expired);
                        break;
                    }
                }
            }
            State::Paused | State::Expired | State::Cancelled => {}
        }
        events
    }

    /// Stop counting; the partial second is kept for `resume`.
    pub fn pause(&mut self) {
        if self.state == State::Running {
            self.state = State::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == State::Paused {
            self.state = State::Running;
        }
    }

    /// Stop for good without signalling expiry.
    pub fn cancel(&mut self) {
        if self.state != State::Expired {
            self.state = State::Cancelled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn exactly_n_ticks_then_one_expiry() {
        let mut t = CountdownTimer::start(5);
        let mut ticks = 0;
        let mut expiries = 0;
        // 100 frames of 250ms = 25s, far past the duration
        for _ in 0..100 {
            for e in t.advance(ms(250)) {
                match e {
                    TimerEvent::Tick { .. } => ticks += 1,
                    TimerEvent::Expired => expiries += 1,
                }
            }
        }
        assert_eq!(ticks, 5);
        assert_eq!(expiries, 1);
        assert_eq!(t.state, State::Expired);
    }

    #[test]
    fn large_frame_emits_every_tick() {
        let mut t = CountdownTimer::start(3);
        let events = t.advance(ms(10_000));
        assert_eq!(events, vec![
            TimerEvent::Tick { remaining: 2 },
            TimerEvent::Tick { remaining: 1 },
            TimerEvent::Tick { remaining: 0 },
            TimerEvent::Expired,
        ]);
        assert!(t.advance(ms(10_000)).is_empty());
    }

    #[test]
    fn sub_second_frames_accumulate() {
        let mut t = CountdownTimer::start(10);
        assert!(t.advance(ms(600)).is_empty());
        assert_eq!(t.advance(ms(600)), vec![TimerEvent::Tick { remaining: 9 }]);
        assert_eq!(t.remaining(), 9);
    }

    #[test]
    fn zero_or_negative_expires_immediately() {
        for secs in [0, -3] {
            let mut t = CountdownTimer::start(secs);
            assert_eq!(t.advance(Duration::ZERO), vec![TimerEvent::Expired]);
            assert!(t.advance(ms(5000)).is_empty());
        }
    }

    #[test]
    fn pause_holds_and_cancel_silences() {
        let mut t = CountdownTimer::start(3);
        t.pause();
        assert!(t.advance(ms(5000)).is_empty());
        t.resume();
        assert_eq!(t.advance(ms(1000)).len(), 1);
        t.cancel();
        assert!(t.advance(ms(5000)).is_empty());
        assert_eq!(t.state, State::Cancelled);
    }
}

/// Submission scoring for battle and race games.
///
/// Nothing here reads, parses or runs the submitted text: an `Evaluator`
/// turns a submission into a `Score`, and the helpers below turn a score
/// into a bounded game effect. `RandomEvaluator` is the stock variant;
/// anything implementing `Evaluator` can be swapped in at the call sites.

use rand::Rng;

/// Quality of a submission, always within `0..=100`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        Score(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

pub trait Evaluator {
    fn evaluate(&mut self, submission: &str) -> Score;
}

/// Uniformly distributed scores, ignoring content.
pub struct RandomEvaluator<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomEvaluator<R> {
    pub fn new(rng: R) -> Self {
        RandomEvaluator { rng }
    }
}

impl<R: Rng> Evaluator for RandomEvaluator<R> {
    fn evaluate(&mut self, _submission: &str) -> Score {
        Score::new(self.rng.gen_range(0..=Score::MAX))
    }
}

/// Always returns the same score.
#[derive(Clone, Copy, Debug)]
pub struct FixedEvaluator(pub Score);

impl Evaluator for FixedEvaluator {
    fn evaluate(&mut self, _submission: &str) -> Score {
        self.0
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&mut self, submission: &str) -> Score {
        (**self).evaluate(submission)
    }
}

/// Blank submissions never reach the evaluator.
pub fn evaluate_submission<E: Evaluator + ?Sized>(evaluator: &mut E, submission: &str) -> Option<Score> {
    if submission.trim().is_empty() {
        None
    } else {
        Some(evaluator.evaluate(submission))
    }
}

/// Health damage proportional to the score, `0..=max`.
pub fn damage(score: Score, max: u32) -> u32 {
    // widened so any configured maximum fits; the result never exceeds `max`
    let scaled = u64::from(max) * u64::from(score.value()) / u64::from(Score::MAX);
    scaled as u32
}

/// Percentage progress gained, `0..=max_step`.
pub fn progress(score: Score, max_step: u32) -> u32 {
    damage(score, max_step)
}

pub fn passes(score: Score, threshold: u8) -> bool {
    score.value() >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn score_is_clamped() {
        assert_eq!(Score::new(250).value(), 100);
    }

    #[test]
    fn random_scores_stay_in_range_and_vary() {
        let mut ev = RandomEvaluator::new(StdRng::seed_from_u64(9));
        let scores: Vec<u8> = (0..200).map(|_| ev.evaluate("fn main() {}").value()).collect();
        assert!(scores.iter().all(|&s| s <= 100));
        let min = scores.iter().min().copied().unwrap_or(0);
        let max = scores.iter().max().copied().unwrap_or(0);
        assert!(max - min > 50);
    }

    #[test]
    fn blank_submission_is_not_evaluated() {
        let mut ev = FixedEvaluator(Score::new(80));
        assert_eq!(evaluate_submission(&mut ev, "   \n"), None);
        assert_eq!(evaluate_submission(&mut ev, "x"), Some(Score::new(80)));
    }

    #[test]
    fn derived_effects_are_bounded() {
        assert_eq!(damage(Score::new(100), 25), 25);
        assert_eq!(damage(Score::new(0), 25), 0);
        assert_eq!(damage(Score::new(50), 30), 15);
        assert_eq!(progress(Score::new(40), 20), 8);
        assert!(passes(Score::new(60), 60));
        assert!(!passes(Score::new(59), 60));
    }

    #[test]
    fn huge_maximums_do_not_overflow() {
        assert_eq!(damage(Score::new(100), u32::MAX), u32::MAX);
        assert_eq!(damage(Score::new(50), u32::MAX / 10), u32::MAX / 20);
        assert_eq!(progress(Score::new(100), u32::MAX), u32::MAX);
    }

    #[test]
    fn boxed_evaluator_is_substitutable() {
        let mut ev: Box<dyn Evaluator> = Box::new(FixedEvaluator(Score::new(12)));
        assert_eq!(evaluate_submission(&mut ev, "code"), Some(Score::new(12)));
    }
}

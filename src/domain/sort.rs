/// Sorting step recorder for the visualizer.
///
/// The selected algorithm runs to completion against a private copy of the
/// input before playback starts. Every comparison records one step, every
/// swap records one more, so the sequence can be scrubbed in both
/// directions or auto-played. Bubble and insertion swaps are always
/// adjacent; selection swaps the minimum straight into place.
///
/// The final step always holds the ascending sort of the input.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bubble,
    Selection,
    Insertion,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Bubble, Algorithm::Selection, Algorithm::Insertion];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Selection => "Selection Sort",
            Algorithm::Insertion => "Insertion Sort",
        }
    }

    pub fn next(self) -> Algorithm {
        match self {
            Algorithm::Bubble => Algorithm::Selection,
            Algorithm::Selection => Algorithm::Insertion,
            Algorithm::Insertion => Algorithm::Bubble,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SortStep {
    pub array: Vec<i32>,
    /// Indices under comparison; `None` on the final "done" step.
    pub comparing: Option<(usize, usize)>,
    pub swapping: bool,
}

/// Run `algorithm` over a copy of `input` and return every step.
pub fn record(input: &[i32], algorithm: Algorithm) -> Vec<SortStep> {
    let mut rec = Recorder { array: input.to_vec(), steps: Vec::new() };
    match algorithm {
        Algorithm::Bubble => rec.bubble(),
        Algorithm::Selection => rec.selection(),
        Algorithm::Insertion => rec.insertion(),
    }
    rec.finish()
}

/// Values for a fresh visualizer run: `len` numbers in 5..=100.
pub fn random_input<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<i32> {
    (0..len).map(|_| rng.gen_range(5..=100)).collect()
}

struct Recorder {
    array: Vec<i32>,
    steps: Vec<SortStep>,
}

impl Recorder {
    fn compare(&mut self, i: usize, j: usize) {
        self.steps.push(SortStep {
            array: self.array.clone(),
            comparing: Some((i, j)),
            swapping: false,
        });
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.array.swap(i, j);
        self.steps.push(SortStep {
            array: self.array.clone(),
            comparing: Some((i, j)),
            swapping: true,
        });
    }

    fn bubble(&mut self) {
        let n = self.array.len();
        for pass in 0..n.saturating_sub(1) {
            for j in 0..n - 1 - pass {
                self.compare(j, j + 1);
                if self.array[j] > self.array[j + 1] {
                    self.swap(j, j + 1);
                }
            }
        }
    }

    fn selection(&mut self) {
        let n = self.array.len();
        for i in 0..n.saturating_sub(1) {
            let mut min = i;
            for j in i + 1..n {
                self.compare(min, j);
                if self.array[j] < self.array[min] {
                    min = j;
                }
            }
            if min != i {
                self.swap(i, min);
            }
        }
    }

    fn insertion(&mut self) {
        for i in 1..self.array.len() {
            let mut j = i;
            while j > 0 {
                self.compare(j - 1, j);
                if self.array[j - 1] <= self.array[j] { break; }
                self.swap(j - 1, j);
                j -= 1;
            }
        }
    }

    fn finish(mut self) -> Vec<SortStep> {
        // Closing step so playback always lands on a settled, sorted array.
        if !self.array.is_empty() {
            self.steps.push(SortStep {
                array: self.array,
                comparing: None,
                swapping: false,
            });
        }
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(v: &[i32]) -> Vec<i32> {
        let mut s = v.to_vec();
        s.sort();
        s
    }

    #[test]
    fn final_step_is_sorted_for_every_algorithm() {
        let mut rng = StdRng::seed_from_u64(42);
        for len in 0..=13 {
            for _ in 0..10 {
                let input = random_input(len, &mut rng);
                for alg in Algorithm::ALL {
                    let steps = record(&input, alg);
                    if let Some(last) = steps.last() {
                        assert_eq!(last.array, sorted(&input), "{alg:?} {input:?}");
                    }
                    assert!(steps.iter().all(|s| s.array.len() == input.len()));
                }
            }
        }
    }

    #[test]
    fn consecutive_steps_differ_by_at_most_one_swap() {
        let input = vec![9, 3, 7, 1, 8, 2, 2, 5];
        for alg in Algorithm::ALL {
            let steps = record(&input, alg);
            let mut prev = input.clone();
            for s in &steps {
                let diffs: Vec<usize> = (0..prev.len()).filter(|&i| prev[i] != s.array[i]).collect();
                if !diffs.is_empty() {
                    assert!(diffs.len() == 2 && s.swapping, "{alg:?}");
                    let (i, j) = s.comparing.unwrap_or((usize::MAX, usize::MAX));
                    assert_eq!((i.min(j), i.max(j)), (diffs[0], diffs[1]), "{alg:?}");
                    // selection sort swaps the minimum into place from anywhere
                    if alg != Algorithm::Selection {
                        assert_eq!(diffs[1] - diffs[0], 1, "{alg:?} swap not adjacent");
                    }
                }
                prev = s.array.clone();
            }
        }
    }

    #[test]
    fn bubble_counts_comparisons_and_swaps() {
        // [3,2,1]: 3 comparisons, 3 swaps, plus the closing step
        let steps = record(&[3, 2, 1], Algorithm::Bubble);
        assert_eq!(steps.iter().filter(|s| !s.swapping && s.comparing.is_some()).count(), 3);
        assert_eq!(steps.iter().filter(|s| s.swapping).count(), 3);
        assert_eq!(steps.len(), 7);
    }

    #[test]
    fn selection_swaps_at_most_n_minus_one_times() {
        let steps = record(&[5, 4, 3, 2, 1], Algorithm::Selection);
        assert!(steps.iter().filter(|s| s.swapping).count() <= 4);
    }

    #[test]
    fn empty_and_single_inputs_are_not_errors() {
        assert!(record(&[], Algorithm::Bubble).is_empty());
        let one = record(&[7], Algorithm::Selection);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].array, vec![7]);
        assert_eq!(one[0].comparing, None);
    }
}

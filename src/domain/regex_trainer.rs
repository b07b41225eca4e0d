/// Regex trainer: write a pattern that classifies every literal test case.
///
/// Patterns use search semantics (a match anywhere in the input counts),
/// so anchors are up to the player. A pattern that fails to compile
/// matches nothing; the attempt reports the compiler's reason so the
/// player can tell a rejected pattern from a wrong one. Look-around and
/// backreferences are not supported by the engine.

use regex::Regex;
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub fn points(self) -> u32 {
        match self {
            Tier::Easy => 100,
            Tier::Medium => 200,
            Tier::Hard => 300,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Easy => "Easy",
            Tier::Medium => "Medium",
            Tier::Hard => "Hard",
        }
    }
}

#[derive(Clone, Debug)]
pub struct TestCase {
    pub input: &'static str,
    pub should_match: bool,
}

#[derive(Clone, Debug)]
pub struct Challenge {
    pub title: &'static str,
    pub description: &'static str,
    pub tier: Tier,
    pub cases: Vec<TestCase>,
}

const fn case(input: &'static str, should_match: bool) -> TestCase {
    TestCase { input, should_match }
}

pub fn builtin_challenges() -> Vec<Challenge> {
    vec![
        Challenge {
            title: "Email Validation",
            description: "Match valid email addresses",
            tier: Tier::Easy,
            cases: vec![
                case("user@domain.com", true),
                case("test.email@site.org", true),
                case("invalid.email", false),
                case("@domain.com", false),
            ],
        },
        Challenge {
            title: "Hex Color",
            description: "Match 3 or 6 digit hex colors with a leading #",
            tier: Tier::Easy,
            cases: vec![
                case("#fff", true),
                case("#1a2B3c", true),
                case("123456", false),
                case("#ggg", false),
            ],
        },
        Challenge {
            title: "Phone Number",
            description: "Match numbers written as XXX-XXX-XXXX",
            tier: Tier::Medium,
            cases: vec![
                case("123-456-7890", true),
                case("555-123-4567", true),
                case("1234-56-789", false),
                case("abc-def-ghij", false),
            ],
        },
        Challenge {
            title: "ISO Date",
            description: "Match dates written as YYYY-MM-DD",
            tier: Tier::Medium,
            cases: vec![
                case("2024-01-15", true),
                case("1999-12-31", true),
                case("2024/01/15", false),
                case("24-1-15", false),
            ],
        },
        Challenge {
            title: "IPv4 Address",
            description: "Match dotted quads with octets 0-255",
            tier: Tier::Hard,
            cases: vec![
                case("192.168.0.1", true),
                case("10.0.0.255", true),
                case("256.1.1.1", false),
                case("1.2.3", false),
            ],
        },
    ]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseResult {
    pub input: &'static str,
    pub expected: bool,
    pub actual: bool,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.expected == self.actual
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attempt {
    Solved { points: u32 },
    /// Solved before; no points awarded again.
    AlreadySolved,
    Failed { passed: usize, total: usize },
    /// The pattern did not compile; every case counts as no match.
    Rejected { error: String },
}

/// Compile `pattern`, reducing a syntax error to its one-line reason.
pub fn compile(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|e| {
        let text = e.to_string();
        let reason = text.lines().rev().map(str::trim).find(|l| !l.is_empty()).unwrap_or("invalid pattern");
        reason.trim_start_matches("error: ").to_string()
    })
}

/// Classify every case of `challenge`; no regex means nothing matches.
fn run(challenge: &Challenge, re: Option<&Regex>) -> Vec<CaseResult> {
    challenge.cases.iter()
        .map(|c| CaseResult {
            input: c.input,
            expected: c.should_match,
            actual: re.map_or(false, |re| re.is_match(c.input)),
        })
        .collect()
}

pub struct RegexTrainer {
    challenges: Vec<Challenge>,
    solved: Vec<bool>,
    current: usize,
    pub challenges_completed: u32,
    pub points: u32,
    pub last_results: Vec<CaseResult>,
}

impl RegexTrainer {
    pub fn new(challenges: Vec<Challenge>) -> Self {
        let solved = vec![false; challenges.len()];
        RegexTrainer {
            challenges,
            solved,
            current: 0,
            challenges_completed: 0,
            points: 0,
            last_results: vec![],
        }
    }

    pub fn current(&self) -> Option<&Challenge> {
        self.challenges.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn all_solved(&self) -> bool {
        self.solved.iter().all(|&s| s)
    }

    pub fn select(&mut self, index: usize) {
        if index < self.challenges.len() {
            self.current = index;
            self.last_results.clear();
        }
    }

    pub fn next_challenge(&mut self) {
        if !self.challenges.is_empty() {
            self.select((self.current + 1) % self.challenges.len());
        }
    }

    /// Check `pattern` against the current challenge. A full pass counts
    /// the challenge as completed, awards its tier points and moves on.
    pub fn submit(&mut self, pattern: &str) -> Attempt {
        let Some(challenge) = self.challenges.get(self.current) else {
            return Attempt::Failed { passed: 0, total: 0 };
        };
        let re = match compile(pattern) {
            Ok(re) => re,
            Err(error) => {
                debug!(pattern, %error, "pattern rejected");
                self.last_results = run(challenge, None);
                return Attempt::Rejected { error };
            }
        };
        let results = run(challenge, Some(&re));
        let passed = results.iter().filter(|r| r.passed()).count();
        let total = results.len();
        let tier = challenge.tier;
        self.last_results = results;

        if passed < total {
            return Attempt::Failed { passed, total };
        }
        if self.solved[self.current] {
            return Attempt::AlreadySolved;
        }

        self.solved[self.current] = true;
        self.challenges_completed += 1;
        self.points += tier.points();
        let points = tier.points();
        if self.current + 1 < self.challenges.len() {
            self.current += 1;
        }
        Attempt::Solved { points }
    }
}

impl Default for RegexTrainer {
    fn default() -> Self {
        RegexTrainer::new(builtin_challenges())
    }
}

//! Dice: uniform rolls revealed after a short settling animation.

mod tumble;

pub use tumble::{DiceTray, TUMBLE_DURATION};

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How long the flat roller shakes before showing the result.
pub const SETTLE_DURATION: Duration = Duration::from_millis(900);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DieType {
    pub const ALL: [DieType; 7] = [
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
        DieType::D12,
        DieType::D20,
        DieType::D100,
    ];

    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
            DieType::D100 => 100,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DieType::D4 => "d4",
            DieType::D6 => "d6",
            DieType::D8 => "d8",
            DieType::D10 => "d10",
            DieType::D12 => "d12",
            DieType::D20 => "d20",
            DieType::D100 => "d100",
        }
    }

    /// Uniform value in `1..=sides`.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(1..=self.sides())
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown die '{0}'")]
pub struct ParseDieError(pub String);

impl FromStr for DieType {
    type Err = ParseDieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DieType::ALL
            .into_iter()
            .find(|d| d.label() == wanted)
            .ok_or_else(|| ParseDieError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollResult {
    pub die: DieType,
    pub value: u32,
}

impl RollResult {
    pub fn label(&self) -> String {
        format!("Result: {}", self.value)
    }
}

#[derive(Debug, Clone, Copy)]
struct Settling {
    result: RollResult,
    started: Instant,
}

/// Flat dice roller.  One roll at a time; clicks during a roll are ignored.
pub struct DiceRoller<R = StdRng> {
    rng: R,
    settle: Duration,
    settling: Option<Settling>,
    last: Option<RollResult>,
}

impl DiceRoller<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> DiceRoller<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            settle: SETTLE_DURATION,
            settling: None,
            last: None,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Start a roll.  Returns false (and changes nothing) while one settles.
    pub fn roll(&mut self, die: DieType, now: Instant) -> bool {
        if self.settling.is_some() {
            return false;
        }
        let value = die.roll(&mut self.rng);
        self.settling = Some(Settling {
            result: RollResult { die, value },
            started: now,
        });
        true
    }

    pub fn is_rolling(&self) -> bool {
        self.settling.is_some()
    }

    /// Reveal the result once the settling time has passed.
    pub fn tick(&mut self, now: Instant) -> Option<RollResult> {
        let settling = self.settling?;
        if now.saturating_duration_since(settling.started) < self.settle {
            return None;
        }
        self.settling = None;
        self.last = Some(settling.result);
        self.last
    }

    /// Face to draw right now: a random one while shaking, else the last result.
    pub fn face(&mut self) -> Option<u32> {
        match self.settling {
            Some(s) => Some(s.result.die.roll(&mut self.rng)),
            None => self.last.map(|r| r.value),
        }
    }

    pub fn last_result(&self) -> Option<RollResult> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roller(seed: u64) -> DiceRoller<StdRng> {
        DiceRoller::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_parse_and_sides() {
        assert_eq!("d20".parse::<DieType>().unwrap().sides(), 20);
        assert_eq!(" D100 ".parse::<DieType>().unwrap(), DieType::D100);
        assert_eq!(
            "d7".parse::<DieType>(),
            Err(ParseDieError("d7".to_string()))
        );
        let sides: Vec<u32> = DieType::ALL.iter().map(|d| d.sides()).collect();
        assert_eq!(sides, vec![4, 6, 8, 10, 12, 20, 100]);
    }

    #[test]
    fn test_d20_always_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 21];
        for _ in 0..2000 {
            let v = DieType::D20.roll(&mut rng);
            assert!((1..=20).contains(&v));
            seen[v as usize] = true;
        }
        assert!(seen[1..].iter().all(|s| *s));
    }

    #[test]
    fn test_result_revealed_after_settling() {
        let mut roller = roller(1);
        let t0 = Instant::now();
        assert!(roller.roll(DieType::D20, t0));
        assert!(roller.is_rolling());
        assert_eq!(roller.tick(t0 + Duration::from_millis(899)), None);

        let result = roller.tick(t0 + SETTLE_DURATION).unwrap();
        assert_eq!(result.die, DieType::D20);
        assert!((1..=20).contains(&result.value));
        assert_eq!(result.label(), format!("Result: {}", result.value));
        assert!(!roller.is_rolling());
        assert_eq!(roller.last_result(), Some(result));
        assert_eq!(roller.tick(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_second_roll_while_settling_is_ignored() {
        let t0 = Instant::now();
        let mut single = roller(42);
        single.roll(DieType::D20, t0);
        let expected = single.tick(t0 + SETTLE_DURATION).unwrap();

        let mut roller = roller(42);
        assert!(roller.roll(DieType::D20, t0));
        assert!(!roller.roll(DieType::D6, t0 + Duration::from_millis(300)));
        assert!(!roller.roll(DieType::D20, t0 + Duration::from_millis(800)));
        // The reveal time and value belong to the first roll.
        let result = roller.tick(t0 + SETTLE_DURATION).unwrap();
        assert_eq!(result, expected);

        assert!(roller.roll(DieType::D6, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_faces_while_shaking() {
        let mut roller = roller(3).with_settle(Duration::from_millis(1400));
        let t0 = Instant::now();
        assert_eq!(roller.face(), None);
        roller.roll(DieType::D6, t0);
        for _ in 0..50 {
            let face = roller.face().unwrap();
            assert!((1..=6).contains(&face));
        }
        assert_eq!(roller.tick(t0 + Duration::from_millis(1000)), None);
        let result = roller.tick(t0 + Duration::from_millis(1400)).unwrap();
        assert_eq!(roller.face(), Some(result.value));
    }
}

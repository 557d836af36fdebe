//! 3D dice tray: each modelled die tumbles from its current orientation to a
//! random one and reveals its value when it lands.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::time::{Duration, Instant};

use glam::{DQuat, EulerRot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DieType, RollResult};

pub const TUMBLE_DURATION: Duration = Duration::from_millis(1400);

const AWAITING: &str = "Awaiting your roll.";
const LOADING: &str = "Loading dice...";
const MISSING_MODELS: &str = "Place GLB dice files into /dice to load models.";

#[derive(Debug, Clone, Copy)]
struct Tumble {
    started: Instant,
    from: DQuat,
    to: DQuat,
    result: RollResult,
}

#[derive(Debug, Clone, Copy, Default)]
struct DieModel {
    orientation: DQuat,
    tumble: Option<Tumble>,
}

/// Tray of modelled dice.  Dice only roll once their model has loaded.
pub struct DiceTray<R = StdRng> {
    rng: R,
    duration: Duration,
    models: BTreeMap<DieType, DieModel>,
    overlay: String,
    last: Option<RollResult>,
}

impl DiceTray<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> DiceTray<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            duration: TUMBLE_DURATION,
            models: BTreeMap::new(),
            overlay: LOADING.to_string(),
            last: None,
        }
    }

    /// Asset path of a die's model.  The d100 has none.
    pub fn model_path(die: DieType) -> Option<String> {
        match die {
            DieType::D100 => None,
            other => Some(format!("dice/{}.glb", other.label())),
        }
    }

    /// Record that a die's model finished loading.
    pub fn model_loaded(&mut self, die: DieType) -> bool {
        if Self::model_path(die).is_none() {
            return false;
        }
        self.models.entry(die).or_default();
        if self.last.is_none() {
            self.overlay = AWAITING.to_string();
        }
        true
    }

    pub fn model_failed(&mut self, die: DieType) {
        tracing::debug!(die = %die, "dice model unavailable");
        if self.models.is_empty() {
            self.overlay = MISSING_MODELS.to_string();
        }
    }

    pub fn has_model(&self, die: DieType) -> bool {
        self.models.contains_key(&die)
    }

    /// Start a tumble.  False when the die has no model or is still tumbling.
    pub fn roll(&mut self, die: DieType, now: Instant) -> bool {
        let Some(model) = self.models.get_mut(&die) else {
            return false;
        };
        if model.tumble.is_some() {
            return false;
        }

        let full_turns = PI * 4.0;
        let spin = DQuat::from_euler(
            EulerRot::XYZ,
            self.rng.gen_range(0.0..full_turns),
            self.rng.gen_range(0.0..full_turns),
            self.rng.gen_range(0.0..full_turns),
        );
        let value = die.roll(&mut self.rng);
        model.tumble = Some(Tumble {
            started: now,
            from: model.orientation,
            to: (spin * model.orientation).normalize(),
            result: RollResult { die, value },
        });
        true
    }

    pub fn is_tumbling(&self, die: DieType) -> bool {
        self.models
            .get(&die)
            .map(|m| m.tumble.is_some())
            .unwrap_or(false)
    }

    /// Advance every tumble.  Returns the dice that landed on this tick.
    pub fn tick(&mut self, now: Instant) -> Vec<RollResult> {
        let mut landed = Vec::new();
        for model in self.models.values_mut() {
            let Some(tumble) = model.tumble else {
                continue;
            };
            let elapsed = now.saturating_duration_since(tumble.started);
            let progress = if self.duration.is_zero() {
                1.0
            } else {
                (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
            };
            if progress >= 1.0 {
                model.orientation = tumble.to;
                model.tumble = None;
                landed.push(tumble.result);
            } else {
                model.orientation = tumble.from.slerp(tumble.to, progress);
            }
        }

        if let Some(last) = landed.last().copied() {
            self.overlay = format!("{} → {}", last.die.label().to_uppercase(), last.value);
            self.last = Some(last);
        }
        landed
    }

    pub fn orientation(&self, die: DieType) -> Option<DQuat> {
        self.models.get(&die).map(|m| m.orientation)
    }

    pub fn overlay(&self) -> &str {
        &self.overlay
    }

    pub fn last_result(&self) -> Option<RollResult> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &DQuat, b: &DQuat) -> bool {
        // q and -q are the same rotation.
        (a.dot(*b).abs() - 1.0).abs() < 1e-9
    }

    fn tray(seed: u64) -> DiceTray<StdRng> {
        let mut tray = DiceTray::new(StdRng::seed_from_u64(seed));
        for die in DieType::ALL {
            tray.model_loaded(die);
        }
        tray
    }

    #[test]
    fn test_random_spin_is_a_unit_rotation() {
        let start = DQuat::from_euler(EulerRot::XYZ, 0.3, -1.1, 2.0);
        let spin = DQuat::from_euler(EulerRot::XYZ, 7.0, 11.5, 0.4);
        let target = (spin * start).normalize();
        assert!((target.length() - 1.0).abs() < 1e-9);
        assert!(approx(&(DQuat::IDENTITY * start), &start));

        // Half turn around Z twice is a full turn.
        let half = DQuat::from_euler(EulerRot::XYZ, 0.0, 0.0, PI);
        assert!(approx(&(half * half), &DQuat::IDENTITY));
    }

    #[test]
    fn test_slerp_midpoint() {
        let a = DQuat::IDENTITY;
        let b = DQuat::from_euler(EulerRot::XYZ, 0.0, PI / 2.0, 0.0);
        assert!(approx(&a.slerp(b, 0.0), &a));
        assert!(approx(&a.slerp(b, 1.0), &b));
        let quarter = DQuat::from_euler(EulerRot::XYZ, 0.0, PI / 4.0, 0.0);
        assert!(approx(&a.slerp(b, 0.5), &quarter));
        assert!((a.slerp(b, 0.37).length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_model_paths() {
        assert_eq!(
            DiceTray::<StdRng>::model_path(DieType::D20).as_deref(),
            Some("dice/d20.glb")
        );
        assert_eq!(DiceTray::<StdRng>::model_path(DieType::D100), None);
    }

    #[test]
    fn test_no_model_no_roll() {
        let mut tray = DiceTray::new(StdRng::seed_from_u64(1));
        assert_eq!(tray.overlay(), LOADING);
        tray.model_failed(DieType::D6);
        assert_eq!(tray.overlay(), MISSING_MODELS);
        assert!(!tray.roll(DieType::D6, Instant::now()));

        assert!(!tray.model_loaded(DieType::D100));
        assert!(tray.model_loaded(DieType::D6));
        assert_eq!(tray.overlay(), AWAITING);
        assert!(tray.roll(DieType::D6, Instant::now()));
    }

    #[test]
    fn test_tumble_reveals_after_duration() {
        let mut tray = tray(9);
        let t0 = Instant::now();
        let start = tray.orientation(DieType::D20).unwrap();
        assert!(tray.roll(DieType::D20, t0));
        assert!(!tray.roll(DieType::D20, t0 + Duration::from_millis(700)));

        assert!(tray.tick(t0 + Duration::from_millis(700)).is_empty());
        let mid = tray.orientation(DieType::D20).unwrap();
        assert!((mid.length() - 1.0).abs() < 1e-9);
        assert!(!approx(&mid, &start));

        let landed = tray.tick(t0 + TUMBLE_DURATION);
        assert_eq!(landed.len(), 1);
        let result = landed[0];
        assert_eq!(result.die, DieType::D20);
        assert!((1..=20).contains(&result.value));
        assert_eq!(tray.overlay(), format!("D20 → {}", result.value));
        assert_eq!(tray.last_result(), Some(result));
        assert!(!tray.is_tumbling(DieType::D20));

        // The next tumble starts where this one ended.
        let end = tray.orientation(DieType::D20).unwrap();
        assert!(tray.roll(DieType::D20, t0 + Duration::from_secs(2)));
        tray.tick(t0 + Duration::from_secs(2));
        assert!(approx(&tray.orientation(DieType::D20).unwrap(), &end));
    }

    #[test]
    fn test_dice_tumble_independently() {
        let mut tray = tray(4);
        let t0 = Instant::now();
        assert!(tray.roll(DieType::D4, t0));
        assert!(tray.roll(DieType::D12, t0 + Duration::from_millis(500)));

        let first = tray.tick(t0 + TUMBLE_DURATION);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].die, DieType::D4);
        assert!(tray.is_tumbling(DieType::D12));

        let second = tray.tick(t0 + Duration::from_millis(1900));
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].die, DieType::D12);
        assert!((1..=12).contains(&second[0].value));
    }
}

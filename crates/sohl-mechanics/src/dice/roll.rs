//! A single evaluated-once dice expression.

use serde::{Deserialize, Serialize};

use super::RandomSource;
use crate::error::{MechError, MechResult};

/// Largest number of dice a single roll may contain.
pub const MAX_DICE: u32 = 1_000;

/// Largest die size a roll may use.
pub const MAX_SIDES: u32 = 10_000;

/// A dice expression `NdS±M` whose total is drawn once and then frozen.
///
/// Deserialization applies the same limits as [`Roll::new`] and rejects a
/// stored total that does not match the stored faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RollRepr")]
pub struct Roll {
    num_dice: u32,
    die: u32,
    static_modifier: i32,
    dice: Vec<u32>,
    total: Option<i32>,
}

impl Roll {
    /// Create an unevaluated roll of `num_dice` dice with `die` sides.
    pub fn new(num_dice: i32, die: i32, static_modifier: i32) -> MechResult<Self> {
        let (num_dice, die) = validate_spec(num_dice, die)?;
        Ok(Self {
            num_dice,
            die,
            static_modifier,
            dice: Vec::new(),
            total: None,
        })
    }

    /// A roll with no dice whose total is just `value` once evaluated.
    pub fn constant(value: i32) -> Self {
        Self {
            num_dice: 0,
            die: 1,
            static_modifier: value,
            dice: Vec::new(),
            total: None,
        }
    }

    /// Build an already-evaluated roll from known die faces.
    ///
    /// Used when the dice were rolled elsewhere (physical dice, a replay log).
    pub fn from_faces(die: i32, static_modifier: i32, faces: Vec<u32>) -> MechResult<Self> {
        let count = i32::try_from(faces.len())
            .map_err(|_| MechError::InvalidRollSpec(format!("too many dice: {}", faces.len())))?;
        let (num_dice, die) = validate_spec(count, die)?;
        if let Some(bad) = faces.iter().find(|f| **f == 0 || **f > die) {
            return Err(MechError::InvalidRollSpec(format!(
                "face {bad} is not on a d{die}"
            )));
        }
        let total = sum_faces(&faces, static_modifier);
        Ok(Self {
            num_dice,
            die,
            static_modifier,
            dice: faces,
            total: Some(total),
        })
    }

    /// Draw every die and freeze the total.
    ///
    /// Evaluating an already-evaluated roll returns the frozen total without
    /// drawing again; use [`Roll::reroll`] for a fresh result.
    pub fn evaluate<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> i32 {
        if let Some(total) = self.total {
            return total;
        }
        self.dice = (0..self.num_dice).map(|_| rng.draw(self.die)).collect();
        let total = sum_faces(&self.dice, self.static_modifier);
        self.total = Some(total);
        tracing::debug!(formula = %self.formula(), dice = ?self.dice, total, "roll evaluated");
        total
    }

    /// A new, evaluated roll with the same expression. `self` is untouched.
    pub fn reroll<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Self {
        let mut fresh = Self {
            dice: Vec::new(),
            total: None,
            ..self.clone()
        };
        fresh.evaluate(rng);
        fresh
    }

    /// The frozen total.
    pub fn total(&self) -> MechResult<i32> {
        self.total
            .ok_or_else(|| MechError::NotEvaluated(format!("roll {}", self.formula())))
    }

    /// Returns true once the roll has been evaluated.
    pub fn is_evaluated(&self) -> bool {
        self.total.is_some()
    }

    /// Number of dice rolled.
    pub fn num_dice(&self) -> u32 {
        self.num_dice
    }

    /// Sides on each die.
    pub fn die(&self) -> u32 {
        self.die
    }

    /// The flat amount added after summing the dice.
    pub fn static_modifier(&self) -> i32 {
        self.static_modifier
    }

    /// Individual die faces (empty until evaluated).
    pub fn dice(&self) -> &[u32] {
        &self.dice
    }

    /// Smallest total this expression can produce.
    pub fn min_total(&self) -> i32 {
        (self.num_dice as i32).saturating_add(self.static_modifier)
    }

    /// Largest total this expression can produce.
    pub fn max_total(&self) -> i32 {
        let max = i64::from(self.num_dice) * i64::from(self.die) + i64::from(self.static_modifier);
        i32::try_from(max).unwrap_or(i32::MAX)
    }

    /// The expression in `NdS±M` notation.
    pub fn formula(&self) -> String {
        if self.num_dice == 0 {
            return self.static_modifier.to_string();
        }
        match self.static_modifier {
            0 => format!("{}d{}", self.num_dice, self.die),
            m if m > 0 => format!("{}d{}+{m}", self.num_dice, self.die),
            m => format!("{}d{}{m}", self.num_dice, self.die),
        }
    }
}

impl std::fmt::Display for Roll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.total {
            Some(total) if self.num_dice == 0 => write!(f, "{} = {total}", self.formula()),
            Some(total) => {
                let faces: Vec<String> = self.dice.iter().map(u32::to_string).collect();
                write!(f, "{} [{}] = {total}", self.formula(), faces.join(", "))
            }
            None => write!(f, "{} (unrolled)", self.formula()),
        }
    }
}

#[derive(Deserialize)]
struct RollRepr {
    num_dice: u32,
    die: u32,
    static_modifier: i32,
    #[serde(default)]
    dice: Vec<u32>,
    #[serde(default)]
    total: Option<i32>,
}

impl TryFrom<RollRepr> for Roll {
    type Error = MechError;

    fn try_from(repr: RollRepr) -> MechResult<Self> {
        let num_dice = i32::try_from(repr.num_dice).map_err(|_| {
            MechError::InvalidRollSpec(format!("at most {MAX_DICE} dice per roll, got {}", repr.num_dice))
        })?;
        let die = i32::try_from(repr.die).map_err(|_| {
            MechError::InvalidRollSpec(format!("at most {MAX_SIDES} sides per die, got {}", repr.die))
        })?;
        let mut roll = Self::new(num_dice, die, repr.static_modifier)?;
        let Some(total) = repr.total else {
            if !repr.dice.is_empty() {
                return Err(MechError::InvalidRollSpec(
                    "faces recorded on an unevaluated roll".to_string(),
                ));
            }
            return Ok(roll);
        };
        if repr.dice.len() != roll.num_dice as usize {
            return Err(MechError::InvalidRollSpec(format!(
                "{} faces recorded for {} dice",
                repr.dice.len(),
                roll.num_dice
            )));
        }
        if let Some(bad) = repr.dice.iter().find(|f| **f == 0 || **f > roll.die) {
            return Err(MechError::InvalidRollSpec(format!(
                "face {bad} is not on a d{}",
                roll.die
            )));
        }
        let expected = sum_faces(&repr.dice, repr.static_modifier);
        if expected != total {
            return Err(MechError::InvalidRollSpec(format!(
                "recorded total {total} does not match faces ({expected})"
            )));
        }
        roll.dice = repr.dice;
        roll.total = Some(total);
        Ok(roll)
    }
}

fn validate_spec(num_dice: i32, die: i32) -> MechResult<(u32, u32)> {
    if num_dice < 0 {
        return Err(MechError::InvalidRollSpec(format!(
            "dice count must not be negative, got {num_dice}"
        )));
    }
    if die <= 0 {
        return Err(MechError::InvalidRollSpec(format!(
            "die size must be positive, got {die}"
        )));
    }
    let (num_dice, die) = (num_dice as u32, die as u32);
    if num_dice > MAX_DICE {
        return Err(MechError::InvalidRollSpec(format!(
            "at most {MAX_DICE} dice per roll, got {num_dice}"
        )));
    }
    if die > MAX_SIDES {
        return Err(MechError::InvalidRollSpec(format!(
            "at most {MAX_SIDES} sides per die, got {die}"
        )));
    }
    Ok((num_dice, die))
}

fn sum_faces(faces: &[u32], static_modifier: i32) -> i32 {
    let sum: u32 = faces.iter().sum();
    (sum as i32).saturating_add(static_modifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedSource;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn total_before_evaluation_fails() {
        let roll = Roll::new(3, 6, 2).unwrap();
        assert!(matches!(roll.total(), Err(MechError::NotEvaluated(_))));
        assert!(!roll.is_evaluated());
    }

    #[test]
    fn evaluate_sums_dice_and_modifier() {
        let mut roll = Roll::new(3, 6, 2).unwrap();
        let mut src = ScriptedSource::new([4, 1, 6]);
        assert_eq!(roll.evaluate(&mut src), 13);
        assert_eq!(roll.total().unwrap(), 13);
        assert_eq!(roll.dice(), &[4, 1, 6]);
    }

    #[test]
    fn evaluate_twice_is_frozen() {
        let mut roll = Roll::new(1, 20, 0).unwrap();
        let mut src = ScriptedSource::new([7, 19]);
        assert_eq!(roll.evaluate(&mut src), 7);
        assert_eq!(roll.evaluate(&mut src), 7);
        assert_eq!(src.draws(), 1);
        assert_eq!(roll.total().unwrap(), roll.total().unwrap());
    }

    #[test]
    fn reroll_leaves_original_untouched() {
        let mut roll = Roll::new(1, 20, 0).unwrap();
        let mut src = ScriptedSource::new([7, 19]);
        roll.evaluate(&mut src);
        let second = roll.reroll(&mut src);
        assert_eq!(roll.total().unwrap(), 7);
        assert_eq!(second.total().unwrap(), 19);
    }

    #[test]
    fn invalid_specs_rejected() {
        assert!(matches!(
            Roll::new(-1, 6, 0),
            Err(MechError::InvalidRollSpec(_))
        ));
        assert!(matches!(
            Roll::new(1, 0, 0),
            Err(MechError::InvalidRollSpec(_))
        ));
        assert!(matches!(
            Roll::new(1, -6, 0),
            Err(MechError::InvalidRollSpec(_))
        ));
        assert!(matches!(
            Roll::new(5_000, 6, 0),
            Err(MechError::InvalidRollSpec(_))
        ));
    }

    #[test]
    fn zero_dice_is_just_the_modifier() {
        let mut roll = Roll::new(0, 6, 4).unwrap();
        assert_eq!(roll.evaluate(&mut ScriptedSource::default()), 4);
        let mut constant = Roll::constant(-3);
        assert_eq!(constant.evaluate(&mut ScriptedSource::default()), -3);
    }

    #[test]
    fn from_faces_is_evaluated() {
        let roll = Roll::from_faces(100, 0, vec![6]).unwrap();
        assert!(roll.is_evaluated());
        assert_eq!(roll.total().unwrap(), 6);
        assert!(Roll::from_faces(6, 0, vec![7]).is_err());
        assert!(Roll::from_faces(6, 0, vec![0]).is_err());
    }

    #[test]
    fn formula_notation() {
        assert_eq!(Roll::new(3, 6, 2).unwrap().formula(), "3d6+2");
        assert_eq!(Roll::new(1, 100, 0).unwrap().formula(), "1d100");
        assert_eq!(Roll::new(2, 10, -1).unwrap().formula(), "2d10-1");
        assert_eq!(Roll::constant(5).formula(), "5");
    }

    #[test]
    fn display() {
        let mut roll = Roll::new(3, 6, 2).unwrap();
        insta::assert_snapshot!(roll.to_string(), @"3d6+2 (unrolled)");
        roll.evaluate(&mut ScriptedSource::new([4, 1, 6]));
        insta::assert_snapshot!(roll.to_string(), @"3d6+2 [4, 1, 6] = 13");
    }

    #[test]
    fn deserialize_round_trips() {
        let mut roll = Roll::new(3, 6, 2).unwrap();
        let unrolled: Roll = serde_json::from_str(&serde_json::to_string(&roll).unwrap()).unwrap();
        assert_eq!(unrolled, roll);
        roll.evaluate(&mut ScriptedSource::new([4, 1, 6]));
        let rolled: Roll = serde_json::from_str(&serde_json::to_string(&roll).unwrap()).unwrap();
        assert_eq!(rolled, roll);
        assert_eq!(rolled.total().unwrap(), 13);
    }

    #[test]
    fn deserialize_rejects_oversized_spec() {
        let json = r#"{"num_dice":100000,"die":100000,"static_modifier":0,"dice":[],"total":null}"#;
        assert!(serde_json::from_str::<Roll>(json).is_err());
        let json = r#"{"num_dice":1,"die":0,"static_modifier":0}"#;
        assert!(serde_json::from_str::<Roll>(json).is_err());
        let json = r#"{"num_dice":1,"die":4294967295,"static_modifier":0}"#;
        assert!(serde_json::from_str::<Roll>(json).is_err());
    }

    #[test]
    fn deserialize_rejects_inconsistent_faces() {
        let wrong_total = r#"{"num_dice":2,"die":6,"static_modifier":0,"dice":[3,4],"total":12}"#;
        assert!(serde_json::from_str::<Roll>(wrong_total).is_err());
        let wrong_count = r#"{"num_dice":2,"die":6,"static_modifier":0,"dice":[3],"total":3}"#;
        assert!(serde_json::from_str::<Roll>(wrong_count).is_err());
        let off_die = r#"{"num_dice":1,"die":6,"static_modifier":0,"dice":[7],"total":7}"#;
        assert!(serde_json::from_str::<Roll>(off_die).is_err());
        let faces_unrolled = r#"{"num_dice":1,"die":6,"static_modifier":0,"dice":[3],"total":null}"#;
        assert!(serde_json::from_str::<Roll>(faces_unrolled).is_err());
    }

    #[test]
    fn max_total_at_limits() {
        let roll = Roll::new(MAX_DICE as i32, MAX_SIDES as i32, i32::MAX).unwrap();
        assert_eq!(roll.max_total(), i32::MAX);
        assert_eq!(Roll::new(2, 6, 1).unwrap().max_total(), 13);
    }

    proptest! {
        #[test]
        fn total_within_bounds(num_dice in 0i32..40, die in 1i32..120, modifier in -50i32..50, seed in any::<u64>()) {
            let mut roll = Roll::new(num_dice, die, modifier).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let total = roll.evaluate(&mut rng);
            prop_assert!(total >= num_dice + modifier);
            prop_assert!(total <= num_dice * die + modifier);
            prop_assert_eq!(total, roll.min_total().max(total).min(roll.max_total()));
        }
    }
}

//! Dice formula parsing.
//!
//! Accepts `NdS`, `dS`, `NdS+M`, `NdS-M` and plain integers. Whitespace and
//! case are ignored.

use std::str::FromStr;

use super::Roll;
use crate::error::{MechError, MechResult};

/// Parse a dice formula into an unevaluated [`Roll`].
pub fn parse(input: &str) -> MechResult<Roll> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    if cleaned.is_empty() {
        return Err(MechError::InvalidRollSpec("empty dice formula".to_string()));
    }

    let Some(d_pos) = cleaned.find('d') else {
        let value = parse_int(&cleaned, "constant")?;
        return Ok(Roll::constant(value));
    };

    let count_str = &cleaned[..d_pos];
    let num_dice = if count_str.is_empty() {
        1
    } else {
        parse_int(count_str, "dice count")?
    };

    let rest = &cleaned[d_pos + 1..];
    let split = rest
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i);
    let (die_str, modifier) = match split {
        Some(i) => (&rest[..i], parse_int(&rest[i..], "modifier")?),
        None => (rest, 0),
    };
    let die = parse_int(die_str, "die size")?;

    Roll::new(num_dice, die, modifier)
}

fn parse_int(s: &str, what: &str) -> MechResult<i32> {
    s.parse::<i32>()
        .map_err(|_| MechError::InvalidRollSpec(format!("invalid {what}: '{s}'")))
}

impl FromStr for Roll {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

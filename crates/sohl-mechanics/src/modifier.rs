//! Situational modifiers and modifier stacks.
//!
//! A [`ModifierStack`] keeps its entries in insertion order for display and
//! audit. Its arithmetic is order-independent: the effective value is the sum
//! of the enabled entries. Disabled entries stay in the stack and contribute 0.

use serde::{Deserialize, Serialize};

/// A single named adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Display name (e.g., "Cover", "Wounded").
    pub name: String,
    /// Optional short form used in compact output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbrev: Option<String>,
    /// The signed adjustment.
    pub value: i32,
    /// Whether the adjustment currently applies.
    pub enabled: bool,
}

impl Modifier {
    /// Create an enabled modifier.
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            abbrev: None,
            value,
            enabled: true,
        }
    }

    /// Set the short form.
    pub fn with_abbrev(mut self, abbrev: impl Into<String>) -> Self {
        self.abbrev = Some(abbrev.into());
        self
    }

    /// Mark the modifier as disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The value this entry contributes to a stack.
    pub fn contribution(&self) -> i32 {
        if self.enabled { self.value } else { 0 }
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = self.abbrev.as_deref().unwrap_or(&self.name);
        write!(f, "{label} {:+}", self.value)?;
        if !self.enabled {
            write!(f, " (off)")?;
        }
        Ok(())
    }
}

/// An ordered stack of modifiers reducible to one effective value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModifierStack {
    entries: Vec<Modifier>,
}

impl ModifierStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a modifier, builder style.
    pub fn with(mut self, modifier: Modifier) -> Self {
        self.entries.push(modifier);
        self
    }

    /// Append a modifier.
    pub fn push(&mut self, modifier: Modifier) {
        self.entries.push(modifier);
    }

    /// Sum of the enabled entries.
    pub fn effective(&self) -> i32 {
        self.entries
            .iter()
            .fold(0i32, |acc, m| acc.saturating_add(m.contribution()))
    }

    /// Enable or disable the first entry with the given name.
    ///
    /// Returns false if no entry has that name.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|m| m.name == name) {
            Some(m) => {
                m.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Flip the first entry with the given name. Returns its new state.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let m = self.entries.iter_mut().find(|m| m.name == name)?;
        m.enabled = !m.enabled;
        Some(m.enabled)
    }

    /// Find the first entry with the given name.
    pub fn get(&self, name: &str) -> Option<&Modifier> {
        self.entries.iter().find(|m| m.name == name)
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Modifier> {
        self.entries.iter()
    }

    /// Number of entries, enabled or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the stack has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Modifier> for ModifierStack {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ModifierStack {
    type Item = &'a Modifier;
    type IntoIter = std::slice::Iter<'a, Modifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Display for ModifierStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "none");
        }
        let parts: Vec<String> = self.entries.iter().map(Modifier::to_string).collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// The physical character of an impact, selecting which resistance applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactAspect {
    /// Crushing force (clubs, falls).
    #[default]
    Blunt,
    /// Cutting edges (swords, axes).
    Edged,
    /// Points (spears, arrows).
    Piercing,
    /// Heat and flame.
    Fire,
    /// An aspect defined by a rule variant.
    Custom(String),
}

impl ImpactAspect {
    /// Parse an aspect name. Unknown names become [`ImpactAspect::Custom`].
    pub fn from_str_tag(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "" => None,
            "blunt" | "b" => Some(Self::Blunt),
            "edged" | "edge" | "e" => Some(Self::Edged),
            "piercing" | "point" | "p" => Some(Self::Piercing),
            "fire" | "f" => Some(Self::Fire),
            other => Some(Self::Custom(other.to_string())),
        }
    }
}

impl std::fmt::Display for ImpactAspect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blunt => write!(f, "blunt"),
            Self::Edged => write!(f, "edged"),
            Self::Piercing => write!(f, "piercing"),
            Self::Fire => write!(f, "fire"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// A modifier stack tagged with the aspect of the impact it adjusts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactModifier {
    /// Which resistance the impact is measured against.
    pub aspect: ImpactAspect,
    /// The adjustments to the impact roll.
    pub stack: ModifierStack,
}

impl ImpactModifier {
    /// Create an impact modifier with an empty stack.
    pub fn new(aspect: ImpactAspect) -> Self {
        Self {
            aspect,
            stack: ModifierStack::new(),
        }
    }

    /// Append a modifier, builder style.
    pub fn with(mut self, modifier: Modifier) -> Self {
        self.stack.push(modifier);
        self
    }

    /// Sum of the enabled entries.
    pub fn effective(&self) -> i32 {
        self.stack.effective()
    }
}

//! Pre-configured descriptors for the SoHL variants.
//!
//! The variants share the resolution algorithm and differ only in descriptor
//! data: identity, target clamping and chat templates.

use crate::resolution::ThresholdConfig;
use crate::system::SystemDescriptor;

/// Core Song of Heroic Lands rules.
///
/// d100 roll-under, critical success at a fifth of the target, targets never
/// below 1.
pub fn sohl() -> SystemDescriptor {
    SystemDescriptor::new("sohl", "Song of Heroic Lands")
}

/// Legendary variant.
///
/// Targets are held between 5 and 95 so that no test is automatic.
pub fn legendary() -> SystemDescriptor {
    SystemDescriptor::new("legendary", "SoHL: Legendary")
        .with_thresholds(ThresholdConfig::default().with_floor(5).with_ceiling(95))
        .with_chat_template("legendary-test-card")
}

/// Misty Isle variant.
pub fn misty_isle() -> SystemDescriptor {
    SystemDescriptor::new("misty_isle", "SoHL: Misty Isle").with_chat_template("mistyisle-test-card")
}

/// Every preset, core first.
pub fn all() -> Vec<SystemDescriptor> {
    vec![sohl(), legendary(), misty_isle()]
}

/// Look up a preset by id (case-insensitive, `-` and `_` interchangeable).
pub fn by_id(id: &str) -> Option<SystemDescriptor> {
    let wanted = id.trim().to_lowercase().replace('-', "_");
    all().into_iter().find(|s| s.id == wanted)
}

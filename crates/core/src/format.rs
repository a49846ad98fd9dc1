//! Plain-text rendering of occupancy state.

use chrono::Duration;

use crate::occupancy::OwnerGroup;
use crate::registry::PlayerRegistry;
use crate::types::Building;

/// Format a remaining duration as `H:MM`, clamping negatives to `0:00`.
pub fn format_remaining(left: Duration) -> String {
    let secs = left.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{hours}:{minutes:02}")
}

/// Render one owner line: `2x Alice (alice) 1:59 0:30`.
///
/// The identity is shown without its leading `@`.
pub fn render_group(group: &OwnerGroup, registry: &PlayerRegistry) -> String {
    let mut line = format!("{}x {}", group.count, group.owner);

    if let Some(identity) = registry.identity_of(&group.owner) {
        line.push_str(&format!(" ({})", identity.trim_start_matches('@')));
    }

    for left in &group.remaining {
        line.push(' ');
        line.push_str(&format_remaining(*left));
    }

    line
}

/// Render a whole building block: header line plus one line per owner.
pub fn render_building(
    building: Building,
    groups: &[OwnerGroup],
    registry: &PlayerRegistry,
) -> String {
    let mut out = format!("Building {building}:");

    if groups.is_empty() {
        out.push_str(" empty");
        return out;
    }

    for group in groups {
        out.push('\n');
        out.push_str(&render_group(group, registry));
    }

    out
}

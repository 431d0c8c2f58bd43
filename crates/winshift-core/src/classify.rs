use crate::config::Config;
use crate::topology::MonitorGroup;
use crate::window::WindowInfo;

/// Pattern that matches every window.
pub const WILDCARD: &str = "*";

/// Where a window should go, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub group: MonitorGroup,
    /// The pattern that matched, or `None` when the window fell through
    /// to the default group.
    pub pattern: Option<String>,
}

/// Assigns a window to its target monitor group.
///
/// Secondary patterns (`monitor_1_apps`) are checked first, then primary
/// patterns (`monitor_2_apps`). A window that matches neither lands on
/// the primary monitor, so every window gets exactly one group.
pub fn classify(window: &WindowInfo, config: &Config) -> Classification {
    let groups = [
        (MonitorGroup::Secondary, &config.monitor_1_apps),
        (MonitorGroup::Primary, &config.monitor_2_apps),
    ];

    for (group, patterns) in groups {
        if let Some(pattern) = first_match(window, patterns) {
            return Classification {
                group,
                pattern: Some(pattern.clone()),
            };
        }
    }

    Classification {
        group: MonitorGroup::Primary,
        pattern: None,
    }
}

fn first_match<'a>(window: &WindowInfo, patterns: &'a [String]) -> Option<&'a String> {
    patterns
        .iter()
        .find(|p| p.as_str() == WILDCARD || window.mentions(p))
}

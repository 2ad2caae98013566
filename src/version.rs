//! Copyright © 2025 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Ji.
//! The Ji project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Ji Version Module
//!
//! Dotted-numeric version string comparison and the install/upgrade
//! eligibility rules built on it.
//!
//! Versions compare segment by segment, split on `.`, each segment read as
//! an integer. Non-numeric segments such as `"beta"` or `"#abc"` read as 0.
//! A missing trailing segment counts as 0, so `"1.2"` equals `"1.2.0"`.
//! When the longer side has a non-zero tail it wins the greater-than
//! direction: `"1.2.1" > "1.2"`.

use crate::metadata::JiPlugin;

/// True if `first` is numerically greater than or equal to `second`.
pub fn is_version_greater_than_or_equal(first: &str, second: &str) -> bool {
    if first == second {
        return true;
    }
    parse_and_check_version(first, second, true)
}

/// True if `first` is numerically less than or equal to `second`.
pub fn is_version_less_than_or_equal(first: &str, second: &str) -> bool {
    if first == second {
        return true;
    }
    parse_and_check_version(first, second, false)
}

/// Walks both segment arrays in lockstep and decides at the first index
/// where the integer values differ. Exhausted arrays are padded with zeros.
fn parse_and_check_version(first: &str, second: &str, checking_greater_or_equal: bool) -> bool {
    let first_array: Vec<&str> = first.split('.').collect();
    let second_array: Vec<&str> = second.split('.').collect();

    for i in 0..first_array.len() {
        let first_num = atoi(first_array[i]);
        let second_num = atoi(second_array[i]);
        if first_num != second_num {
            return if checking_greater_or_equal {
                first_num >= second_num
            } else {
                first_num <= second_num
            };
        }
        // The second array is exhausted; the remaining tail of the first
        // decides whether this is an equality or a longer-side win.
        if second_array.len() - 1 == i && first_array.len() > second_array.len() {
            return all_zeros(&first_array[i + 1..]) || checking_greater_or_equal;
        }
    }

    if first_array.len() == second_array.len() {
        return true;
    }

    all_zeros(&second_array[first_array.len()..]) || !checking_greater_or_equal
}

fn all_zeros(segments: &[&str]) -> bool {
    segments.iter().all(|segment| atoi(segment) == 0)
}

/// Lenient integer parse: anything non-numeric reads as 0.
fn atoi(segment: &str) -> i64 {
    segment.trim().parse::<i64>().unwrap_or(0)
}

/// Determines whether installing `next` over `prev` is a reinstall of the
/// same version or a downgrade to an earlier one.
pub fn is_equal_or_downgrade(prev: &JiPlugin, next: &JiPlugin) -> bool {
    if prev.name != next.name {
        return false;
    }
    match (&prev.version, &next.version) {
        // prevent the next version from upgrading to an unset version
        (_, None) => true,
        // allow an unset version to go to anything else
        (None, Some(_)) => false,
        (Some(prev_version), Some(next_version)) => {
            is_version_less_than_or_equal(next_version, prev_version)
        }
    }
}

/// Upgrade eligibility: `next` is rejected when it is an equal-or-lower
/// version than `prev`, unless both plugins are development versions, in
/// which case version ordering is not enforced at all.
pub fn is_upgrade_rejected(prev: &JiPlugin, next: &JiPlugin) -> bool {
    if prev.development_version && next.development_version {
        return false;
    }
    is_equal_or_downgrade(prev, next)
}

/// Determines if a plugin is upgradable from `prev` based on any minimum
/// upgradable version declared by `next`.
pub fn is_min_upgradable_version_met(prev: &JiPlugin, next: &JiPlugin) -> bool {
    if prev.name != next.name {
        return false;
    }

    let min_upgradable = non_empty(next.min_upgradable_version.as_deref());
    let prev_version = non_empty(prev.version.as_deref());

    match (min_upgradable, prev_version) {
        (None, _) | (_, None) => true,
        (Some(min), Some(prev)) => is_version_greater_than_or_equal(prev, min),
    }
}

/// Determines if the plugin's min and max system version configuration is
/// valid for the given system version.
pub fn is_plugin_valid_for_system_version(plugin: &JiPlugin, system_version: &str) -> bool {
    let min_version = non_empty(plugin.min_system_version.as_deref());
    let max_version = non_empty(plugin.max_system_version.as_deref());

    // if neither is set then don't bother checking
    if min_version.is_none() && max_version.is_none() {
        return true;
    }

    let mut valid = true;
    if let Some(min) = min_version {
        valid = is_version_less_than_or_equal(min, system_version);
    }

    // if min version was valid check max
    if valid {
        if let Some(max) = max_version {
            valid = is_version_greater_than_or_equal(max, system_version);
        }
    }

    valid
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

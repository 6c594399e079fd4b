// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ordering for the loosely formatted version strings used by the archive,
//! such as `7195.81.3`, `10.4.11.x86` or `WWDC2004DP`.

use std::cmp::Ordering;

/// Strip trailing `.0` components while at least one component remains.
#[must_use]
pub fn trim_zeros(version: &str) -> &str {
    let mut version = version;
    while let Some(rest) = version.strip_suffix(".0") {
        if rest.is_empty() {
            break;
        }
        version = rest;
    }
    version
}

/// Compare two versions component by component.
///
/// Trailing zero components are ignored, numeric components compare by value
/// and sort before non-numeric ones, and a strict prefix sorts first.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = trim_zeros(a).split('.');
    let mut right = trim_zeros(b).split('.');

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = compare_part(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_part(l: &str, r: &str) -> Ordering {
    match (l.parse::<u64>(), r.parse::<u64>()) {
        (Ok(l), Ok(r)) => l.cmp(&r),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => l.cmp(r),
    }
}

/// Sort ascending and drop versions that compare equal.
pub fn sort_dedup(versions: &mut Vec<String>) {
    versions.sort_by(|a, b| compare(a, b));
    versions.dedup_by(|a, b| compare(a, b) == Ordering::Equal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_zeros() {
        assert_eq!(trim_zeros("10.12.0"), "10.12");
        assert_eq!(trim_zeros("8.0.0"), "8");
        assert_eq!(trim_zeros("0"), "0");
        assert_eq!(trim_zeros("10.10"), "10.10");
        assert_eq!(trim_zeros("3.1b"), "3.1b");
    }

    #[test]
    fn test_numeric_components_compare_by_value() {
        assert_eq!(compare("10.12", "10.11.6"), Ordering::Greater);
        assert_eq!(compare("10.9", "10.10"), Ordering::Less);
        assert_eq!(compare("7195.81.3", "7195.101.1"), Ordering::Less);
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(compare("10.9", "10.9.0"), Ordering::Equal);
        assert_eq!(compare("8", "8.0"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_and_text_components() {
        assert_eq!(compare("10.4.11", "10.4.11.x86"), Ordering::Less);
        assert_eq!(compare("10.4.11.ppc", "10.4.11.x86"), Ordering::Less);
        assert_eq!(compare("3.1", "3.1b"), Ordering::Less);
        assert_eq!(compare("3", "SDKb8"), Ordering::Less);
    }

    #[test]
    fn test_sort_dedup() {
        let mut versions = vec![
            "10.10".to_string(),
            "10.9".to_string(),
            "10.9.0".to_string(),
            "10.11.6".to_string(),
            "10.2".to_string(),
        ];
        sort_dedup(&mut versions);
        assert_eq!(versions, vec!["10.2", "10.9", "10.10", "10.11.6"]);
    }
}

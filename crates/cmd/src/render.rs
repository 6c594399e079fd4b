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

use std::fmt::Write;

use aos_archive::{COMING_SOON, Project};

const UPDATED_MARKER: &str = "\u{2022} ";
const NOT_UPDATED_MARKER: &str = "  ";
const COLUMN_GAP: &str = "  ";

/// Aligned table of release projects.
///
/// Each line is `<marker><name>  <version>  <coming soon>`; `quiet` keeps
/// only the name and version columns.
pub fn release_table(projects: &[Project], quiet: bool) -> String {
    let name_width = projects.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let version_width = projects.iter().map(|p| p.version.len()).max().unwrap_or(0);

    let mut out = String::new();
    for project in projects {
        let mut line = String::new();
        if !quiet {
            line.push_str(if project.updated {
                UPDATED_MARKER
            } else {
                NOT_UPDATED_MARKER
            });
        }
        let _ = write!(
            line,
            "{:<name_width$}{COLUMN_GAP}{:<version_width$}",
            project.name, project.version
        );
        if !quiet && project.coming_soon {
            let _ = write!(line, "{COLUMN_GAP}{COMING_SOON}");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projects() -> Vec<Project> {
        vec![
            Project {
                updated: true,
                ..Project::new("xnu", "3789.1.32")
            },
            Project::new("libdispatch", "703.1.4"),
            Project {
                coming_soon: true,
                ..Project::new("dyld", "421.1")
            },
        ]
    }

    #[test]
    fn test_release_table() {
        let table = release_table(&projects(), false);
        assert_eq!(
            table,
            "\u{2022} xnu          3789.1.32\n  libdispatch  703.1.4\n  dyld         421.1      (coming soon!)\n"
        );
    }

    #[test]
    fn test_release_table_quiet() {
        let table = release_table(&projects(), true);
        assert_eq!(
            table,
            "xnu          3789.1.32\nlibdispatch  703.1.4\ndyld         421.1\n"
        );
    }

    #[test]
    fn test_empty_release() {
        assert_eq!(release_table(&[], false), "");
    }
}

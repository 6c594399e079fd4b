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

use std::{collections::HashMap, sync::Mutex};

use aos_downloader::ProgressSink;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{msg:30!} [{bar:40.cyan/blue}] {bytes}/{total_bytes} @ {bytes_per_sec} {eta}";
const SPINNER_TEMPLATE: &str = "{msg:30!} {spinner:.cyan} {bytes} @ {bytes_per_sec}";

/// Draws one progress bar per resource being downloaded.
#[derive(Default)]
pub struct IndicatifProgress {
    multi: MultiProgress,
    bars:  Mutex<HashMap<String, ProgressBar>>,
}

impl IndicatifProgress {
    pub fn new() -> Self { Self::default() }

    #[cfg(test)]
    fn bar(&self, resource: &str) -> Option<ProgressBar> {
        self.bars.lock().ok()?.get(resource).cloned()
    }
}

fn make_bar(total: u64) -> ProgressBar {
    if total == 0 {
        let style = ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        ProgressBar::new_spinner().with_style(style)
    } else {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━━╌");
        ProgressBar::new(total).with_style(style)
    }
}

impl ProgressSink for IndicatifProgress {
    fn start(&self, resource: &str, total: u64) {
        let bar = self.multi.add(make_bar(total));
        bar.set_message(resource.to_string());
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(resource.to_string(), bar);
        }
    }

    /// Totals from concurrent chunks can arrive out of order; the bar only
    /// moves forward.
    fn advance(&self, resource: &str, downloaded: u64) {
        let Ok(bars) = self.bars.lock() else { return };
        if let Some(bar) = bars.get(resource) {
            if downloaded > bar.position() {
                bar.set_position(downloaded);
            }
        }
    }

    fn finish(&self, resource: &str, success: bool) {
        let bar = self
            .bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(resource));
        let Some(bar) = bar else { return };

        if success {
            bar.finish();
        } else {
            bar.abandon_with_message(format!("{resource} (failed)"));
        }
    }
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn test_bar_lifecycle() {
        let progress = IndicatifProgress::new();
        progress.multi.set_draw_target(ProgressDrawTarget::hidden());

        progress.start("xnu.tar.gz", 100);
        progress.advance("xnu.tar.gz", 40);
        assert_eq!(progress.bar("xnu.tar.gz").unwrap().position(), 40);

        progress.finish("xnu.tar.gz", true);
        assert!(progress.bar("xnu.tar.gz").is_none());
    }

    #[test]
    fn test_stale_total_does_not_move_bar_back() {
        let progress = IndicatifProgress::new();
        progress.multi.set_draw_target(ProgressDrawTarget::hidden());

        progress.start("dyld.tar.gz", 100);
        progress.advance("dyld.tar.gz", 60);
        progress.advance("dyld.tar.gz", 45);
        assert_eq!(progress.bar("dyld.tar.gz").unwrap().position(), 60);
        progress.advance("dyld.tar.gz", 70);
        assert_eq!(progress.bar("dyld.tar.gz").unwrap().position(), 70);
    }

    #[test]
    fn test_unknown_resource_is_ignored() {
        let progress = IndicatifProgress::new();
        progress.multi.set_draw_target(ProgressDrawTarget::hidden());
        progress.advance("missing", 10);
        progress.finish("missing", false);
    }
}

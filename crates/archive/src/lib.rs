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

mod cache;
mod catalog;
mod client;
mod error;
mod parse;
mod project;
mod resource;
pub mod version;

pub use cache::{PageCache, PageKey};
pub use catalog::Catalog;
pub use client::{IndexClient, extract_body};
pub use error::ArchiveError;
pub use parse::{list_projects, list_release, list_versions};
pub use project::{COMING_SOON, Project};
pub use resource::{ArchiveSite, DEFAULT_BASE_URL, Platform, ResourceType};

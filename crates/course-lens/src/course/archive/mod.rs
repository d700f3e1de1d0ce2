//! Course export archive ingestion.
//!
//! The reader opens the zip container, loads the well-known settings members,
//! and buckets wiki pages, assignments, and assessments by publish state into a
//! single [`CourseRecord`]. Only an unopenable archive is fatal; every per-entry
//! failure is logged and skipped.

pub(crate) mod markup;
pub mod normalizer;
pub mod publish;
pub mod settings;

use crate::course::domain::{AssignmentRecord, CourseRecord, SettingsBlobs};
use normalizer::{strip_html, truncate_chars};
use publish::{is_published_state, resolve_published, PublishResolution};
use settings::{assignment_name_from_file, AssignmentSettings};
use std::collections::HashSet;
use std::io::{Cursor, Read};
use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

pub const COURSE_SETTINGS_PATH: &str = "course_settings/course_settings.xml";
pub const ASSIGNMENT_GROUPS_PATH: &str = "course_settings/assignment_groups.xml";
pub const MODULE_META_PATH: &str = "course_settings/module_meta.xml";
pub const RUBRICS_PATH: &str = "course_settings/rubrics.xml";
pub const MANIFEST_PATH: &str = "imsmanifest.xml";

const WIKI_PREFIX: &str = "wiki_content/";
const WEB_RESOURCES_PREFIX: &str = "web_resources/";
const PAGE_SUFFIX: &str = ".html";
const ASSESSMENT_MARKER: &str = "assessment_qti.xml";

/// Page slug fragments marking tutorial, navigation, proctoring, and support
/// pages. Such pages are listed by title but never content-analyzed.
pub const MEDIA_KEYWORDS: &[&str] = &[
    "video-",
    "podcast-",
    "webpage-",
    "netflix-",
    "movie-",
    "trigger-warning",
    "youtube",
    "playposit",
    "voicethread",
    "zoom-",
    "canvas-student",
    "canvas-overview",
    "recommended-browsers",
    "technical-",
    "chrome-",
    "navigate-canvas",
    "honorlock",
    "respondus",
    "turnitin",
    "how-to-",
    "update-your",
    "global-navigation",
    "accessibility-",
    "fiu-resources",
    "note-for-support",
    "faculty-guided",
    "proctored",
    "sample-rubric",
    "spot-survey",
    "working-in-teams",
    "getting-started-with-group",
    "embedding-",
    "directions-on-submitting",
    "how-do-i-",
    "student-guide",
    "canvas-student-guide",
    "submitting-an-assignment",
    "submitting-a-",
    "recording-a-",
    "uploading-a-",
    "downloading-",
    "installing-",
];

/// Fatal archive failures. Everything else degrades to an emptier record.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("course export is not a readable zip archive: {0}")]
    Open(#[from] ZipError),
}

#[derive(Debug, thiserror::Error)]
enum EntryError {
    #[error("archive member unavailable: {0}")]
    Member(#[from] ZipError),
    #[error("archive member unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("path has no parent folder")]
    MissingFolder,
}

/// Limits and keyword tables applied while scanning an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePolicy {
    pub media_keywords: &'static [&'static str],
    pub max_assessments: usize,
    pub assessment_char_limit: usize,
}

impl Default for ArchivePolicy {
    fn default() -> Self {
        Self {
            media_keywords: MEDIA_KEYWORDS,
            max_assessments: 15,
            assessment_char_limit: 2000,
        }
    }
}

impl ArchivePolicy {
    pub fn is_media_page(&self, page_name: &str) -> bool {
        let lowered = page_name.to_lowercase();
        self.media_keywords
            .iter()
            .any(|keyword| lowered.contains(keyword))
    }
}

pub struct ArchiveReader<'p> {
    policy: &'p ArchivePolicy,
}

impl<'p> ArchiveReader<'p> {
    pub fn new(policy: &'p ArchivePolicy) -> Self {
        Self { policy }
    }

    /// Builds the course record for one export.
    ///
    /// `syllabus` is caller-supplied text; the archive is never searched for
    /// one.
    pub fn read(
        &self,
        file_name: &str,
        bytes: &[u8],
        syllabus: &str,
    ) -> Result<CourseRecord, ArchiveError> {
        let mut members = Members::open(bytes)?;
        info!(
            file_name,
            members = members.names.len(),
            "opened course archive"
        );

        let settings = SettingsBlobs {
            course_settings: members.optional_text(COURSE_SETTINGS_PATH),
            assignment_groups: members.optional_text(ASSIGNMENT_GROUPS_PATH),
            module_meta: members.optional_text(MODULE_META_PATH),
            rubrics: members.optional_text(RUBRICS_PATH),
            manifest: members.optional_text(MANIFEST_PATH),
        };

        let syllabus_text = syllabus.trim().to_string();
        if syllabus_text.is_empty() {
            info!("no syllabus supplied");
        } else {
            info!(chars = syllabus_text.chars().count(), "syllabus supplied");
        }

        let resolution = resolve_published(&settings.module_meta, &settings.manifest);
        if !resolution.is_state_known() {
            debug!("module metadata absent or unparseable, treating all pages as published");
        }

        let mut record = CourseRecord {
            file_name: file_name.to_string(),
            member_count: members.names.len(),
            settings,
            syllabus_text,
            ..CourseRecord::default()
        };

        self.scan_pages(&mut members, &resolution, &mut record);
        self.scan_assignments(&mut members, &mut record);
        self.scan_assessments(&mut members, &mut record);

        let stats = &record.publish_stats;
        info!(
            pages_published = stats.pages_published,
            pages_unpublished = stats.pages_unpublished,
            assignments_published = stats.assignments_published,
            assignments_unpublished = stats.assignments_unpublished,
            assessments_published = stats.assessments_published,
            assessments_unpublished = stats.assessments_unpublished,
            "archive scan complete"
        );

        Ok(record)
    }

    fn scan_pages(
        &self,
        members: &mut Members,
        resolution: &PublishResolution,
        record: &mut CourseRecord,
    ) {
        let pages: Vec<String> = members
            .names
            .iter()
            .filter(|name| name.starts_with(WIKI_PREFIX) && name.ends_with(PAGE_SUFFIX))
            .cloned()
            .collect();

        for path in pages {
            let page_name = path
                .strip_prefix(WIKI_PREFIX)
                .unwrap_or(&path)
                .replace(PAGE_SUFFIX, "");

            if !resolution.is_href_published(&path) {
                record.publish_stats.pages_unpublished += 1;
                record.unpublished_page_titles.push(page_name);
                continue;
            }

            record.publish_stats.pages_published += 1;
            if self.policy.is_media_page(&page_name) {
                record.media_page_titles.push(page_name);
                continue;
            }

            match members.text(&path) {
                Ok(raw) => {
                    let clean = strip_html(&raw);
                    if !clean.is_empty() {
                        record.published_pages.insert(page_name, clean);
                    }
                }
                Err(err) => warn!(path = %path, error = %err, "skipping unreadable page"),
            }
        }
    }

    fn scan_assignments(&self, members: &mut Members, record: &mut CourseRecord) {
        let candidates: Vec<String> = members
            .names
            .iter()
            .filter(|name| is_assignment_candidate(name))
            .cloned()
            .collect();

        for path in candidates {
            if let Err(err) = read_assignment(members, &path, record) {
                warn!(path = %path, error = %err, "skipping unreadable assignment");
            }
        }
    }

    fn scan_assessments(&self, members: &mut Members, record: &mut CourseRecord) {
        let assessments: Vec<String> = members
            .names
            .iter()
            .filter(|name| name.contains(ASSESSMENT_MARKER))
            .take(self.policy.max_assessments)
            .cloned()
            .collect();

        for path in assessments {
            if let Err(err) = self.read_assessment(members, &path, record) {
                warn!(path = %path, error = %err, "skipping unreadable assessment");
            }
        }
    }

    fn read_assessment(
        &self,
        members: &mut Members,
        path: &str,
        record: &mut CourseRecord,
    ) -> Result<(), EntryError> {
        let folder_id = first_segment(path);
        let meta_path = format!("{folder_id}/assessment_meta.xml");
        let published = if members.contains(&meta_path) {
            let xml = members.text(&meta_path)?;
            markup::tag_raw(&xml, "workflow_state")
                .map(is_published_state)
                .unwrap_or(true)
        } else {
            true
        };

        if !published {
            record.publish_stats.assessments_unpublished += 1;
            return Ok(());
        }

        let clean = strip_html(&members.text(path)?);
        let segments: Vec<&str> = path.split('/').collect();
        let name = segments
            .len()
            .checked_sub(2)
            .map(|index| segments[index])
            .ok_or(EntryError::MissingFolder)?;
        if !clean.is_empty() {
            record.publish_stats.assessments_published += 1;
            record.assessments.insert(
                name.to_string(),
                truncate_chars(&clean, self.policy.assessment_char_limit).to_string(),
            );
        }
        Ok(())
    }
}

fn is_assignment_candidate(path: &str) -> bool {
    path.ends_with(PAGE_SUFFIX)
        && !path.starts_with(WIKI_PREFIX)
        && !path.starts_with(WEB_RESOURCES_PREFIX)
        && !path.to_lowercase().contains("syllabus")
        && path.contains('/')
}

fn first_segment(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

fn read_assignment(
    members: &mut Members,
    path: &str,
    record: &mut CourseRecord,
) -> Result<(), EntryError> {
    let folder_id = first_segment(path);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let settings_path = format!("{folder_id}/assignment_settings.xml");

    let settings = if members.contains(&settings_path) {
        AssignmentSettings::parse(&members.text(&settings_path)?)
    } else {
        AssignmentSettings::default()
    };
    let name = settings
        .title
        .clone()
        .unwrap_or_else(|| assignment_name_from_file(file_name));

    if !settings.published {
        record.publish_stats.assignments_unpublished += 1;
        record.unpublished_assignment_names.push(name);
        return Ok(());
    }

    let instructions = strip_html(&members.text(path)?);
    if !instructions.is_empty() {
        record.publish_stats.assignments_published += 1;
        record.assignments.insert(
            name,
            AssignmentRecord {
                instructions,
                due_date: settings.due_date,
                points: settings.points,
                submission_type: settings.submission_type,
                folder_id: folder_id.to_string(),
            },
        );
    }
    Ok(())
}

/// UTF-8 decode that skips undecodable byte runs instead of substituting
/// replacement characters. Valid U+FFFD in the source is kept.
fn decode_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

/// Zip members addressed by name, in central-directory order.
struct Members<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    names: Vec<String>,
    index: HashSet<String>,
}

impl<'a> Members<'a> {
    fn open(bytes: &'a [u8]) -> Result<Self, ArchiveError> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        let index = names.iter().cloned().collect();
        Ok(Self {
            archive,
            names,
            index,
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Member contents decoded as UTF-8, dropping undecodable bytes.
    fn text(&mut self, name: &str) -> Result<String, EntryError> {
        let mut entry = self.archive.by_name(name)?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(decode_dropping_invalid(&bytes))
    }

    fn optional_text(&mut self, name: &str) -> String {
        if !self.contains(name) {
            return String::new();
        }
        self.text(name).unwrap_or_else(|err| {
            warn!(path = name, error = %err, "settings member unreadable");
            String::new()
        })
    }
}

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Unified extraction result for one course export.
///
/// Built once by the archive reader and read-only afterwards. Ordered maps keep
/// archive order, which downstream deduplication and matching depend on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CourseRecord {
    pub file_name: String,
    pub member_count: usize,
    pub settings: SettingsBlobs,
    pub published_pages: IndexMap<String, String>,
    pub media_page_titles: Vec<String>,
    pub unpublished_page_titles: Vec<String>,
    pub assignments: IndexMap<String, AssignmentRecord>,
    pub unpublished_assignment_names: Vec<String>,
    pub assessments: IndexMap<String, String>,
    pub publish_stats: PublishStats,
    pub syllabus_text: String,
}

impl CourseRecord {
    pub fn has_syllabus(&self) -> bool {
        !self.syllabus_text.is_empty()
    }

    /// Lowercased text of every published content page, space-joined.
    pub fn page_corpus(&self) -> String {
        self.published_pages
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Lowercased instructions of every published assignment, space-joined.
    pub fn assignment_corpus(&self) -> String {
        self.assignments
            .values()
            .map(|assignment| assignment.instructions.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Raw settings members, kept as text until a structural extractor reads them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsBlobs {
    pub course_settings: String,
    pub assignment_groups: String,
    pub module_meta: String,
    pub rubrics: String,
    pub manifest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentRecord {
    pub instructions: String,
    pub due_date: String,
    pub points: String,
    pub submission_type: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PublishStats {
    pub pages_published: usize,
    pub pages_unpublished: usize,
    pub assignments_published: usize,
    pub assignments_unpublished: usize,
    pub assessments_published: usize,
    pub assessments_unpublished: usize,
}

impl PublishStats {
    pub fn pages_total(&self) -> usize {
        self.pages_published + self.pages_unpublished
    }

    pub fn assignments_total(&self) -> usize {
        self.assignments_published + self.assignments_unpublished
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Online,
    Hybrid,
    FaceToFace,
    Unknown,
}

impl Modality {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Online => "Online",
            Self::Hybrid => "Hybrid",
            Self::FaceToFace => "Face-to-Face",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseIdentity {
    pub title: String,
    pub code: String,
    pub modality: Modality,
    pub start_date: String,
    pub end_date: String,
}

impl Default for CourseIdentity {
    fn default() -> Self {
        Self {
            title: UNKNOWN.to_string(),
            code: UNKNOWN.to_string(),
            modality: Modality::Unknown,
            start_date: UNKNOWN.to_string(),
            end_date: UNKNOWN.to_string(),
        }
    }
}

pub(crate) const UNKNOWN: &str = "Unknown";

/// A published module and its published items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRecord {
    pub title: String,
    /// Display hint only; not guaranteed unique, contiguous, or numeric.
    pub position: String,
    pub state: String,
    pub items: Vec<ItemRecord>,
    pub weeks: Vec<String>,
}

impl ModuleRecord {
    pub fn number(&self) -> Option<u32> {
        self.position.trim().parse().ok()
    }

    /// Title words longer than three characters, used for fuzzy page lookups.
    pub fn title_keywords(&self) -> Vec<String> {
        title_keywords(&self.title)
    }
}

pub(crate) fn title_keywords(title: &str) -> Vec<String> {
    title
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '|')
        .filter(|word| word.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub title: String,
    pub content_type: String,
    pub is_week_header: bool,
    pub week: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupWeight {
    Percent(f64),
    Raw(String),
}

impl GroupWeight {
    pub fn as_percent(&self) -> Option<f64> {
        match self {
            Self::Percent(value) => Some(*value),
            Self::Raw(raw) => raw.trim().parse().ok(),
        }
    }
}

impl fmt::Display for GroupWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(value) => write!(f, "{value:.1}"),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradingGroup {
    pub name: String,
    pub weight: GroupWeight,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rubric {
    pub title: String,
    pub criteria: Vec<String>,
}

/// Bloom's taxonomy level, ordered by cognitive demand. `Unclear` sorts lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BloomsLevel {
    Unclear,
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl BloomsLevel {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Remember,
            Self::Understand,
            Self::Apply,
            Self::Analyze,
            Self::Evaluate,
            Self::Create,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unclear => "Unclear",
            Self::Remember => "Remember",
            Self::Understand => "Understand",
            Self::Apply => "Apply",
            Self::Analyze => "Analyze",
            Self::Evaluate => "Evaluate",
            Self::Create => "Create",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectiveType {
    #[serde(rename = "CLO")]
    Clo,
    #[serde(rename = "MLO")]
    Mlo,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ObjectiveType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clo => "CLO",
            Self::Mlo => "MLO",
            Self::Unknown => "unknown",
        }
    }
}

pub const SYLLABUS_SOURCE: &str = "[Syllabus]";
pub const ASSIGNMENT_SOURCE_PREFIX: &str = "[Assignment] ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Objective {
    pub text: String,
    pub blooms: BloomsLevel,
    pub source: String,
    pub kind: ObjectiveType,
    pub module_number: Option<u32>,
}

/// One Quality Matters standard checked by the rule battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QmStandard {
    pub id: &'static str,
    pub description: &'static str,
}

pub const QM_STANDARDS: &[QmStandard] = &[
    QmStandard { id: "1.1", description: "Course Overview & Introduction present" },
    QmStandard { id: "1.2", description: "Learner expectations clearly stated" },
    QmStandard { id: "2.1", description: "Course-level objectives present and measurable" },
    QmStandard { id: "2.2", description: "Module-level objectives present" },
    QmStandard { id: "2.3", description: "Objectives use measurable action verbs" },
    QmStandard { id: "3.1", description: "Assessments align to stated objectives" },
    QmStandard { id: "3.2", description: "Variety of assessment types used" },
    QmStandard { id: "4.1", description: "Instructional materials align to objectives" },
    QmStandard { id: "5.1", description: "Learning activities promote engagement" },
    QmStandard { id: "5.2", description: "Learner interaction opportunities present" },
    QmStandard { id: "6.1", description: "Technology requirements stated" },
    QmStandard { id: "7.1", description: "Accessibility considerations present" },
    QmStandard { id: "8.1", description: "Course navigation is clear and consistent" },
];

/// Universal Design for Learning principles, in report order.
pub const UDL_PRINCIPLES: &[(&str, &str)] = &[
    ("representation", "Multiple Means of Representation"),
    ("engagement", "Multiple Means of Engagement"),
    ("action_expression", "Multiple Means of Action & Expression"),
];

type Keywords = &'static [&'static str];

/// Keyword tables behind the QM rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QmKeywords {
    pub welcome_pages: Keywords,
    pub contact: Keywords,
    pub expectations: Keywords,
    pub module_objective_phrases: Keywords,
    pub discussion_tasks: Keywords,
    pub written_tasks: Keywords,
    pub project_tasks: Keywords,
    pub peer_tasks: Keywords,
    pub discussion: Keywords,
    pub reflection: Keywords,
    pub active_learning: Keywords,
    pub peer_interaction: Keywords,
    pub instructor_interaction: Keywords,
    pub technology: Keywords,
    pub accessibility: Keywords,
    pub start_pages: Keywords,
}

/// Keyword tables behind the UDL rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdlKeywords {
    pub video_media: Keywords,
    pub audio_media: Keywords,
    pub reading: Keywords,
    pub visual: Keywords,
    pub choice: Keywords,
    pub relevance: Keywords,
    pub challenge: Keywords,
    pub written: Keywords,
    pub verbal: Keywords,
    pub visual_expression: Keywords,
    pub collaboration: Keywords,
}

/// Standards table plus keyword tables, swappable as a unit for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationConfig {
    pub standards: &'static [QmStandard],
    pub qm: QmKeywords,
    pub udl: UdlKeywords,
    /// Rubric markup shorter than this counts as no rubrics.
    pub min_rubric_chars: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EvaluationConfig {
    pub fn standard() -> Self {
        Self {
            standards: QM_STANDARDS,
            qm: QmKeywords {
                welcome_pages: &["welcome", "introduction", "overview", "the-right-stuff", "start-here"],
                contact: &["instructor", "professor", "office hours", "email"],
                expectations: &[
                    "netiquette",
                    "expectation",
                    "participation",
                    "late policy",
                    "academic integrity",
                    "community",
                ],
                module_objective_phrases: &[
                    "objective",
                    "by the end",
                    "you will",
                    "students will",
                    "upon completion",
                ],
                discussion_tasks: &["discussion", "respond", "reply", "post"],
                written_tasks: &["essay", "paper", "write", "reflection", "journal"],
                project_tasks: &["project", "present", "create", "design", "build", "produce"],
                peer_tasks: &["peer", "classmate"],
                discussion: &["discussion", "respond", "reply"],
                reflection: &["reflect", "journal"],
                active_learning: &["create", "analyze", "design", "solve", "apply", "build"],
                peer_interaction: &["peer", "classmate", "group", "team", "collaborate"],
                instructor_interaction: &["instructor", "professor", "office hours", "feedback"],
                technology: &[
                    "browser",
                    "technology",
                    "computer",
                    "internet",
                    "tool",
                    "canvas",
                    "login",
                    "access",
                ],
                accessibility: &[
                    "accessibility",
                    "ada",
                    "accommodation",
                    "disability",
                    "caption",
                    "alt text",
                    "508",
                ],
                start_pages: &["start-here", "getting-started", "the-right-stuff", "module-1"],
            },
            udl: UdlKeywords {
                video_media: &["video", "youtube", "playposit"],
                audio_media: &["podcast", "audio"],
                reading: &["read", "article", "chapter", "text"],
                visual: &["infographic", "diagram", "image", "chart"],
                choice: &["choose", "select", "option", "your choice"],
                relevance: &["real-world", "your experience", "community"],
                challenge: &["challenge", "stretch", "advanced", "extension"],
                written: &["essay", "paper", "write", "journal", "response"],
                verbal: &["present", "speech", "record", "video", "oral"],
                visual_expression: &["infographic", "poster", "create", "design", "build"],
                collaboration: &["group", "team", "peer", "collaborate"],
            },
            min_rubric_chars: 100,
        }
    }

    pub fn description(&self, standard_id: &str) -> Option<&'static str> {
        self.standards
            .iter()
            .find(|standard| standard.id == standard_id)
            .map(|standard| standard.description)
    }
}

/// Substring presence of any keyword in already-lowercased text.
pub(crate) fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

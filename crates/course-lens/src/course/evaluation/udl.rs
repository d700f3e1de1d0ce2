use super::config::{mentions, EvaluationConfig};
use super::{EvaluationResult, Verdict};
use crate::course::domain::CourseRecord;

fn count(signals: &[bool]) -> usize {
    signals.iter().filter(|present| **present).count()
}

/// Signal flags render as `True`/`False` in verdict notes.
fn flag(present: bool) -> &'static str {
    if present {
        "True"
    } else {
        "False"
    }
}

/// Checks the three UDL principles against published content and media
/// titles.
pub fn evaluate_udl(record: &CourseRecord, config: &EvaluationConfig) -> EvaluationResult {
    let keywords = &config.udl;
    let content = format!("{} {}", record.page_corpus(), record.assignment_corpus());
    let media = record.media_page_titles.join(" ").to_lowercase();
    let mut result = EvaluationResult::default();

    let video = mentions(&media, keywords.video_media);
    let reading = mentions(&content, keywords.reading);
    let audio = mentions(&media, keywords.audio_media);
    let visual = mentions(&content, keywords.visual);
    let formats = count(&[video, reading, audio, visual]);
    result.insert(
        "representation",
        Verdict::tiered(
            formats >= 3,
            format!(
                "video={}, reading={}, audio={}, visual={}",
                flag(video),
                flag(reading),
                flag(audio),
                flag(visual)
            ),
            formats == 2,
            format!("Only {formats} representation formats"),
            "Limited content format variety",
        ),
    );

    let strategies = count(&[
        mentions(&content, keywords.choice),
        mentions(&content, keywords.relevance),
        mentions(&content, keywords.challenge),
    ]);
    result.insert(
        "engagement",
        Verdict::tiered(
            strategies >= 2,
            "Choice, relevance, and/or challenge detected",
            strategies == 1,
            "Some engagement strategies",
            "Limited engagement strategies",
        ),
    );

    let written = mentions(&content, keywords.written);
    let verbal = mentions(&content, keywords.verbal);
    let visual_expression = mentions(&content, keywords.visual_expression);
    let collaboration = mentions(&content, keywords.collaboration);
    let channels = count(&[written, verbal, visual_expression, collaboration]);
    result.insert(
        "action_expression",
        Verdict::tiered(
            channels >= 3,
            format!(
                "written={}, verbal={}, visual={}, collab={}",
                flag(written),
                flag(verbal),
                flag(visual_expression),
                flag(collaboration)
            ),
            channels == 2,
            "Some expression variety",
            "Limited ways to demonstrate learning",
        ),
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::evaluation::{StandardStatus, UDL_PRINCIPLES};

    #[test]
    fn varied_course_meets_all_principles() {
        let mut record = CourseRecord::default();
        record.media_page_titles = vec!["video-orientation".to_string(), "podcast-episode-2".to_string()];
        record.published_pages.insert(
            "week-1".to_string(),
            "Read chapter 1 and study the diagram. Choose one option that connects to your experience. \
Write a journal entry, present to your team, and design a poster."
                .to_string(),
        );

        let result = evaluate_udl(&record, &EvaluationConfig::standard());
        let ids: Vec<&str> = result.iter().map(|(id, _)| id).collect();
        let expected: Vec<&str> = UDL_PRINCIPLES.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, expected);
        for (id, verdict) in result.iter() {
            assert_eq!(verdict.status, StandardStatus::Met, "{id}: {}", verdict.note);
        }
        assert_eq!(
            result.get("representation").map(|v| v.note.as_str()),
            Some("video=True, reading=True, audio=True, visual=True")
        );
        assert_eq!(
            result.get("action_expression").map(|v| v.note.as_str()),
            Some("written=True, verbal=True, visual=True, collab=True")
        );
    }

    #[test]
    fn met_notes_report_missing_signals_as_false() {
        let mut record = CourseRecord::default();
        record.published_pages.insert(
            "week-2".to_string(),
            "Write an essay, present your findings, and design an infographic.".to_string(),
        );

        let result = evaluate_udl(&record, &EvaluationConfig::standard());
        assert_eq!(
            result.get("action_expression").map(|v| v.note.as_str()),
            Some("written=True, verbal=True, visual=True, collab=False")
        );
    }

    #[test]
    fn empty_course_is_not_met() {
        let result = evaluate_udl(&CourseRecord::default(), &EvaluationConfig::standard());
        assert_eq!(result.len(), 3);
        assert_eq!(result.count(StandardStatus::NotMet), 3);
    }
}

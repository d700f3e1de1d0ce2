use chrono::Local;
use clap::Args;
use course_lens::config::AppConfig;
use course_lens::course::report::views::AnalysisSummary;
use course_lens::course::CourseAnalysis;
use course_lens::error::AppError;
use course_lens::telemetry::{self, LogSink};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Course export archive (.imscc or .zip)
    pub(crate) path: PathBuf,
    /// Where to write the Markdown document (defaults to <archive-stem>_analysis.md)
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,
    /// Plain-text syllabus to compare course objectives against
    #[arg(long)]
    pub(crate) syllabus: Option<PathBuf>,
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs {
        path,
        output,
        syllabus,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogSink::Stderr)?;

    let bytes = fs::read(&path)?;
    let syllabus = match syllabus {
        Some(syllabus_path) => String::from_utf8_lossy(&fs::read(syllabus_path)?).into_owned(),
        None => String::new(),
    };
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let analysis = CourseAnalysis::run(&file_name, &bytes, &syllabus, &config.analysis)?;
    let document = analysis.render_markdown(Local::now().naive_local());
    let output = output.unwrap_or_else(|| default_output_path(&path));
    fs::write(&output, &document)?;

    print_summary(&analysis.summary(), &output, &document);
    Ok(())
}

/// `<archive-stem>_analysis.md` in the working directory.
fn default_output_path(archive: &Path) -> PathBuf {
    let stem = archive
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "course".to_string());
    PathBuf::from(format!("{stem}_analysis.md"))
}

fn print_summary(summary: &AnalysisSummary, output: &Path, document: &str) {
    let identity = &summary.identity;
    let publish = &summary.publish;
    let objectives = &summary.objectives;
    let health = &summary.health.score;

    println!("Course analysis complete");
    println!("- Course: {} ({})", identity.title, identity.code);
    println!(
        "- Modules: {} published | {} week labels",
        summary.module_count, summary.week_count
    );
    println!("- Grading groups: {}", summary.grading_group_count);
    println!(
        "- Objectives: {} CLO | {} MLO | {} unclassified",
        objectives.clo, objectives.mlo, objectives.unclassified
    );
    match summary.comparison {
        Some(comparison) => println!(
            "- Syllabus: {} objectives | {} matched | {} course-only | {} syllabus-only",
            objectives.syllabus,
            comparison.matched,
            comparison.course_only,
            comparison.syllabus_only
        ),
        None if summary.syllabus_provided => {
            println!("- Syllabus: provided, no objectives detected")
        }
        None => println!("- Syllabus: not provided"),
    }
    println!("- Rubrics: {}", summary.rubric_count);
    println!(
        "- Assignments: {} published | {} unpublished",
        publish.assignments_published, publish.assignments_unpublished
    );
    println!(
        "- Pages: {} published | {} unpublished",
        publish.pages_published, publish.pages_unpublished
    );
    println!(
        "- QM: {} met | {} partial | {} not met | {} review (of {})",
        health.met, health.partially_met, health.not_met, health.needs_review, health.total
    );
    println!("- Recommendation: {}", summary.health.recommendation_summary);

    let chars = document.chars().count();
    println!(
        "Saved {} ({:.1} KB, ~{} tokens)",
        output.display(),
        document.len() as f64 / 1024.0,
        chars / 4
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_uses_archive_stem() {
        assert_eq!(
            default_output_path(Path::new("/tmp/exports/PHI2600-fall.imscc")),
            PathBuf::from("PHI2600-fall_analysis.md")
        );
        assert_eq!(
            default_output_path(Path::new("course.zip")),
            PathBuf::from("course_analysis.md")
        );
    }
}

use crate::analyze::{run_analyze, AnalyzeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use course_lens::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "course-lens",
    about = "Analyze course export archives and produce an instructional design review document",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one course export and write the Markdown review document
    Analyze(AnalyzeArgs),
    /// Start the HTTP upload service
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Serve(args) => server::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["course-lens"]).is_err());
        assert!(Cli::try_parse_from(["course-lens", "analyze"]).is_err());
    }

    #[test]
    fn analyze_accepts_output_and_syllabus() {
        let cli = Cli::try_parse_from([
            "course-lens",
            "analyze",
            "export.imscc",
            "--output",
            "report.md",
            "--syllabus",
            "syllabus.txt",
        ])
        .expect("arguments parse");
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.path.to_string_lossy(), "export.imscc");
                assert!(args.output.is_some());
                assert!(args.syllabus.is_some());
            }
            Command::Serve(_) => panic!("expected analyze"),
        }
    }
}

use crate::infra::{load_dataset, DataArgs, MatchRequest};
use clap::Args;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use wahlmatch::config::{AppConfig, DisplayConfig};
use wahlmatch::error::AppError;
use wahlmatch::workflows::matching::{
    rank, score, top_result, MatchSession, ScoredResult, Stance,
};
use wahlmatch::workflows::share::{FileBackgrounds, ShareRenderer, SHARE_FILE_NAME};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON answer file: {"answers": {"<thesis>": -1|0|1}, "weighted": ["<thesis>"]}
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Additional thesis ids to count double
    #[arg(long = "weighted")]
    pub(crate) weighted: Vec<String>,
    /// Print the per-thesis breakdown for every party
    #[arg(long)]
    pub(crate) details: bool,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

#[derive(Args, Debug)]
pub(crate) struct QuizArgs {
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ShareArgs {
    /// JSON answer file, same shape as for `score`
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Where to write the card; a `.svg` extension writes the vector document
    #[arg(long, default_value = SHARE_FILE_NAME)]
    pub(crate) out: PathBuf,
    #[command(flatten)]
    pub(crate) data: DataArgs,
}

pub(crate) fn run_score(mut config: AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        answers,
        weighted,
        details,
        data,
    } = args;
    data.apply(&mut config);

    let dataset = load_dataset(&config)?;
    let mut request = read_request(&answers)?;
    request.weighted.extend(weighted);
    let (answers, weights) = request.inputs()?;

    let results = rank(score(
        dataset.parties(),
        dataset.theses(),
        &answers,
        &weights,
    ));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_results(&mut out, &results, details)?;
    Ok(())
}

pub(crate) fn run_share(mut config: AppConfig, args: ShareArgs) -> Result<(), AppError> {
    let ShareArgs { answers, out, data } = args;
    data.apply(&mut config);

    let dataset = load_dataset(&config)?;
    let display = DisplayConfig::load(&config.display_config_path)?;
    let (answers, weights) = read_request(&answers)?.inputs()?;

    let results = score(dataset.parties(), dataset.theses(), &answers, &weights);
    let renderer = ShareRenderer::with_system_fonts(config.font_dir.as_deref());
    let backgrounds = FileBackgrounds::new(&config.data.dir);
    let top = top_result(&results);

    if wants_svg(&out) {
        std::fs::write(&out, renderer.render_svg(top, &display, &backgrounds)?)?;
    } else {
        std::fs::write(&out, renderer.render_png(top, &display, &backgrounds)?)?;
    }

    println!("Share card written to {}", out.display());
    Ok(())
}

pub(crate) fn run_quiz(mut config: AppConfig, args: QuizArgs) -> Result<(), AppError> {
    args.data.apply(&mut config);
    let mut session = MatchSession::new(load_dataset(&config)?);

    let stdin = io::stdin();
    let stdout = io::stdout();
    quiz(&mut session, stdin.lock(), stdout.lock())
}

fn wants_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

fn read_request(path: &Path) -> Result<MatchRequest, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Drives `session` from line-based input until every thesis was visited,
/// the input ends, or the user quits. Prints the ranking at the end.
pub(crate) fn quiz<R: BufRead, W: Write>(
    session: &mut MatchSession,
    input: R,
    mut out: W,
) -> Result<(), AppError> {
    writeln!(
        out,
        "Answer with (a)gree, (n)eutral, (d)isagree, (s)kip, (w)eight toggle or (q)uit."
    )?;
    let mut lines = input.lines();

    while let Some(thesis) = session.current_thesis() {
        let id = thesis.id.clone();
        let progress = session.progress();
        let marker = if session.is_weighted(&id) { " [x2]" } else { "" };
        writeln!(
            out,
            "\n[{}/{}] {}{marker}",
            progress.answered, progress.total, thesis.statement
        )?;
        if !thesis.explanation.is_empty() {
            writeln!(out, "  {}", thesis.explanation)?;
        }
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match parse_command(&line?) {
            Some(QuizCommand::Answer(stance)) => {
                session.record(stance)?;
            }
            Some(QuizCommand::Skip) => {
                session.skip()?;
            }
            Some(QuizCommand::ToggleWeight) => session.toggle_weight(&id),
            Some(QuizCommand::Quit) => break,
            None => writeln!(out, "Unrecognized input, try a, n, d, s, w or q.")?,
        }
    }

    writeln!(out)?;
    render_results(&mut out, &session.ranked_results(), false)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizCommand {
    Answer(Stance),
    Skip,
    ToggleWeight,
    Quit,
}

fn parse_command(raw: &str) -> Option<QuizCommand> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "a" | "+" | "1" | "agree" => Some(QuizCommand::Answer(Stance::Agree)),
        "n" | "0" | "neutral" => Some(QuizCommand::Answer(Stance::Neutral)),
        "d" | "-" | "-1" | "disagree" => Some(QuizCommand::Answer(Stance::Disagree)),
        "s" | "skip" => Some(QuizCommand::Skip),
        "w" | "weight" => Some(QuizCommand::ToggleWeight),
        "q" | "quit" => Some(QuizCommand::Quit),
        _ => None,
    }
}

fn render_results<W: Write>(
    out: &mut W,
    results: &[ScoredResult],
    details: bool,
) -> Result<(), AppError> {
    writeln!(out, "Results")?;
    for (rank, result) in results.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {} ({}) {:.1}% | agree {} / neutral {} / disagree {}",
            rank + 1,
            result.party.name,
            result.party.short_name,
            result.percentage,
            result.agree_count,
            result.neutral_count,
            result.disagree_count,
        )?;

        if details {
            for position in &result.positions {
                let weight = if position.weight > 1 { " (x2)" } else { "" };
                writeln!(
                    out,
                    "    - {}{weight}: you {}, party {}{}",
                    position.statement,
                    position.user_stance.label(),
                    position.party_stance.label(),
                    justification_suffix(&position.party_justification),
                )?;
            }
        }
    }
    Ok(())
}

fn justification_suffix(justification: &str) -> String {
    if justification.is_empty() {
        String::new()
    } else {
        format!(" ({justification})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;
    use wahlmatch::workflows::matching::ThesisId;
    use wahlmatch::workflows::dataset::{Dataset, NormalizeOptions};

    fn session() -> MatchSession {
        let dataset = Dataset::from_delimited(
            "id;name;kurzname\nred;Red Party;RED\nblue;Blue Party;BLUE\n".as_bytes(),
            "id;these;erklaerung;partei_red;partei_blue\n\
t1;Raise the minimum wage;Applies city-wide.;1;-1\n\
t2;Lower taxes;;-1;1\n\
t3;Build a tram line;;1;1\n"
                .as_bytes(),
            NormalizeOptions::default(),
        )
        .expect("dataset");
        MatchSession::new(Arc::new(dataset))
    }

    #[test]
    fn parse_command_accepts_letters_and_codes() {
        assert_eq!(parse_command(" A "), Some(QuizCommand::Answer(Stance::Agree)));
        assert_eq!(parse_command("-1"), Some(QuizCommand::Answer(Stance::Disagree)));
        assert_eq!(parse_command("0"), Some(QuizCommand::Answer(Stance::Neutral)));
        assert_eq!(parse_command("w"), Some(QuizCommand::ToggleWeight));
        assert_eq!(parse_command("maybe"), None);
    }

    #[test]
    fn quiz_records_answers_weights_and_skips() {
        let mut session = session();
        let input = Cursor::new("w\na\nhuh\ns\nd\n");
        let mut output = Vec::new();

        quiz(&mut session, input, &mut output).expect("quiz runs");

        assert!(session.is_finished());
        assert_eq!(session.progress().answered, 2);
        assert!(session.is_weighted(&ThesisId::from("t1")));
        assert_eq!(
            session.answers().get(&ThesisId::from("t3")),
            Some(&Stance::Disagree)
        );

        let printed = String::from_utf8(output).expect("utf8");
        assert!(printed.contains("Raise the minimum wage [x2]"));
        assert!(printed.contains("Applies city-wide."));
        assert!(printed.contains("Unrecognized input"));
        assert!(printed.contains(" 1. Red Party (RED)"));
    }

    #[test]
    fn output_format_follows_extension() {
        assert!(wants_svg(Path::new("card.SVG")));
        assert!(!wants_svg(Path::new(SHARE_FILE_NAME)));
        assert!(!wants_svg(Path::new("card")));
    }

    #[test]
    fn quiz_stops_at_end_of_input() {
        let mut session = session();
        let mut output = Vec::new();

        quiz(&mut session, Cursor::new("a\n"), &mut output).expect("quiz runs");

        assert!(!session.is_finished());
        assert_eq!(session.progress().answered, 1);
    }

    #[test]
    fn details_list_party_justifications() {
        let mut session = session();
        session.record(Stance::Agree).expect("t1");
        let mut output = Vec::new();

        render_results(&mut output, &session.ranked_results(), true).expect("render");

        let printed = String::from_utf8(output).expect("utf8");
        assert!(printed.contains("Raise the minimum wage: you agree, party agree"));
        assert!(printed.contains("100.0%"));
    }
}

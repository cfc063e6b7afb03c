//! Terminal front end: loads a vocabulary file and plays one game mode.

mod cli;
mod render;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, trace};
use tracing_subscriber::EnvFilter;

use lesson_core::model::{Question, QuestionKind, VocabDraft, Vocabulary};
use services::{
    GameSession, MatchingBoard, QuestionGenerator, SessionDriver, SessionEvent,
    SessionUpdate, VocabQuiz,
};

use cli::{Cli, Command, Mode, PlayArgs};

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_vocabulary(path: &Path) -> Result<Arc<Vocabulary>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading vocabulary file {}", path.display()))?;
    let drafts: Vec<VocabDraft> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing vocabulary file {}", path.display()))?;
    let vocab = Vocabulary::new(drafts)?;
    if vocab.is_empty() {
        bail!("vocabulary file {} has no words", path.display());
    }
    Ok(Arc::new(vocab))
}

fn generator(args: &PlayArgs) -> QuestionGenerator {
    args.seed
        .map_or_else(QuestionGenerator::new, QuestionGenerator::seeded)
        .with_distractors(args.distractors)
}

async fn play_quiz(vocab: Arc<Vocabulary>, kind: QuestionKind, args: &PlayArgs) -> Result<()> {
    let settings = args.settings();
    let quiz = VocabQuiz::new(vocab, kind, &settings).with_generator(generator(args));
    let driver = SessionDriver::new(GameSession::new(quiz, &settings), &settings);

    let (event_tx, event_rx) = mpsc::channel(16);
    let (update_tx, mut update_rx) = mpsc::channel(64);
    let driver_task = tokio::spawn(driver.run(event_rx, update_tx));

    println!("{}", render::quiz_help(kind));
    event_tx.send(SessionEvent::Start).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current: Option<Question> = None;

    loop {
        tokio::select! {
            update = update_rx.recv() => {
                let Some(update) = update else { break };
                match update {
                    SessionUpdate::Started { total } => println!("{total} questions. Go!"),
                    SessionUpdate::Asked { index, total, question } => {
                        println!("{}", render::question(index, total, &question));
                        current = Some(question);
                    }
                    SessionUpdate::Tick { elapsed } => trace!(%elapsed, "tick"),
                    SessionUpdate::Revealed { tile, revealed, tiles } => {
                        println!("{}", render::revealed(tile, revealed, tiles));
                    }
                    SessionUpdate::Answered(feedback) => {
                        println!("{}", render::feedback(&feedback));
                        if !settings.auto_advance {
                            println!("(:next to continue)");
                        }
                    }
                    SessionUpdate::Finished(summary) => {
                        current = None;
                        println!("{}", render::summary(&summary));
                        println!(":restart to play again, :quit to leave");
                    }
                    SessionUpdate::Restarted => {
                        current = None;
                        println!("Restarted. Type :start to begin.");
                    }
                    SessionUpdate::Rejected { reason } => println!("({reason})"),
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let _ = event_tx.send(SessionEvent::Quit).await;
                    break;
                };
                let Some(event) = cli::parse_quiz_input(&line, current.as_ref()) else {
                    continue;
                };
                let quit = event == SessionEvent::Quit;
                if event_tx.send(event).await.is_err() || quit {
                    break;
                }
            }
        }
    }

    let session = driver_task.await?;
    info!(score = session.score(), elapsed = %session.elapsed(), "quiz closed");
    Ok(())
}

async fn play_matching(vocab: Arc<Vocabulary>, args: &PlayArgs) -> Result<()> {
    let settings = args.settings();
    let mut board = MatchingBoard::new(vocab, &settings).with_generator(generator(args));
    board.start()?;

    println!("{}", render::matching_help());
    println!("{}", render::board(&board));

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.tick().await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                board.tick();
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match cli::parse_matching_input(&line) {
                    cli::MatchingInput::Quit => break,
                    cli::MatchingInput::Restart => {
                        board.restart();
                        board.start()?;
                        println!("{}", render::board(&board));
                    }
                    cli::MatchingInput::Pick(picks) => {
                        for index in picks {
                            match board.select(index.saturating_sub(1)) {
                                Ok(selection) => println!("{}", render::selection(&board, &selection)),
                                Err(err) => println!("({err})"),
                            }
                        }
                        println!("{}", render::board(&board));
                    }
                    cli::MatchingInput::Unknown => println!("{}", render::matching_help()),
                }
            }
        }
    }

    info!(moves = board.moves(), elapsed = %board.elapsed(), "matching closed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Modes => {
            for mode in Mode::all() {
                println!("{mode}");
            }
            Ok(())
        }
        Command::Play(args) => {
            let vocab = load_vocabulary(&args.vocab)?;
            info!(words = vocab.len(), mode = %args.mode, "starting game");
            match args.mode {
                Mode::Quiz(kind) => play_quiz(vocab, kind, &args).await,
                Mode::Matching => play_matching(vocab, &args).await,
            }
        }
    }
}

use std::sync::Arc;

use lesson_core::model::{
    Expected, QuestionKind, Response, SessionPhase, VocabDraft, Vocabulary,
};
use lesson_core::time::fixed_clock;
use services::{GameSession, GameSettings, QuestionGenerator, VocabQuiz};

const LESSON: &str = r#"[
    {"word": "pen", "vietnameseMeaning": "cây bút", "image": "img/pen.png"},
    {"word": "pencil", "vietnameseMeaning": "bút chì",
     "exampleSentenceEn": "I have a red pencil.", "exampleSentenceVi": "Tôi có một cây bút chì đỏ."},
    {"word": "ruler", "vietnameseMeaning": "thước kẻ"},
    {"word": "eraser", "vietnameseMeaning": "cục tẩy",
     "exampleSentenceEn": "This is my eraser."},
    {"word": "school bag", "vietnameseMeaning": "cặp sách"}
]"#;

fn vocabulary() -> Arc<Vocabulary> {
    let drafts: Vec<VocabDraft> = serde_json::from_str(LESSON).unwrap();
    Arc::new(Vocabulary::new(drafts).unwrap())
}

/// The response a careful player would give for the current question.
fn right_answer(expected: &Expected) -> Response {
    match expected {
        Expected::Choice { correct, .. } => Response::Option(*correct),
        Expected::Keys { options, correct } => {
            Response::keys(correct.iter().map(|i| options[*i].clone()))
        }
        Expected::Sequence { tokens } => Response::Tokens(tokens.clone()),
        Expected::Text { answer } => Response::text(answer.to_uppercase()),
        Expected::Blanks { answers } => Response::Tokens(answers.clone()),
    }
}

#[test]
fn every_kind_can_be_played_to_a_perfect_score() {
    let vocab = vocabulary();
    let settings = GameSettings::default();

    for kind in QuestionKind::ALL {
        let quiz = VocabQuiz::new(Arc::clone(&vocab), kind, &settings)
            .with_generator(QuestionGenerator::seeded(2024));
        let mut session = GameSession::new(quiz, &settings).with_clock(fixed_clock());

        session.start().unwrap();
        let total = session.total_questions();
        assert!(total > 0, "{kind} produced no questions");

        while session.phase() != SessionPhase::GameOver {
            let response = right_answer(session.current_question().unwrap().expected());
            assert!(session.submit(&response).unwrap().is_correct());
            session.next().unwrap();
        }

        let summary = session.summary().unwrap().unwrap();
        assert_eq!(summary.correct() as usize, total, "{kind}");
        assert_eq!(summary.points() as usize, total * 10);
        assert_eq!(summary.accuracy_percent(), 100);
    }
}

#[test]
fn restart_generates_a_fresh_question_list() {
    let vocab = vocabulary();
    let settings = GameSettings::default().with_question_count(Some(3));
    let quiz = VocabQuiz::new(vocab, QuestionKind::MeaningToWord, &settings)
        .with_generator(QuestionGenerator::seeded(1));
    let mut session = GameSession::new(quiz, &settings);

    session.start().unwrap();
    assert_eq!(session.total_questions(), 3);
    session.submit(&Response::text("definitely wrong")).unwrap();
    assert_eq!(session.score(), 0);

    session.restart();
    assert_eq!(session.phase(), SessionPhase::NotStarted);
    assert_eq!(session.total_questions(), 0);

    session.start().unwrap();
    assert_eq!(session.total_questions(), 3);
    assert!(session.feedback().is_empty());
}

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use lesson_core::model::{Question, Response, SessionPhase, SessionSummary};
use lesson_core::time::Elapsed;

use super::service::GameSession;
use super::source::QuestionSource;
use crate::feedback::Feedback;
use crate::settings::GameSettings;

const TICK: Duration = Duration::from_secs(1);

/// Input to the driver loop, typically produced by UI handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Submit(Response),
    /// Uncover a tile of the current hidden picture.
    Reveal(usize),
    Next,
    Restart,
    Quit,
}

/// State changes published by the driver loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Started { total: usize },
    Asked {
        index: usize,
        total: usize,
        question: Question,
    },
    Tick { elapsed: Elapsed },
    Revealed {
        tile: usize,
        revealed: usize,
        tiles: usize,
    },
    Answered(Feedback),
    Finished(SessionSummary),
    Restarted,
    Rejected { reason: String },
}

/// Runs a `GameSession` on a single task: a one-second ticker, user events in arrival
/// order, and the delayed advance after feedback.
///
/// A manual `Next` or a `Restart` clears any pending advance.
pub struct SessionDriver<S> {
    session: GameSession<S>,
    advance_delay: Duration,
    auto_advance: bool,
}

impl<S: QuestionSource> SessionDriver<S> {
    #[must_use]
    pub fn new(session: GameSession<S>, settings: &GameSettings) -> Self {
        Self {
            session,
            advance_delay: settings.advance_delay(),
            auto_advance: settings.auto_advance,
        }
    }

    #[must_use]
    pub fn session(&self) -> &GameSession<S> {
        &self.session
    }

    /// Process events until `Quit`, the event channel closes, or nobody listens to
    /// updates anymore. Hands the session back for inspection.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        updates: mpsc::Sender<SessionUpdate>,
    ) -> GameSession<S> {
        let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let advance = time::sleep(self.advance_delay);
        tokio::pin!(advance);
        let mut advance_armed = false;

        loop {
            let running = self.session.phase().is_running();
            let updates_out: Vec<SessionUpdate> = tokio::select! {
                biased;

                event = events.recv() => {
                    let Some(event) = event else { break };
                    if event == SessionEvent::Quit {
                        break;
                    }
                    if matches!(event, SessionEvent::Next | SessionEvent::Restart) {
                        advance_armed = false;
                    }
                    let was_running = running;
                    let out = self.apply(event);
                    if !was_running && self.session.phase().is_running() {
                        ticker.reset();
                    }
                    if self.auto_advance && self.session.phase() == SessionPhase::Answering && !advance_armed {
                        advance.as_mut().reset(Instant::now() + self.advance_delay);
                        advance_armed = true;
                    }
                    out
                }

                () = &mut advance, if advance_armed => {
                    advance_armed = false;
                    self.advance()
                }

                _ = ticker.tick(), if running => {
                    if self.session.tick() {
                        vec![SessionUpdate::Tick { elapsed: self.session.elapsed() }]
                    } else {
                        Vec::new()
                    }
                }
            };

            for update in updates_out {
                if updates.send(update).await.is_err() {
                    debug!("update receiver dropped, stopping driver");
                    return self.session;
                }
            }
        }

        self.session
    }

    fn apply(&mut self, event: SessionEvent) -> Vec<SessionUpdate> {
        match event {
            SessionEvent::Start => match self.session.start() {
                Ok(()) => {
                    let mut out = vec![SessionUpdate::Started {
                        total: self.session.total_questions(),
                    }];
                    out.extend(self.asked());
                    out
                }
                Err(err) => rejected(&err),
            },
            SessionEvent::Submit(response) => match self.session.submit(&response) {
                Ok(feedback) => vec![SessionUpdate::Answered(feedback.clone())],
                Err(err) => rejected(&err),
            },
            SessionEvent::Reveal(tile) => match self.session.reveal_tile(tile) {
                Ok(revealed) => vec![SessionUpdate::Revealed {
                    tile,
                    revealed,
                    tiles: self
                        .session
                        .current_question()
                        .map_or(0, Question::reveal_tiles),
                }],
                Err(err) => rejected(&err),
            },
            SessionEvent::Next => self.advance(),
            SessionEvent::Restart => {
                self.session.restart();
                vec![SessionUpdate::Restarted]
            }
            SessionEvent::Quit => Vec::new(),
        }
    }

    fn advance(&mut self) -> Vec<SessionUpdate> {
        match self.session.next() {
            Ok(SessionPhase::GameOver) => match self.session.summary() {
                Ok(Some(summary)) => vec![SessionUpdate::Finished(summary)],
                Ok(None) => Vec::new(),
                Err(err) => rejected(&err),
            },
            Ok(_) => self.asked().into_iter().collect(),
            Err(err) => rejected(&err),
        }
    }

    fn asked(&self) -> Option<SessionUpdate> {
        self.session
            .current_question()
            .map(|question| SessionUpdate::Asked {
                index: self.session.current_index(),
                total: self.session.total_questions(),
                question: question.clone(),
            })
    }
}

fn rejected(err: &dyn std::error::Error) -> Vec<SessionUpdate> {
    warn!(error = %err, "session event rejected");
    vec![SessionUpdate::Rejected {
        reason: err.to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::FixedQuestions;
    use lesson_core::model::{Expected, Prompt, QuestionKind, VocabId};

    fn questions() -> FixedQuestions {
        FixedQuestions(
            ["pen", "ruler"]
                .into_iter()
                .zip(0..)
                .map(|(answer, id)| {
                    Question::new(
                        VocabId::new(id),
                        QuestionKind::Typing,
                        Prompt::Text {
                            text: answer.to_uppercase(),
                        },
                        Expected::Text {
                            answer: answer.into(),
                        },
                    )
                    .unwrap()
                })
                .collect(),
        )
    }

    fn spawn_driver(
        settings: GameSettings,
    ) -> (
        mpsc::Sender<SessionEvent>,
        mpsc::Receiver<SessionUpdate>,
        tokio::task::JoinHandle<GameSession<FixedQuestions>>,
    ) {
        let session = GameSession::new(questions(), &settings);
        let driver = SessionDriver::new(session, &settings);
        let (event_tx, event_rx) = mpsc::channel(8);
        let (update_tx, update_rx) = mpsc::channel(64);
        let handle = tokio::spawn(driver.run(event_rx, update_tx));
        (event_tx, update_rx, handle)
    }

    async fn next_non_tick(rx: &mut mpsc::Receiver<SessionUpdate>) -> SessionUpdate {
        loop {
            match rx.recv().await.expect("driver alive") {
                SessionUpdate::Tick { .. } => continue,
                other => return other,
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn feedback_auto_advances_after_delay() {
        let (tx, mut rx, handle) = spawn_driver(GameSettings::default());

        tx.send(SessionEvent::Start).await.unwrap();
        assert_eq!(next_non_tick(&mut rx).await, SessionUpdate::Started { total: 2 });
        assert!(matches!(
            next_non_tick(&mut rx).await,
            SessionUpdate::Asked { index: 0, total: 2, .. }
        ));

        tx.send(SessionEvent::Submit(Response::text("pen"))).await.unwrap();
        let SessionUpdate::Answered(feedback) = next_non_tick(&mut rx).await else {
            panic!("expected feedback");
        };
        assert!(feedback.is_correct());

        let before = Instant::now();
        assert!(matches!(
            next_non_tick(&mut rx).await,
            SessionUpdate::Asked { index: 1, .. }
        ));
        assert!(Instant::now() - before >= Duration::from_millis(1_500));

        tx.send(SessionEvent::Submit(Response::text("pencil"))).await.unwrap();
        assert!(matches!(
            next_non_tick(&mut rx).await,
            SessionUpdate::Answered(_)
        ));
        let SessionUpdate::Finished(summary) = next_non_tick(&mut rx).await else {
            panic!("expected summary");
        };
        assert_eq!(summary.correct(), 1);
        assert_eq!(summary.incorrect(), 1);

        tx.send(SessionEvent::Quit).await.unwrap();
        let session = handle.await.unwrap();
        assert_eq!(session.phase(), SessionPhase::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_counts_seconds_while_running() {
        let settings = GameSettings::default().with_auto_advance(false);
        let (tx, mut rx, handle) = spawn_driver(settings);

        tx.send(SessionEvent::Start).await.unwrap();
        let mut ticks = Vec::new();
        while ticks.len() < 3 {
            if let SessionUpdate::Tick { elapsed } = rx.recv().await.unwrap() {
                ticks.push(elapsed.secs());
            }
        }
        assert_eq!(ticks, vec![1, 2, 3]);

        tx.send(SessionEvent::Restart).await.unwrap();
        assert_eq!(next_non_tick(&mut rx).await, SessionUpdate::Restarted);

        // no ticks once the session is back to not started
        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        tx.send(SessionEvent::Quit).await.unwrap();
        let session = handle.await.unwrap();
        assert_eq!(session.elapsed(), Elapsed::default());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_next_cancels_pending_advance() {
        let (tx, mut rx, handle) = spawn_driver(GameSettings::default());

        tx.send(SessionEvent::Start).await.unwrap();
        next_non_tick(&mut rx).await;
        next_non_tick(&mut rx).await;

        tx.send(SessionEvent::Submit(Response::text("x"))).await.unwrap();
        next_non_tick(&mut rx).await;
        tx.send(SessionEvent::Next).await.unwrap();
        assert!(matches!(
            next_non_tick(&mut rx).await,
            SessionUpdate::Asked { index: 1, .. }
        ));

        // the earlier delay must not skip the second question
        time::sleep(Duration::from_secs(3)).await;
        tx.send(SessionEvent::Quit).await.unwrap();
        let session = handle.await.unwrap();
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_pending_advance() {
        let (tx, mut rx, handle) = spawn_driver(GameSettings::default());

        tx.send(SessionEvent::Start).await.unwrap();
        next_non_tick(&mut rx).await;
        next_non_tick(&mut rx).await;

        tx.send(SessionEvent::Submit(Response::text("pen"))).await.unwrap();
        assert!(matches!(next_non_tick(&mut rx).await, SessionUpdate::Answered(_)));
        tx.send(SessionEvent::Restart).await.unwrap();
        assert_eq!(next_non_tick(&mut rx).await, SessionUpdate::Restarted);
        tx.send(SessionEvent::Start).await.unwrap();
        assert_eq!(next_non_tick(&mut rx).await, SessionUpdate::Started { total: 2 });
        assert!(matches!(
            next_non_tick(&mut rx).await,
            SessionUpdate::Asked { index: 0, .. }
        ));

        // the delay armed before the restart must not skip the fresh first question
        time::sleep(Duration::from_secs(3)).await;
        tx.send(SessionEvent::Quit).await.unwrap();
        let session = handle.await.unwrap();
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
    }

    #[tokio::test]
    async fn reveal_on_a_plain_question_is_rejected() {
        let (tx, mut rx, handle) = spawn_driver(GameSettings::default());

        tx.send(SessionEvent::Start).await.unwrap();
        next_non_tick(&mut rx).await;
        next_non_tick(&mut rx).await;
        tx.send(SessionEvent::Reveal(0)).await.unwrap();
        let SessionUpdate::Rejected { reason } = next_non_tick(&mut rx).await else {
            panic!("expected rejection");
        };
        assert_eq!(reason, "typing questions have nothing to reveal");

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn invalid_events_are_reported() {
        let (tx, mut rx, handle) = spawn_driver(GameSettings::default());

        tx.send(SessionEvent::Next).await.unwrap();
        let SessionUpdate::Rejected { reason } = next_non_tick(&mut rx).await else {
            panic!("expected rejection");
        };
        assert_eq!(reason, "cannot go to next question while not_started");

        drop(tx);
        let session = handle.await.unwrap();
        assert_eq!(session.phase(), SessionPhase::NotStarted);
    }
}

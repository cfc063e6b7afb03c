//! Pair-matching (memory) game: word tiles and meaning tiles picked two at a time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use lesson_core::Clock;
use lesson_core::model::{MediaRef, SessionPhase, TileId, VocabId, Vocabulary};
use lesson_core::time::Elapsed;

use crate::error::SessionError;
use crate::generator::QuestionGenerator;
use crate::scoreboard::Scoreboard;
use crate::sessions::SessionAction;
use crate::settings::GameSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileSide {
    Word,
    Meaning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub id: TileId,
    pub pair: VocabId,
    pub side: TileSide,
    pub text: String,
    pub image: Option<MediaRef>,
    pub matched: bool,
}

/// Result of selecting a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Not playing, tile already matched, or tile already face up.
    Ignored,
    /// First tile of a move is face up.
    Pending { tile: TileId },
    Matched { pair: VocabId },
    /// Both tiles turn face down again.
    Mismatched { first: TileId, second: TileId },
    /// Final pair matched; the timer has stopped.
    Completed {
        pair: VocabId,
        moves: u32,
        elapsed: Elapsed,
    },
}

pub struct MatchingBoard {
    vocab: Arc<Vocabulary>,
    generator: QuestionGenerator,
    count: Option<usize>,
    clock: Clock,
    phase: SessionPhase,
    tiles: Vec<Tile>,
    selected: Option<usize>,
    total_pairs: usize,
    matched_pairs: usize,
    moves: u32,
    scoreboard: Scoreboard,
    elapsed: Elapsed,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl MatchingBoard {
    #[must_use]
    pub fn new(vocab: Arc<Vocabulary>, settings: &GameSettings) -> Self {
        Self {
            vocab,
            generator: QuestionGenerator::new(),
            count: settings.question_count,
            clock: Clock::default(),
            phase: SessionPhase::NotStarted,
            tiles: Vec::new(),
            selected: None,
            total_pairs: 0,
            matched_pairs: 0,
            moves: 0,
            scoreboard: Scoreboard::new(settings.points_per_correct),
            elapsed: Elapsed::default(),
            started_at: None,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn with_generator(mut self, generator: QuestionGenerator) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Tile> {
        self.selected.and_then(|i| self.tiles.get(i))
    }

    #[must_use]
    pub fn total_pairs(&self) -> usize {
        self.total_pairs
    }

    #[must_use]
    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    /// Completed two-tile attempts.
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    #[must_use]
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    #[must_use]
    pub fn elapsed(&self) -> Elapsed {
        self.elapsed
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Deal a fresh shuffled board: one word tile and one meaning tile per item.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless not started, and
    /// `SessionError::Empty` when no pairs can be dealt.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::NotStarted {
            return Err(SessionError::InvalidTransition {
                action: SessionAction::Start,
                phase: self.phase,
            });
        }

        let picked = self.generator.pick(&self.vocab, None, self.count);
        if picked.is_empty() {
            return Err(SessionError::Empty);
        }

        let mut tiles = Vec::with_capacity(picked.len() * 2);
        for item in &picked {
            tiles.push((item.id(), TileSide::Word, item.word().to_owned(), None));
            tiles.push((
                item.id(),
                TileSide::Meaning,
                item.meaning().to_owned(),
                item.image().cloned(),
            ));
        }
        self.generator.shuffle(&mut tiles);
        let total_pairs = picked.len();

        self.reset_state();
        self.total_pairs = total_pairs;
        self.tiles = tiles
            .into_iter()
            .zip(0..)
            .map(|((pair, side, text, image), id)| Tile {
                id: TileId::new(id),
                pair,
                side,
                text,
                image,
                matched: false,
            })
            .collect();
        self.scoreboard
            .set_total_questions(u32::try_from(self.total_pairs).unwrap_or(u32::MAX));
        self.started_at = Some(self.clock.now());
        self.phase = SessionPhase::InProgress;

        info!(pairs = self.total_pairs, "matching board dealt");
        Ok(())
    }

    /// Turn a tile face up; the second tile of a move is resolved right away.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSuchTile` for an index outside the board.
    pub fn select(&mut self, index: usize) -> Result<Selection, SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Ok(Selection::Ignored);
        }
        let len = self.tiles.len();
        let Some(tile) = self.tiles.get(index) else {
            return Err(SessionError::NoSuchTile { index, len });
        };
        if tile.matched || self.selected == Some(index) {
            return Ok(Selection::Ignored);
        }

        let Some(first) = self.selected.take() else {
            self.selected = Some(index);
            return Ok(Selection::Pending { tile: tile.id });
        };

        self.moves = self.moves.saturating_add(1);
        let (a, b) = (&self.tiles[first], &self.tiles[index]);
        if a.pair == b.pair && a.side != b.side {
            let pair = a.pair;
            self.tiles[first].matched = true;
            self.tiles[index].matched = true;
            self.matched_pairs += 1;
            self.scoreboard.answer_correct();
            debug!(%pair, moves = self.moves, "pair matched");

            if self.matched_pairs == self.total_pairs {
                self.phase = SessionPhase::GameOver;
                self.completed_at = Some(self.clock.now());
                info!(moves = self.moves, elapsed = %self.elapsed, "matching board cleared");
                return Ok(Selection::Completed {
                    pair,
                    moves: self.moves,
                    elapsed: self.elapsed,
                });
            }
            Ok(Selection::Matched { pair })
        } else {
            let (first, second) = (a.id, b.id);
            self.scoreboard.answer_incorrect();
            Ok(Selection::Mismatched { first, second })
        }
    }

    pub fn restart(&mut self) {
        self.reset_state();
        self.phase = SessionPhase::NotStarted;
    }

    /// One second of play time. Returns whether the timer was running.
    pub fn tick(&mut self) -> bool {
        if self.phase.is_running() {
            self.elapsed.tick();
            true
        } else {
            false
        }
    }

    fn reset_state(&mut self) {
        self.tiles.clear();
        self.selected = None;
        self.total_pairs = 0;
        self.matched_pairs = 0;
        self.moves = 0;
        self.scoreboard.reset();
        self.elapsed = Elapsed::default();
        self.started_at = None;
        self.completed_at = None;
    }
}

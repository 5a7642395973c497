//! 根节点选步
//!
//! 对每个根走法独立调用一次搜索，各自使用完整的 (-∞, +∞) 窗口，
//! 根节点兄弟之间不传递 alpha/beta，只在各自子树内剪枝。

use protocol::{move_notation, ChessMove, Color, Game, GamePosition, DEFAULT_DEPTH, MAX_DEPTH};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::evaluate::Evaluator;
use crate::search::{Searcher, INFINITY};

/// AI 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// 请求未指定深度时使用
    pub default_depth: u8,
    /// 请求深度的上限
    pub max_depth: u8,
}

impl AiConfig {
    /// 应用默认深度并限制上限
    pub fn clamp_depth(&self, requested: Option<u32>) -> u8 {
        let limit = u32::from(self.max_depth);
        match requested {
            Some(depth) => depth.min(limit) as u8,
            None => self.default_depth.min(self.max_depth),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_DEPTH,
            max_depth: MAX_DEPTH,
        }
    }
}

/// 选中的走法
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedMove {
    pub mv: ChessMove,
    /// 坐标记谱，如 `e2e4`
    pub notation: String,
    /// 该走法的搜索分数（白方视角）
    pub score: i32,
}

/// AI 引擎
#[derive(Debug, Default)]
pub struct AiEngine {
    nodes_searched: u64,
}

impl AiEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析 FEN 并选出最佳走法
    ///
    /// 对局已结束或没有合法走法时返回 `Ok(None)`。
    pub fn select_move<R: Rng + ?Sized>(
        &mut self,
        fen: &str,
        depth: u8,
        rng: &mut R,
    ) -> Result<Option<SelectedMove>, AiError> {
        let mut game = Game::from_fen(fen).map_err(AiError::InvalidPosition)?;
        self.select_from(&mut game, depth, rng)
    }

    /// 在给定局面上选步，结束后局面恢复原状
    ///
    /// 深度 0 按深度 1 处理：根走法之后直接静态评估。
    pub fn select_from<P: GamePosition + ?Sized, R: Rng + ?Sized>(
        &mut self,
        position: &mut P,
        depth: u8,
        rng: &mut R,
    ) -> Result<Option<SelectedMove>, AiError> {
        self.nodes_searched = 0;

        if position.is_game_over() {
            return Ok(None);
        }

        let mut moves = position.legal_moves();
        if moves.is_empty() {
            return Ok(None);
        }

        // 打乱顺序，同分走法之间随机取舍
        moves.shuffle(rng);

        let mover = position.side_to_move();
        let child_depth = depth.saturating_sub(1);
        let mut searcher = Searcher::new();
        let mut best: Option<(ChessMove, i32)> = None;

        for mv in moves {
            let key = position.position_key();

            position.apply(mv);
            let maximizing = position.side_to_move() == Color::White;
            let result = searcher.search(position, child_depth, -INFINITY, INFINITY, maximizing);
            position.undo().map_err(AiError::undo_failed)?;

            if position.position_key() != key {
                return Err(AiError::internal(format!(
                    "position changed across apply/undo of {}",
                    move_notation(mv)
                )));
            }
            let score = result?;

            let improves = match best {
                None => true,
                Some((_, best_score)) => match mover {
                    Color::White => score > best_score,
                    Color::Black => score < best_score,
                },
            };
            if improves {
                best = Some((mv, score));
            }
        }

        self.nodes_searched = searcher.nodes_searched();

        Ok(best.map(|(mv, score)| {
            let notation = move_notation(mv);
            tracing::debug!(
                notation = %notation,
                score,
                nodes = self.nodes_searched,
                depth,
                "selected move"
            );
            SelectedMove {
                mv,
                notation,
                score,
            }
        }))
    }

    /// 最近一次选步搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

/// 解析 FEN 并做静态评估
pub fn evaluate_fen(fen: &str) -> Result<i32, AiError> {
    let game = Game::from_fen(fen).map_err(AiError::InvalidPosition)?;
    Ok(Evaluator::evaluate(&game))
}

//! 搜索引擎
//!
//! 固定深度 Minimax + Alpha-Beta 剪枝。分数始终是白方视角，
//! 白方层取最大值，黑方层取最小值。

use protocol::GamePosition;

use crate::error::AiError;
use crate::evaluate::Evaluator;

/// 搜索窗口的无穷大
pub const INFINITY: i32 = i32::MAX;

/// Alpha-Beta 搜索器
///
/// 在同一个局面实例上原地走子/撤销，不复制局面，也不跨调用缓存任何结果。
#[derive(Debug, Default)]
pub struct Searcher {
    nodes_searched: u64,
}

impl Searcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Alpha-Beta 搜索
    ///
    /// `alpha`/`beta` 分别是最大化方与最小化方已确保的分数；
    /// 一旦 `beta <= alpha`，剩余兄弟节点不可能影响结果，直接剪枝。
    pub fn search<P: GamePosition + ?Sized>(
        &mut self,
        position: &mut P,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> Result<i32, AiError> {
        self.nodes_searched += 1;

        if depth == 0 || position.is_game_over() {
            return Ok(Evaluator::evaluate(position));
        }

        if maximizing {
            let mut best = -INFINITY;
            for mv in position.legal_moves() {
                position.apply(mv);
                let score = self.search(position, depth - 1, alpha, beta, false);
                position.undo().map_err(AiError::undo_failed)?;
                let score = score?;

                best = best.max(score);
                alpha = alpha.max(score);
                if beta <= alpha {
                    break; // Beta 剪枝
                }
            }
            Ok(best)
        } else {
            let mut best = INFINITY;
            for mv in position.legal_moves() {
                position.apply(mv);
                let score = self.search(position, depth - 1, alpha, beta, true);
                position.undo().map_err(AiError::undo_failed)?;
                let score = score?;

                best = best.min(score);
                beta = beta.min(score);
                if beta <= alpha {
                    break; // Alpha 剪枝
                }
            }
            Ok(best)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{Color, Game, INITIAL_FEN};

    /// 不剪枝的完整 Minimax，作为对照
    fn minimax(game: &mut Game, depth: u8, maximizing: bool, nodes: &mut u64) -> i32 {
        *nodes += 1;
        if depth == 0 || game.is_game_over() {
            return Evaluator::evaluate(game);
        }

        let mut scores = Vec::new();
        for mv in game.legal_moves() {
            game.apply(mv);
            scores.push(minimax(game, depth - 1, !maximizing, nodes));
            game.undo().unwrap();
        }

        if maximizing {
            scores.into_iter().max().unwrap()
        } else {
            scores.into_iter().min().unwrap()
        }
    }

    const POSITIONS: [&str; 5] = [
        INITIAL_FEN,
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
        "6k1/5ppp/8/8/8/8/5PPP/R5K1 b - - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    ];

    #[test]
    fn test_pruning_matches_minimax() {
        for fen in POSITIONS {
            for depth in 1..=3 {
                let mut game = Game::from_fen(fen).unwrap();
                let maximizing = game.side_to_move() == Color::White;

                let mut nodes = 0;
                let expected = minimax(&mut game, depth, maximizing, &mut nodes);

                let mut searcher = Searcher::new();
                let score = searcher
                    .search(&mut game, depth, -INFINITY, INFINITY, maximizing)
                    .unwrap();

                assert_eq!(score, expected, "{} at depth {}", fen, depth);
                assert!(searcher.nodes_searched() <= nodes);
                assert_eq!(game.fen(), Game::from_fen(fen).unwrap().fen());
            }
        }
    }

    #[test]
    fn test_pruning_skips_nodes() {
        let mut game = Game::new();
        let mut nodes = 0;
        minimax(&mut game, 3, true, &mut nodes);

        let mut searcher = Searcher::new();
        searcher.search(&mut game, 3, -INFINITY, INFINITY, true).unwrap();
        assert!(searcher.nodes_searched() < nodes);
    }

    #[test]
    fn test_depth_zero_is_static_evaluation() {
        let mut game = Game::new();
        let mut searcher = Searcher::new();
        let score = searcher.search(&mut game, 0, -INFINITY, INFINITY, true).unwrap();
        assert_eq!(score, 200);
        assert_eq!(searcher.nodes_searched(), 1);
    }

    #[test]
    fn test_terminal_position_stops_search() {
        // 白方已被将死，搜索深度不影响结果
        let mut game =
            Game::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let mut searcher = Searcher::new();
        let score = searcher.search(&mut game, 3, -INFINITY, INFINITY, true).unwrap();
        assert_eq!(score, -crate::MATE_SCORE);
        assert_eq!(searcher.nodes_searched(), 1);
    }

    #[test]
    fn test_finds_mate_for_maximizer() {
        // 白方 Ra8 杀
        let mut game = Game::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mut searcher = Searcher::new();
        let score = searcher.search(&mut game, 2, -INFINITY, INFINITY, true).unwrap();
        assert_eq!(score, crate::MATE_SCORE);
    }
}

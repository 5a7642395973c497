//! 国际象棋 AI 引擎
//!
//! 包含:
//! - 棋局评估函数（子力 + 位置分 + 机动性）
//! - 固定深度 Minimax + Alpha-Beta 搜索
//! - 根节点选步（随机打破同分）

mod engine;
mod error;
mod evaluate;
mod search;

pub use engine::{evaluate_fen, AiConfig, AiEngine, SelectedMove};
pub use error::AiError;
pub use evaluate::{Evaluator, MATE_SCORE, MOBILITY_WEIGHT};
pub use search::{Searcher, INFINITY};

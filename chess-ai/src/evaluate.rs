//! 棋局评估函数

use protocol::{Color, GamePosition, Piece, Square, ALL_SQUARES};

/// 将死分值
pub const MATE_SCORE: i32 = 20000;

/// 每个合法走法的机动性加分
pub const MOBILITY_WEIGHT: i32 = 10;

/// 评估器
pub struct Evaluator;

/// 棋子位置分值表（白方使用原始索引，黑方使用 63 - 索引）
/// 索引为 rank * 8 + file，a1 = 0，h8 = 63
mod position_tables {
    #[rustfmt::skip]
    pub const PAWN: [i32; 64] = [
         0,  0,  0,  0,  0,  0,  0,  0,
        50, 50, 50, 50, 50, 50, 50, 50,
        10, 10, 20, 30, 30, 20, 10, 10,
         5,  5, 10, 25, 25, 10,  5,  5,
         0,  0,  0, 20, 20,  0,  0,  0,
         5, -5,-10,  0,  0,-10, -5,  5,
         5, 10, 10,-20,-20, 10, 10,  5,
         0,  0,  0,  0,  0,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const KNIGHT: [i32; 64] = [
        -50,-40,-30,-30,-30,-30,-40,-50,
        -40,-20,  0,  0,  0,  0,-20,-40,
        -30,  0, 10, 15, 15, 10,  0,-30,
        -30,  5, 15, 20, 20, 15,  5,-30,
        -30,  0, 15, 20, 20, 15,  0,-30,
        -30,  5, 10, 15, 15, 10,  5,-30,
        -40,-20,  0,  5,  5,  0,-20,-40,
        -50,-40,-30,-30,-30,-30,-40,-50,
    ];

    #[rustfmt::skip]
    pub const BISHOP: [i32; 64] = [
        -20,-10,-10,-10,-10,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5, 10, 10,  5,  0,-10,
        -10,  5,  5, 10, 10,  5,  5,-10,
        -10,  0, 10, 10, 10, 10,  0,-10,
        -10, 10, 10, 10, 10, 10, 10,-10,
        -10,  5,  0,  0,  0,  0,  5,-10,
        -20,-10,-10,-10,-10,-10,-10,-20,
    ];

    #[rustfmt::skip]
    pub const ROOK: [i32; 64] = [
         0,  0,  0,  0,  0,  0,  0,  0,
         5, 10, 10, 10, 10, 10, 10,  5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
        -5,  0,  0,  0,  0,  0,  0, -5,
         0,  0,  0,  5,  5,  0,  0,  0,
    ];

    #[rustfmt::skip]
    pub const QUEEN: [i32; 64] = [
        -20,-10,-10, -5, -5,-10,-10,-20,
        -10,  0,  0,  0,  0,  0,  0,-10,
        -10,  0,  5,  5,  5,  5,  0,-10,
         -5,  0,  5,  5,  5,  5,  0, -5,
          0,  0,  5,  5,  5,  5,  0, -5,
        -10,  5,  5,  5,  5,  5,  0,-10,
        -10,  0,  5,  0,  0,  0,  0,-10,
        -20,-10,-10, -5, -5,-10,-10,-20,
    ];

    #[rustfmt::skip]
    pub const KING: [i32; 64] = [
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -30,-40,-40,-50,-50,-40,-40,-30,
        -20,-30,-30,-40,-40,-30,-30,-20,
        -10,-20,-20,-20,-20,-20,-20,-10,
         20, 20,  0,  0,  0,  0, 20, 20,
         20, 30, 10,  0,  0, 10, 30, 20,
    ];
}

impl Evaluator {
    /// 评估局面（白方视角，正值对白方有利）
    ///
    /// 只依赖棋子分布、走子方和终局状态，不修改局面。
    pub fn evaluate<P: GamePosition + ?Sized>(position: &P) -> i32 {
        // 被将死的一方永远是当前走子方
        if position.is_checkmate() {
            return match position.side_to_move() {
                Color::White => -MATE_SCORE,
                Color::Black => MATE_SCORE,
            };
        }

        if position.is_stalemate()
            || position.is_insufficient_material()
            || position.is_threefold_repetition_claimable()
        {
            return 0;
        }

        let mut score = 0;
        for square in ALL_SQUARES {
            if let Some((piece, color)) = position.piece_at(square) {
                let piece_score = Self::evaluate_piece(square, piece, color);
                match color {
                    Color::White => score += piece_score,
                    Color::Black => score -= piece_score,
                }
            }
        }

        let mobility = position.legal_move_count() as i32 * MOBILITY_WEIGHT;
        match position.side_to_move() {
            Color::White => score + mobility,
            Color::Black => score - mobility,
        }
    }

    /// 子力基础分值
    pub fn piece_value(piece: Piece) -> i32 {
        match piece {
            Piece::Pawn => 100,
            Piece::Knight => 320,
            Piece::Bishop => 330,
            Piece::Rook => 500,
            Piece::Queen => 900,
            Piece::King => MATE_SCORE,
        }
    }

    /// 位置加成分
    pub fn position_bonus(square: Square, piece: Piece, color: Color) -> i32 {
        let index = match color {
            Color::White => square.to_index(),
            Color::Black => 63 - square.to_index(),
        };

        let table = match piece {
            Piece::Pawn => &position_tables::PAWN,
            Piece::Knight => &position_tables::KNIGHT,
            Piece::Bishop => &position_tables::BISHOP,
            Piece::Rook => &position_tables::ROOK,
            Piece::Queen => &position_tables::QUEEN,
            Piece::King => &position_tables::KING,
        };
        table[index]
    }

    fn evaluate_piece(square: Square, piece: Piece, color: Color) -> i32 {
        Self::piece_value(piece) + Self::position_bonus(square, piece, color)
    }
}

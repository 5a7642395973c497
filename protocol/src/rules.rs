//! 规则引擎适配层
//!
//! 走法生成与合法性判断交给 `chess` crate 的位棋盘实现，本模块补充:
//! - 原地走子/撤销（历史栈）
//! - 半回合计数与七十五步规则
//! - 重复局面判定（三次可申请、五次自动和棋）
//! - 子力不足判定
//! - 坐标记谱

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};

use crate::constants::SEVENTY_FIVE_MOVE_PLIES;
use crate::error::ChessError;

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// 浅色格位掩码（a1 为深色格）
const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;

/// 深色格位掩码
const DARK_SQUARES: u64 = !LIGHT_SQUARES;

/// 搜索与评估所依赖的局面接口
///
/// 同一个实例在搜索中被反复 `apply`/`undo`，实现方必须保证两者严格对称：
/// 任意一次 `apply` 之后紧跟 `undo`，局面的可观察状态与之前完全一致。
pub trait GamePosition {
    /// 当前走子方
    fn side_to_move(&self) -> Color;

    /// 当前局面的全部合法走法（顺序由走法生成器决定）
    fn legal_moves(&self) -> Vec<ChessMove>;

    /// 合法走法数量
    fn legal_move_count(&self) -> usize {
        self.legal_moves().len()
    }

    /// 原地执行一步走法
    fn apply(&mut self, mv: ChessMove);

    /// 撤销最近一次 `apply`
    fn undo(&mut self) -> Result<(), ChessError>;

    /// 指定格子上的棋子
    fn piece_at(&self, square: Square) -> Option<(Piece, Color)>;

    /// 局面哈希（包含走子方、易位权、吃过路兵）
    fn position_key(&self) -> u64;

    fn is_checkmate(&self) -> bool;

    fn is_stalemate(&self) -> bool;

    fn is_insufficient_material(&self) -> bool;

    fn is_threefold_repetition_claimable(&self) -> bool;

    /// 对局是否已自动结束（不含需要申请的和棋）
    fn is_game_over(&self) -> bool;
}

/// 历史栈中的一项
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// 可原地走子/撤销的对局
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    /// 距最近一次吃子或兵走动的半回合数
    halfmove_clock: u32,
    fullmove_number: u32,
    history: Vec<Snapshot>,
}

impl Game {
    /// 标准初始局面
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
            history: Vec::new(),
        }
    }

    /// 解析 FEN
    ///
    /// 缺省字段按常规补齐：走子方 `w`，易位权 `-`，过路兵 `-`，计数 `0 1`。
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let mut fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.is_empty() {
            return Err(ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        }
        if fields.len() > 6 {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected at most 6 fields, got {}", fields.len()),
            });
        }

        let halfmove_clock = parse_counter(fields.get(4).copied(), "halfmove clock", 0)?;
        let fullmove_number = parse_counter(fields.get(5).copied(), "fullmove number", 1)?.max(1);

        fields.truncate(4);
        let missing = 4 - fields.len();
        fields.extend_from_slice(&["w", "-", "-"][3 - missing..]);

        // 走法生成器对缺王等局面没有防护，先自行校验各字段
        let (placement, side, castling, en_passant) = (fields[0], fields[1], fields[2], fields[3]);
        let grid = parse_placement(placement)?;
        if side != "w" && side != "b" {
            return Err(invalid_fen(format!("Invalid side to move: {:?}", side)));
        }
        validate_castling(castling)?;
        validate_en_passant(en_passant, side, &grid)?;

        let board = Board::from_str(&fields.join(" ")).map_err(|e| ChessError::InvalidFen {
            reason: format!("rejected by move generator ({})", e),
        })?;

        Ok(Self {
            board,
            halfmove_clock,
            fullmove_number,
            history: Vec::new(),
        })
    }

    /// 导出 FEN
    pub fn fen(&self) -> String {
        // `Board` 的 Display 不记录计数，只取前四个字段
        let board_fen = self.board.to_string();
        let placement: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            placement.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// 已执行、尚未撤销的走法数
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// 当前局面在历史（含当前）中出现的次数
    pub fn repetition_count(&self) -> usize {
        self.occurrences(self.board.get_hash())
    }

    pub fn is_seventyfive_moves(&self) -> bool {
        self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES && self.board.status() == BoardStatus::Ongoing
    }

    pub fn is_fivefold_repetition(&self) -> bool {
        self.repetition_count() >= 5
    }

    fn occurrences(&self, key: u64) -> usize {
        let past = self
            .history
            .iter()
            .filter(|snapshot| snapshot.board.get_hash() == key)
            .count();
        past + usize::from(self.board.get_hash() == key)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// 单方是否子力不足以将死对方
    fn has_insufficient_material(&self, color: Color) -> bool {
        let board = &self.board;
        let ours = board.color_combined(color).0;
        let theirs = board.color_combined(!color).0;
        let pawns = board.pieces(Piece::Pawn).0;
        let knights = board.pieces(Piece::Knight).0;
        let bishops = board.pieces(Piece::Bishop).0;
        let rooks = board.pieces(Piece::Rook).0;
        let queens = board.pieces(Piece::Queen).0;
        let kings = board.pieces(Piece::King).0;

        if ours & (pawns | rooks | queens) != 0 {
            return false;
        }

        // 单马只能配合对方自己的子力形成杀局
        if ours & knights != 0 {
            return ours.count_ones() <= 2 && theirs & !kings & !queens == 0;
        }

        // 所有象都在同色格上时无法将死
        if ours & bishops != 0 {
            let same_color = bishops & DARK_SQUARES == 0 || bishops & LIGHT_SQUARES == 0;
            return same_color && pawns == 0 && knights == 0;
        }

        true
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl GamePosition for Game {
    fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    fn legal_move_count(&self) -> usize {
        MoveGen::new_legal(&self.board).len()
    }

    fn apply(&mut self, mv: ChessMove) {
        let zeroing = self.board.piece_on(mv.get_source()) == Some(Piece::Pawn)
            || self.board.piece_on(mv.get_dest()).is_some();

        self.history.push(self.snapshot());
        self.board = self.board.make_move_new(mv);

        self.halfmove_clock = if zeroing { 0 } else { self.halfmove_clock + 1 };
        if self.board.side_to_move() == Color::White {
            self.fullmove_number += 1;
        }
    }

    fn undo(&mut self) -> Result<(), ChessError> {
        let snapshot = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        self.board = snapshot.board;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.fullmove_number = snapshot.fullmove_number;
        Ok(())
    }

    fn piece_at(&self, square: Square) -> Option<(Piece, Color)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((piece, color))
    }

    fn position_key(&self) -> u64 {
        self.board.get_hash()
    }

    fn is_checkmate(&self) -> bool {
        self.board.status() == BoardStatus::Checkmate
    }

    fn is_stalemate(&self) -> bool {
        self.board.status() == BoardStatus::Stalemate
    }

    fn is_insufficient_material(&self) -> bool {
        self.has_insufficient_material(Color::White) && self.has_insufficient_material(Color::Black)
    }

    fn is_threefold_repetition_claimable(&self) -> bool {
        // 同一局面重复两次至少相隔四个半回合
        if self.history.len() < 4 {
            return false;
        }

        if self.repetition_count() >= 3 {
            return true;
        }

        // 下一步走成第三次重复也可以申请
        MoveGen::new_legal(&self.board)
            .any(|mv| self.occurrences(self.board.make_move_new(mv).get_hash()) >= 2)
    }

    fn is_game_over(&self) -> bool {
        self.board.status() != BoardStatus::Ongoing
            || self.is_insufficient_material()
            || self.halfmove_clock >= SEVENTY_FIVE_MOVE_PLIES
            || self.is_fivefold_repetition()
    }
}

/// 坐标记谱：起点 + 终点 + 升变字母（小写），如 `e2e4`、`e7e8q`
pub fn move_notation(mv: ChessMove) -> String {
    let mut notation = format!("{}{}", mv.get_source(), mv.get_dest());
    if let Some(piece) = mv.get_promotion() {
        notation.push(piece_letter(piece));
    }
    notation
}

/// 棋子的小写字母
pub fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// 棋盘网格，`grid[rank][file]`，rank 0 为第一横线
type Grid = [[Option<char>; 8]; 8];

fn invalid_fen(reason: String) -> ChessError {
    ChessError::InvalidFen { reason }
}

/// 解析棋子布局：8 行，每行 8 列，只允许标准棋子字母，双方各一王
fn parse_placement(placement: &str) -> Result<Grid, ChessError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid_fen(format!("Expected 8 ranks, got {}", ranks.len())));
    }

    let mut grid: Grid = [[None; 8]; 8];
    let mut white_kings = 0;
    let mut black_kings = 0;

    // FEN 从第八横线写到第一横线
    for (row_idx, row) in ranks.iter().enumerate() {
        let rank = 7 - row_idx;
        let mut file = 0usize;
        let mut previous_digit = false;

        for c in row.chars() {
            if let Some(empty) = c.to_digit(10) {
                if !(1..=8).contains(&empty) || previous_digit {
                    return Err(invalid_fen(format!("Invalid empty count in rank {}: {}", rank + 1, row)));
                }
                file += empty as usize;
                previous_digit = true;
            } else if "pnbrqkPNBRQK".contains(c) {
                if file >= 8 {
                    return Err(invalid_fen(format!("Rank {} has too many files", rank + 1)));
                }
                match c {
                    'K' => white_kings += 1,
                    'k' => black_kings += 1,
                    _ => {}
                }
                grid[rank][file] = Some(c);
                file += 1;
                previous_digit = false;
            } else {
                return Err(invalid_fen(format!("Invalid piece character: {:?}", c)));
            }
        }

        if file != 8 {
            return Err(invalid_fen(format!("Rank {} has {} files, expected 8", rank + 1, file)));
        }
    }

    if white_kings != 1 || black_kings != 1 {
        return Err(invalid_fen(format!(
            "Expected one king per side, got {} white and {} black",
            white_kings, black_kings
        )));
    }
    Ok(grid)
}

fn validate_castling(castling: &str) -> Result<(), ChessError> {
    if castling == "-" {
        return Ok(());
    }
    let mut seen = Vec::with_capacity(4);
    for c in castling.chars() {
        if !"KQkq".contains(c) || seen.contains(&c) {
            return Err(invalid_fen(format!("Invalid castling rights: {:?}", castling)));
        }
        seen.push(c);
    }
    Ok(())
}

/// 过路兵格必须在走子方对应的横线上，身后为空、前方是刚走两步的对方兵
fn validate_en_passant(field: &str, side: &str, grid: &Grid) -> Result<(), ChessError> {
    if field == "-" {
        return Ok(());
    }

    let err = || invalid_fen(format!("Invalid en passant square: {:?}", field));
    let mut chars = field.chars();
    let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
        (Some(f @ 'a'..='h'), Some(r @ '1'..='8'), None) => {
            (f as usize - 'a' as usize, r as usize - '1' as usize)
        }
        _ => return Err(err()),
    };

    // (目标格横线, 对方兵所在横线, 对方兵出发横线, 对方兵)
    let (target, pawn_rank, origin, pawn) = if side == "w" {
        (5, 4, 6, 'p')
    } else {
        (2, 3, 1, 'P')
    };
    if rank != target
        || grid[pawn_rank][file] != Some(pawn)
        || grid[rank][file].is_some()
        || grid[origin][file].is_some()
    {
        return Err(err());
    }
    Ok(())
}

fn parse_counter(field: Option<&str>, name: &str, default: u32) -> Result<u32, ChessError> {
    match field {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| ChessError::InvalidFen {
            reason: format!("Invalid {}: {:?}", name, text),
        }),
    }
}

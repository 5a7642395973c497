//! 国际象棋引擎共享协议库
//!
//! 包含:
//! - 规则引擎适配 (`Game`、`GamePosition`)：FEN、合法走法、走子/撤销、终局判定
//! - 请求/响应消息定义
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 帧编解码

mod constants;
mod error;
mod message;
mod rules;
mod transport;

pub use constants::*;
pub use error::{ChessError, ProtocolError, Result};
pub use message::{
    ClientMessage, EngineRequest, EngineResponse, ErrorCode, ErrorResponse, EvaluateRequest,
    EvaluateResponse, ServerMessage,
};
pub use rules::{move_notation, piece_letter, Game, GamePosition, INITIAL_FEN};
pub use transport::{
    encode_frame, Connection, Connector, FrameReader, FrameWriter, Listener, TcpConnection,
    TcpConnector, TcpListener,
};

/// 规则引擎使用的基础类型
pub use chess::{ChessMove, Color, Piece, Square, ALL_SQUARES};

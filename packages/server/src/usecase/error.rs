//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::ValueObjectError;

/// 接続受付時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("connection limit of {0} reached")]
    CapacityExceeded(usize),

    #[error("failed to register connection: {0}")]
    Registry(String),
}

/// ルーム参加時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("invalid join request: {0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(String),
}

/// ルーム宛てコマンドのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomCommandError {
    #[error("invalid request: {0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error("room '{0}' does not exist")]
    RoomNotFound(String),
}

/// ルーム詳細取得時のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room '{0}' does not exist")]
    RoomNotFound(String),
}

use thiserror::Error;

/// 牌堆操作失败的原因
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    /// 从空牌堆抽牌
    #[error("the deck is empty")]
    EmptyDeck,
    /// 违反前置条件的调用，属于调用方的编程错误
    #[error("invalid deck state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("not a card name: {0:?}")]
pub struct ParseCardError(pub(crate) String);

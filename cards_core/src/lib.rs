//! # 共享牌堆核心库
//!
//! 这个 `core` crate 包含一副被多个连接共享的扑克牌：
//! 牌的定义、带锁的牌堆及其洗牌算法，以及把命名动作
//! 串行地作用到牌堆上的控制器。
//! 它不做任何 I/O，可以被任何上层应用（如 HTTP 服务器）复用。

mod card;
mod controller;
mod deck;
mod error;

pub use card::*;

pub use controller::*;

pub use deck::*;

pub use error::*;

use crate::card::Card;
use crate::deck::{Deck, DeckGuard};
use crate::error::DeckError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

// --- 动作与结果 ---

/// 洗牌算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShuffleKind {
    Random,
    ThreeWayCut,
    Riffle,
}

/// 客户端可以请求的动作
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// 只报告当前状态
    Refresh,
    Draw,
    Reset,
    Shuffle(ShuffleKind),
    Find(Card),
    Shutdown,
}

/// 每次动作之后的状态快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cards_remaining: usize,
    pub discard: Option<Card>,
    pub message: Option<String>,
}

impl fmt::Display for ShuffleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            ShuffleKind::Random => "random",
            ShuffleKind::ThreeWayCut => "3-way-cut",
            ShuffleKind::Riffle => "riffle",
        })
    }
}

impl Snapshot {
    /// 牌堆图片：还有牌时显示牌背，空了显示空牌堆
    pub fn deck_filename(&self) -> &'static str {
        if self.cards_remaining > 0 {
            "res/deck.png"
        } else {
            "res/deck_empty.png"
        }
    }

    /// 弃牌区图片，弃牌区为空时是空白占位图
    pub fn discard_filename(&self) -> String {
        self.discard
            .map(|card| card.image_filename())
            .unwrap_or_else(|| "res/deck_blank.png".to_string())
    }

    pub fn cards_remaining_text(&self) -> String {
        format!("Cards Remaining: {}", self.cards_remaining)
    }
}

// --- 服务器端共享状态 ---

/// 牌堆之外的桌面状态：弃牌区和待显示的消息
#[derive(Debug, Default)]
struct Table {
    /// 最近抽出的一张牌
    discard: Option<Card>,
    /// 下一次渲染页面时显示一次，然后清空
    pending_message: Option<String>,
}

/// 把命名动作串行地作用到唯一的一副牌上。
///
/// 重要‼️：加锁顺序固定为 deck -> table，避免死锁。
/// 每个动作连同它的快照都在同一次持有牌堆锁期间完成，
/// 其他请求看不到执行到一半的状态。
pub struct DeckController {
    deck: Deck,
    table: Mutex<Table>,
}

impl DeckController {
    pub fn new(deck: Deck) -> DeckController {
        DeckController {
            deck,
            table: Mutex::new(Table::default()),
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// 执行一个动作并返回执行后的快照
    pub fn perform(&self, action: Action) -> Snapshot {
        let deck = self.deck.lock();
        debug!(?action, cards = deck.len(), "执行动作");

        let message = match action {
            Action::Refresh => None,
            Action::Draw => {
                match deck.draw() {
                    Ok(card) => self.table.lock().discard = Some(card),
                    // 空牌堆抽牌不做任何事
                    Err(DeckError::EmptyDeck) => debug!("牌堆已空，忽略抽牌"),
                    Err(e) => debug!(error = %e, "抽牌失败"),
                }
                None
            }
            Action::Reset => {
                deck.reset();
                deck.shuffle_random(&mut rand::rng());
                self.table.lock().discard = None;
                info!("牌堆已重置并洗牌");
                Some("Deck has been reset and shuffled".to_string())
            }
            Action::Shuffle(kind) => {
                shuffle(&deck, kind);
                Some(format!("Shuffled using {kind} algorithm"))
            }
            Action::Find(card) => {
                let message = match deck.find(&card) {
                    Some(position) => format!("{card} found at position {position}"),
                    None => format!("{card} not found in deck"),
                };
                self.table.lock().pending_message = Some(message.clone());
                Some(message)
            }
            Action::Shutdown => {
                info!("收到关闭请求");
                Some("HTTP server shut down".to_string())
            }
        };

        let mut table = self.table.lock();
        let message = match action {
            // 刷新片段时顺带把待显示的消息交给客户端
            Action::Refresh => table.pending_message.take(),
            Action::Find(_) => message,
            // 新动作的结果取代旧消息，旧消息不能留到下一次整页渲染
            _ => {
                table.pending_message = None;
                message
            }
        };
        Snapshot {
            cards_remaining: deck.len(),
            discard: table.discard,
            message,
        }
    }

    /// 整页渲染用的快照：带上待显示的消息并清空它
    pub fn page_state(&self) -> Snapshot {
        let deck = self.deck.lock();
        let mut table = self.table.lock();
        Snapshot {
            cards_remaining: deck.len(),
            discard: table.discard,
            message: table.pending_message.take(),
        }
    }

    /// 取走待显示的消息
    pub fn take_message(&self) -> Option<String> {
        let _deck = self.deck.lock();
        self.table.lock().pending_message.take()
    }
}

impl Default for DeckController {
    fn default() -> Self {
        DeckController::new(Deck::new())
    }
}

fn shuffle(deck: &DeckGuard<'_>, kind: ShuffleKind) {
    let mut rng = rand::rng();
    match kind {
        ShuffleKind::Random => deck.shuffle_random(&mut rng),
        ShuffleKind::Riffle => deck.shuffle_riffle(&mut rng),
        ShuffleKind::ThreeWayCut => {
            // 不足 3 张牌无法三段切牌，退化为随机洗牌
            if deck.len() < 3 {
                deck.shuffle_random(&mut rng);
            } else if let Err(e) = deck.shuffle_three_way_cut(&mut rng, None, None) {
                debug!(error = %e, "3-way cut 失败，改用随机洗牌");
                deck.shuffle_random(&mut rng);
            }
        }
    }
}

// --- 单元测试 ---

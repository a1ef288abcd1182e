use crate::card::{Card, DECK_SIZE};
use crate::error::DeckError;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use rand::Rng;
use rand::seq::SliceRandom;
use std::cell::RefCell;
use std::collections::HashSet;
use std::ops::Range;

/// riffle 时，一边比另一边多出这么多张牌后，只从多的一边放牌
const RIFFLE_IMBALANCE: isize = 5;

// --- riffle 的分牌过程 ---

/// riffle 中的一轮：右半先放，左半后放。
/// `size_difference` 是这一轮开始时右半剩余张数减去左半剩余张数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RiffleRound {
    size_difference: isize,
    from_right: usize,
    from_left: usize,
}

/// 决定分割点和每一轮从两半各放几张牌，`n` 至少为 2
fn riffle_rounds<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, Vec<RiffleRound>) {
    let mid = n / 2;
    let leeway = n / 10;
    let low = mid.saturating_sub(leeway).max(1);
    let high = (mid + leeway).min(n - 1);
    let split = rng.random_range(low..=high);

    // 两个计数器：左右两半还没放下的牌数
    let (mut remaining_left, mut remaining_right) = (split, n - split);
    let mut rounds = Vec::new();
    while remaining_left > 0 || remaining_right > 0 {
        let size_difference = remaining_right as isize - remaining_left as isize;
        let mut round = RiffleRound {
            size_difference,
            from_right: 0,
            from_left: 0,
        };
        if size_difference > -RIFFLE_IMBALANCE {
            round.from_right = rng.random_range(1..=3).min(remaining_right);
            remaining_right -= round.from_right;
        }
        if size_difference < RIFFLE_IMBALANCE {
            round.from_left = rng.random_range(1..=3).min(remaining_left);
            remaining_left -= round.from_left;
        }
        rounds.push(round);
    }
    (split, rounds)
}

// --- 牌堆内部缓冲区 ---

/// 有序的牌序列，索引 0 是牌底，最后一个元素是牌顶。
/// 只在 `Deck` 的锁内被访问。
#[derive(Debug, Clone, Default)]
struct Pile {
    cards: Vec<Card>,
}

impl Pile {
    fn reset(&mut self) {
        self.cards.clear();
        self.cards.extend(Card::canonical());
    }

    fn draw(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::EmptyDeck)
    }

    fn shuffle_random<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// 3-way cut：在两个切点把牌分成三段连续的牌，再以随机顺序拼回去。
    /// 每段内部的相对顺序保持不变，中间一段可以为空。
    fn shuffle_three_way_cut<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        split1: Option<usize>,
        split2: Option<usize>,
    ) -> Result<(), DeckError> {
        let n = self.cards.len();
        if n < 3 {
            return Err(DeckError::InvalidState(format!(
                "3-way cut needs at least 3 cards, deck has {n}"
            )));
        }

        let first = split1.unwrap_or_else(|| rng.random_range(0..=n - 2));
        if first > n {
            return Err(DeckError::InvalidState(format!(
                "first cut {first} is past the end of a {n}-card deck"
            )));
        }
        let second = split2.unwrap_or_else(|| rng.random_range(first..=(n - 1).max(first)));
        if second < first || second > n {
            return Err(DeckError::InvalidState(format!(
                "cut points ({first}, {second}) are out of order for a {n}-card deck"
            )));
        }

        let mut runs: [Range<usize>; 3] = [0..first, first..second, second..n];
        runs.shuffle(rng);
        let reassembled: Vec<Card> = runs
            .iter()
            .flat_map(|run| self.cards[run.clone()].iter().copied())
            .collect();
        self.cards = reassembled;
        Ok(())
    }

    /// riffle：在中点附近（±10%）随机分成两半，然后交替从两半的前端
    /// 各放下 1 到 3 张牌，直到两半都放完。
    /// 某一半剩余的牌多出另一半 5 张及以上时，另一半暂停放牌。
    fn shuffle_riffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let n = self.cards.len();
        if n <= 1 {
            return;
        }

        let (split, rounds) = riffle_rounds(n, rng);
        let (left, right) = self.cards.split_at(split);
        let mut riffled = Vec::with_capacity(n);
        let (mut taken_left, mut taken_right) = (0usize, 0usize);
        for round in &rounds {
            riffled.extend_from_slice(&right[taken_right..taken_right + round.from_right]);
            taken_right += round.from_right;
            riffled.extend_from_slice(&left[taken_left..taken_left + round.from_left]);
            taken_left += round.from_left;
        }

        self.cards = riffled;
    }

    /// 从牌顶数起的位置，牌顶是 1
    fn find(&self, card: &Card) -> Option<usize> {
        self.cards
            .iter()
            .rposition(|c| c == card)
            .map(|index| self.cards.len() - index)
    }
}

// --- 带锁的牌堆 ---

/// 多个连接共享的一副牌。
///
/// 牌序列只能通过锁访问，包括查询长度。锁是可重入的：
/// 已经持有 `DeckGuard` 的线程可以再次调用 `lock()` 或任何便捷方法而不会死锁。
/// 一次完整的操作（洗牌、抽牌）总是在同一次加锁中完成。
pub struct Deck {
    pile: ReentrantMutex<RefCell<Pile>>,
}

/// `Deck::lock` 返回的作用域守卫，离开作用域时释放锁
pub struct DeckGuard<'a> {
    pile: ReentrantMutexGuard<'a, RefCell<Pile>>,
}

impl Deck {
    /// 出厂状态的 52 张牌
    pub fn new() -> Deck {
        let mut pile = Pile::default();
        pile.reset();
        Deck::from_pile(pile)
    }

    /// 用任意一组不重复的牌构建牌堆，索引 0 是牌底
    pub fn from_cards(cards: Vec<Card>) -> Result<Deck, DeckError> {
        if cards.len() > DECK_SIZE {
            return Err(DeckError::InvalidState(format!(
                "a deck holds at most {DECK_SIZE} cards, got {}",
                cards.len()
            )));
        }
        let unique: HashSet<&Card> = cards.iter().collect();
        if unique.len() != cards.len() {
            return Err(DeckError::InvalidState("a deck may not hold duplicate cards".to_string()));
        }
        Ok(Deck::from_pile(Pile { cards }))
    }

    fn from_pile(pile: Pile) -> Deck {
        Deck {
            pile: ReentrantMutex::new(RefCell::new(pile)),
        }
    }

    /// 获取牌堆的锁，在返回的守卫存活期间其他线程无法访问牌堆
    pub fn lock(&self) -> DeckGuard<'_> {
        DeckGuard {
            pile: self.pile.lock(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn draw(&self) -> Result<Card, DeckError> {
        self.lock().draw()
    }

    pub fn shuffle_random(&self) {
        self.lock().shuffle_random(&mut rand::rng());
    }

    pub fn shuffle_three_way_cut(
        &self,
        split1: Option<usize>,
        split2: Option<usize>,
    ) -> Result<(), DeckError> {
        self.lock().shuffle_three_way_cut(&mut rand::rng(), split1, split2)
    }

    pub fn shuffle_riffle(&self) {
        self.lock().shuffle_riffle(&mut rand::rng());
    }

    pub fn find(&self, card: &Card) -> Option<usize> {
        self.lock().find(card)
    }

    /// 当前牌序的拷贝，牌底在前
    pub fn cards(&self) -> Vec<Card> {
        self.lock().cards()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Deck::new()
    }
}

impl DeckGuard<'_> {
    pub fn len(&self) -> usize {
        self.pile.borrow().cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pile.borrow().cards.is_empty()
    }

    /// 恢复成出厂顺序：梅花、方块、红心、黑桃，每种花色从 King 到 Ace
    pub fn reset(&self) {
        self.pile.borrow_mut().reset();
    }

    /// 取走牌顶的牌
    pub fn draw(&self) -> Result<Card, DeckError> {
        self.pile.borrow_mut().draw()
    }

    pub fn shuffle_random<R: Rng + ?Sized>(&self, rng: &mut R) {
        self.pile.borrow_mut().shuffle_random(rng);
    }

    /// 不指定切点时随机选取：`split1` 取自 `[0, n-2]`，`split2` 取自 `[split1, n-1]`。
    /// 少于 3 张牌时返回 `DeckError::InvalidState`，调用方应先检查长度。
    pub fn shuffle_three_way_cut<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        split1: Option<usize>,
        split2: Option<usize>,
    ) -> Result<(), DeckError> {
        self.pile.borrow_mut().shuffle_three_way_cut(rng, split1, split2)
    }

    pub fn shuffle_riffle<R: Rng + ?Sized>(&self, rng: &mut R) {
        self.pile.borrow_mut().shuffle_riffle(rng);
    }

    pub fn find(&self, card: &Card) -> Option<usize> {
        self.pile.borrow().find(card)
    }

    pub fn cards(&self) -> Vec<Card> {
        self.pile.borrow().cards.clone()
    }
}

// --- 单元测试 ---

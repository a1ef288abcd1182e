use crate::error::ParseCardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- 核心数据结构定义 ---

/// 花色 (Suit)
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Suit {
    Spade,   // 黑桃 ♠️
    Heart,   // 红心 ♥️
    Club,    // 梅花 ♣️
    Diamond, // 方块 ♦️
}

/// 点数 (Rank)
/// 取值 1..=13，Ace 为 1，King 为 13
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Rank {
    Ace = 1,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

/// 单张扑克牌 (Card)
/// 不可变的值对象，相等性由花色和点数共同决定
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

/// 一副标准牌中的牌数
pub const DECK_SIZE: usize = 52;

impl Suit {
    /// 出厂顺序：梅花、方块、红心、黑桃
    pub const CANONICAL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

    /// 复数形式的英文名，用于显示和图片文件名
    pub fn plural_name(self) -> &'static str {
        match self {
            Suit::Spade => "spades",
            Suit::Heart => "hearts",
            Suit::Club => "clubs",
            Suit::Diamond => "diamonds",
        }
    }

    fn from_plural_name(name: &str) -> Option<Suit> {
        Suit::CANONICAL.into_iter().find(|suit| suit.plural_name() == name)
    }
}

impl Rank {
    /// 出厂顺序：每个花色内从 King 到 Ace
    pub const DESCENDING: [Rank; 13] = [
        Rank::King, Rank::Queen, Rank::Jack, Rank::Ten, Rank::Nine, Rank::Eight, Rank::Seven,
        Rank::Six, Rank::Five, Rank::Four, Rank::Three, Rank::Two, Rank::Ace,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        Rank::DESCENDING.into_iter().find(|rank| rank.value() == value)
    }

    /// 人头牌和 Ace 用英文名，其余用数字
    pub fn name(self) -> String {
        match self {
            Rank::Ace => "ace".to_string(),
            Rank::Jack => "jack".to_string(),
            Rank::Queen => "queen".to_string(),
            Rank::King => "king".to_string(),
            other => other.value().to_string(),
        }
    }

    fn from_name(name: &str) -> Option<Rank> {
        match name {
            "ace" => Some(Rank::Ace),
            "jack" => Some(Rank::Jack),
            "queen" => Some(Rank::Queen),
            "king" => Some(Rank::King),
            digits => digits
                .parse::<u8>()
                .ok()
                .filter(|v| (2..=10).contains(v))
                .and_then(Rank::from_value),
        }
    }
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Card {
        Card { suit, rank }
    }

    /// 按出厂顺序依次产出 52 张不同的牌
    pub fn canonical() -> impl Iterator<Item = Card> {
        Suit::CANONICAL
            .into_iter()
            .flat_map(|suit| Rank::DESCENDING.into_iter().map(move |rank| Card { suit, rank }))
    }

    /// 这张牌对应的图片资源路径，例如 `res/card_spades_ace.png`
    pub fn image_filename(&self) -> String {
        format!("res/card_{}_{}.png", self.suit.plural_name(), self.rank.name())
    }
}

// --- 实现辅助功能 ---

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} of {}", self.rank.name(), self.suit.plural_name())
    }
}

/// 解析 `Display` 产生的格式，例如 "queen of hearts"
impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCardError(s.to_string());
        let (rank, suit) = s.split_once(" of ").ok_or_else(err)?;
        let rank = Rank::from_name(rank).ok_or_else(err)?;
        let suit = Suit::from_plural_name(suit).ok_or_else(err)?;
        Ok(Card { suit, rank })
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use Rank::*;
    use Suit::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Card::new(Club, Ace).to_string(), "ace of clubs");
        assert_eq!(Card::new(Spade, Two).to_string(), "2 of spades");
        assert_eq!(Card::new(Diamond, Ten).to_string(), "10 of diamonds");
        assert_eq!(Card::new(Heart, Jack).to_string(), "jack of hearts");
        assert_eq!(Card::new(Club, Queen).to_string(), "queen of clubs");
        assert_eq!(Card::new(Club, King).to_string(), "king of clubs");
    }

    #[test]
    fn test_parse_every_canonical_card() {
        for card in Card::canonical() {
            assert_eq!(card.to_string().parse::<Card>(), Ok(card));
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Card>().is_err());
        assert!("ace of cups".parse::<Card>().is_err());
        assert!("1 of spades".parse::<Card>().is_err());
        assert!("11 of spades".parse::<Card>().is_err());
        assert!("ace  of spades".parse::<Card>().is_err());
    }

    #[test]
    fn test_rank_values() {
        assert_eq!(Ace.value(), 1);
        assert_eq!(Ten.value(), 10);
        assert_eq!(King.value(), 13);
        assert_eq!(Rank::from_value(12), Some(Queen));
        assert_eq!(Rank::from_value(0), None);
        assert_eq!(Rank::from_value(14), None);
    }

    #[test]
    fn test_canonical_order() {
        let cards: Vec<Card> = Card::canonical().collect();
        assert_eq!(cards.len(), DECK_SIZE);
        assert_eq!(cards[0], Card::new(Club, King));
        assert_eq!(cards[12], Card::new(Club, Ace));
        assert_eq!(cards[13], Card::new(Diamond, King));
        assert_eq!(cards[51], Card::new(Spade, Ace));

        let unique: HashSet<Card> = cards.iter().copied().collect();
        assert_eq!(unique.len(), DECK_SIZE);
    }

    #[test]
    fn test_image_filename() {
        assert_eq!(Card::new(Spade, Ace).image_filename(), "res/card_spades_ace.png");
        assert_eq!(Card::new(Diamond, Seven).image_filename(), "res/card_diamonds_7.png");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Card::new(Heart, Queen)).unwrap();
        assert_eq!(json, r#"{"suit":"Heart","rank":"Queen"}"#);
    }
}

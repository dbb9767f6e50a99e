//! The holding slot and the side buffer.
//!
//! Both are bounded ordered card lists. They differ in when capacity is enforced:
//! the slot refuses a card it has no room for, the buffer accepts it and reports
//! the overflow afterwards.

use serde::Serialize;

use crate::board::TileId;
use crate::error::CapacityExceeded;

pub const DEFAULT_SLOT_CAPACITY: usize = 10;

/// A collected tile's character, remembering which tile it came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub character: char,
    pub tile_id: TileId,
}

impl Card {
    pub fn new(character: char, tile_id: TileId) -> Self {
        Self { character, tile_id }
    }
}

#[derive(Clone, Debug)]
pub struct Slot {
    cards: Vec<Card>,
    capacity: usize,
}

impl Slot {
    pub fn new(capacity: usize) -> Self {
        Self {
            cards: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.cards.len() >= self.capacity
    }

    pub fn room(&self) -> usize {
        self.capacity.saturating_sub(self.cards.len())
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn characters(&self) -> Vec<char> {
        self.cards.iter().map(|c| c.character).collect()
    }

    pub fn add(&mut self, card: Card) -> Result<(), CapacityExceeded> {
        if self.is_full() {
            return Err(CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.cards.push(card);
        Ok(())
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    /// Remove every listed index, highest first so earlier indices stay valid.
    /// Returns the removed cards in ascending index order.
    pub fn remove_indices(&mut self, indices: &[usize]) -> Vec<Card> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let mut removed: Vec<Card> = sorted.iter().rev().filter_map(|&i| self.remove_at(i)).collect();
        removed.reverse();
        removed
    }

    /// Up to `n` cards from the front.
    pub fn pop_first_n(&mut self, n: usize) -> Vec<Card> {
        let n = n.min(self.cards.len());
        self.cards.drain(..n).collect()
    }

    pub fn pop_last(&mut self) -> Option<Card> {
        self.cards.pop()
    }
}

/// Secondary holding area. `capacity` of `None` means the level has no buffer limit.
#[derive(Clone, Debug)]
pub struct Buffer {
    cards: Vec<Card>,
    capacity: Option<usize>,
}

impl Buffer {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            cards: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn characters(&self) -> Vec<char> {
        self.cards.iter().map(|c| c.character).collect()
    }

    /// Always inserts. Check [`Buffer::is_overflowing`] afterwards.
    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn extend(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.cards.extend(cards);
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Card> {
        (index < self.cards.len()).then(|| self.cards.remove(index))
    }

    pub fn is_overflowing(&self) -> bool {
        self.capacity.is_some_and(|cap| self.cards.len() > cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(s: &str) -> Vec<Card> {
        s.chars().enumerate().map(|(i, c)| Card::new(c, i)).collect()
    }

    #[test]
    fn slot_refuses_past_capacity() {
        let mut slot = Slot::new(2);
        for card in cards("一心") {
            slot.add(card).unwrap();
        }
        assert!(slot.is_full());
        assert_eq!(slot.add(Card::new('意', 9)), Err(CapacityExceeded { capacity: 2 }));
        assert_eq!(slot.len(), 2);
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut slot = Slot::new(usize::MAX);
        assert_eq!(slot.capacity(), usize::MAX);
        slot.add(Card::new('一', 0)).unwrap();
        assert!(!slot.is_full());
        assert_eq!(slot.room(), usize::MAX - 1);
    }

    #[test]
    fn remove_indices_handles_scattered_subset() {
        let mut slot = Slot::new(10);
        for card in cards("心山一意水一") {
            slot.add(card).unwrap();
        }
        let removed = slot.remove_indices(&[5, 0, 2, 3]);
        assert_eq!(removed.iter().map(|c| c.character).collect::<String>(), "心一意一");
        assert_eq!(slot.characters(), vec!['山', '水']);
    }

    #[test]
    fn pop_first_n_returns_what_is_there() {
        let mut slot = Slot::new(10);
        for card in cards("一心意") {
            slot.add(card).unwrap();
        }
        let front = slot.pop_first_n(4);
        assert_eq!(front.len(), 3);
        assert!(slot.is_empty());
        assert!(slot.remove_at(0).is_none());
    }

    #[test]
    fn buffer_reports_overflow_after_insert() {
        let mut buffer = Buffer::new(Some(10));
        buffer.extend(cards("一二三四五六七八九"));
        assert!(!buffer.is_overflowing());
        buffer.add(Card::new('十', 10));
        assert!(!buffer.is_overflowing());
        buffer.add(Card::new('百', 11));
        assert!(buffer.is_overflowing());
        assert_eq!(buffer.len(), 11);
    }

    #[test]
    fn unbounded_buffer_never_overflows() {
        let mut buffer = Buffer::new(None);
        buffer.extend(cards("一二三四五六七八九十百千万"));
        assert!(!buffer.is_overflowing());
        assert_eq!(buffer.remove_at(1).map(|c| c.character), Some('二'));
    }
}

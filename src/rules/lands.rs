//! Land drop selection.

use std::cmp::Reverse;

use crate::cards::CardId;
use crate::mana::ColorSet;
use crate::zones::BoardEconomy;

/// Pick the land to play this turn, if any.
///
/// Ranked by: adds a color the board needs but lacks, enters untapped,
/// color flexibility. The earliest card in hand wins remaining ties.
#[must_use]
pub fn choose_land(board: &BoardEconomy) -> Option<CardId> {
    let missing = board.colors_in_play().missing_from(board.deck().color_identity());
    board
        .hand_cards()
        .enumerate()
        .filter(|(_, (_, card))| card.is_land())
        .max_by_key(|(pos, (_, card))| {
            let produces = card.produces.unwrap_or(ColorSet::EMPTY);
            let adds_missing = missing.colors().any(|c| produces.satisfies(c));
            (adds_missing, !card.enters_tapped, produces.flexibility(), Reverse(*pos))
        })
        .map(|(_, (id, _))| id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::{Card, Deck};
    use crate::mana::{ManaColor, ManaCost};

    fn board(lands: Vec<Card>) -> BoardEconomy {
        let mut entries: Vec<(Card, usize)> = lands.into_iter().map(|c| (c, 1)).collect();
        entries.push((Card::creature("Frog", ManaCost::parse("{G}{U}").unwrap(), 2, 2), 1));
        let n = entries.len();
        let mut board = BoardEconomy::new(Arc::new(Deck::from_cards(entries)), 20, 20);
        board.draw(n).unwrap();
        board
    }

    fn chosen_name(board: &BoardEconomy) -> String {
        let id = choose_land(board).unwrap();
        board.deck().card(id).unwrap().name.clone()
    }

    #[test]
    fn test_prefers_missing_color() {
        let mut b = board(vec![
            Card::land("Forest", ManaColor::Green),
            Card::land("Island", ManaColor::Blue),
        ]);
        assert_eq!(chosen_name(&b), "Forest");
        b.begin_turn(1);
        let forest = choose_land(&b).unwrap();
        b.play_land(forest).unwrap();
        assert_eq!(chosen_name(&b), "Island");
    }

    #[test]
    fn test_prefers_untapped_then_flexible() {
        let b = board(vec![
            Card::land("Thornwood Falls", ManaColor::Green).entering_tapped(),
            Card::land("Forest", ManaColor::Green),
        ]);
        assert_eq!(chosen_name(&b), "Forest");

        let dual = Card::land("Breeding Pool", ManaColor::Green)
            .producing(ColorSet::from_colors([ManaColor::Green, ManaColor::Blue]), 1);
        let b = board(vec![Card::land("Forest", ManaColor::Green), dual]);
        assert_eq!(chosen_name(&b), "Breeding Pool");
    }

    #[test]
    fn test_no_land_in_hand() {
        let deck = Deck::from_cards([(Card::creature("Bear", ManaCost::generic(2), 2, 2), 3)]);
        let mut b = BoardEconomy::new(Arc::new(deck), 20, 20);
        b.draw(3).unwrap();
        assert_eq!(choose_land(&b), None);
    }
}

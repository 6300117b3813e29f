//! Rebuilds the derived `next`/`previous` links of a move tree.
//!
//! Links are a cache over the canonical nested lines. They are recomputed from
//! scratch by a single walk over the whole tree, so any component may clear
//! them and call [`link_line`] again.

use crate::domain::move_record::{Line, MoveId};

/// Link every move of `line` and, recursively, of all its variations.
///
/// `branch_point` becomes the `previous` of the first move: `None` for the
/// main line, the move the variation branches from otherwise. Empty
/// variation lines are dropped on the way.
pub fn link_line(line: &mut Line, branch_point: Option<MoveId>) {
    let ids: Vec<MoveId> = line.iter().map(|mv| mv.id).collect();

    for (i, mv) in line.iter_mut().enumerate() {
        mv.links.previous = if i == 0 { branch_point } else { Some(ids[i - 1]) };
        mv.links.next = ids.get(i + 1).copied();

        // An alternative to `mv` starts from the position before `mv`
        let branch = mv.links.previous;
        mv.variations.retain(|variation| !variation.is_empty());
        for variation in &mut mv.variations {
            link_line(variation, branch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::move_record::fixtures::{mv, with_variations};

    fn id(raw: u32) -> Option<MoveId> {
        Some(MoveId::new(raw))
    }

    #[test]
    fn test_link_main_line() {
        let mut line = vec![mv(0, "e4"), mv(1, "e5"), mv(2, "Nf3")];
        link_line(&mut line, None);

        assert_eq!(line[0].previous(), None);
        assert_eq!(line[0].next(), id(1));
        assert_eq!(line[1].previous(), id(0));
        assert_eq!(line[1].next(), id(2));
        assert_eq!(line[2].next(), None);
    }

    #[test]
    fn test_variation_links_to_branch_point() {
        // 1. e4 e5 (1... c5 2. Nf3) 2. Nf3
        let variation = vec![mv(1000, "c5"), mv(1001, "Nf3")];
        let mut line = vec![
            mv(0, "e4"),
            with_variations(mv(1, "e5"), vec![variation]),
            mv(2, "Nf3"),
        ];
        link_line(&mut line, None);

        let c5 = &line[1].variations[0][0];
        assert_eq!(c5.previous(), id(0), "first variation move points at e4, not e5");
        assert_eq!(c5.next(), id(1001));
        assert_eq!(line[1].variations[0][1].previous(), id(1000));
        assert_eq!(line[1].variations[0][1].next(), None);
        // Main line unaffected by the variation
        assert_eq!(line[0].next(), id(1));
    }

    #[test]
    fn test_variation_on_first_move_has_no_previous() {
        let mut line = vec![with_variations(mv(0, "e4"), vec![vec![mv(1000, "d4")]])];
        link_line(&mut line, None);
        assert_eq!(line[0].variations[0][0].previous(), None);
    }

    #[test]
    fn test_nested_variation_branch_point() {
        // 1. e4 e5 (1... c5 2. Nf3 (2. c3 d5)) 2. Nf3
        let nested = vec![mv(2000, "c3"), mv(2001, "d5")];
        let variation = vec![mv(1000, "c5"), with_variations(mv(1001, "Nf3"), vec![nested])];
        let mut line = vec![mv(0, "e4"), with_variations(mv(1, "e5"), vec![variation])];
        link_line(&mut line, None);

        let c3 = &line[1].variations[0][1].variations[0][0];
        assert_eq!(c3.previous(), id(1000));
        assert_eq!(c3.next(), id(2001));
    }

    #[test]
    fn test_empty_variations_dropped() {
        let mut line = vec![
            mv(0, "e4"),
            with_variations(mv(1, "e5"), vec![vec![], vec![mv(1000, "c5")], vec![]]),
        ];
        link_line(&mut line, None);
        assert_eq!(line[1].variations.len(), 1);
        assert_eq!(line[1].variations[0][0].san, "c5");
    }

    #[test]
    fn test_link_is_idempotent() {
        let mut line = vec![
            mv(0, "e4"),
            with_variations(mv(1, "e5"), vec![vec![mv(1000, "c5"), mv(1001, "Nf3")]]),
        ];
        link_line(&mut line, None);
        let once = line.clone();
        link_line(&mut line, None);
        assert_eq!(line, once);
    }
}

//! Myers diff: compute an [`EditScript`] between two sequences.
//!
//! The engine works in three steps:
//! 1. Trim the common prefix and suffix (cheap, covers most live updates)
//! 2. Find matching diagonals in the remainder with the linear-space
//!    middle-snake variant of Myers' O(ND) algorithm
//! 3. Turn the unmatched positions into range operations
//!
//! Operations come out as removals (from the end), moves, insertions
//! (ascending) and finally changes, expressed at their final positions.

use super::callback::ItemCallback;
use super::comparator::ItemComparator;
use super::error::DiffError;
use super::ops::{EditOp, EditScript};

/// A run of `len` matched items starting at `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Diagonal {
    x: usize,
    y: usize,
    len: usize,
}

/// Sub-problem: `old[old_start..old_end]` against `new[new_start..new_end]`.
#[derive(Debug, Clone, Copy)]
struct Range {
    old_start: usize,
    old_end: usize,
    new_start: usize,
    new_end: usize,
}

impl Range {
    const fn old_len(&self) -> usize {
        self.old_end - self.old_start
    }

    const fn new_len(&self) -> usize {
        self.new_end - self.new_start
    }
}

/// A path segment found by the middle-snake search, in forward coordinates.
#[derive(Debug, Clone, Copy)]
struct Snake {
    start_x: usize,
    start_y: usize,
    end_x: usize,
    end_y: usize,
    reverse: bool,
}

impl Snake {
    const fn diagonal_len(&self) -> usize {
        let dx = self.end_x - self.start_x;
        let dy = self.end_y - self.start_y;
        if dx < dy { dx } else { dy }
    }

    /// The matched part of the snake.
    ///
    /// A forward snake takes its single edit step first, a reverse snake
    /// takes it last.
    const fn to_diagonal(self) -> Diagonal {
        let dx = self.end_x - self.start_x;
        let dy = self.end_y - self.start_y;
        let len = self.diagonal_len();
        if dx == dy || self.reverse {
            Diagonal {
                x: self.start_x,
                y: self.start_y,
                len,
            }
        } else if dy > dx {
            Diagonal {
                x: self.start_x,
                y: self.start_y + 1,
                len,
            }
        } else {
            Diagonal {
                x: self.start_x + 1,
                y: self.start_y,
                len,
            }
        }
    }
}

/// Offset array indexed by diagonal `k` in `-max..=max`.
struct CenteredArray {
    data: Vec<isize>,
    mid: isize,
}

impl CenteredArray {
    fn new(max: usize) -> Self {
        let mid = isize::try_from(max).unwrap_or(isize::MAX - 2) + 1;
        Self {
            data: vec![0; max * 2 + 3],
            mid,
        }
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn get(&self, k: isize) -> isize {
        self.data[(k + self.mid) as usize]
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn set(&mut self, k: isize, value: isize) {
        self.data[(k + self.mid) as usize] = value;
    }
}

/// Compute the edit script that turns `old` into `new`.
///
/// # Arguments
///
/// * `old` - The currently displayed items
/// * `new` - The items to display next
/// * `comparator` - Identity, content and payload decisions
/// * `detect_moves` - Pair up removed and inserted copies of the same item
///   into [`EditOp::Move`] instead of a removal plus an insertion
///
/// # Errors
///
/// Fails with [`DiffError::AbsentItem`] if the comparator bridge is asked
/// about exactly one missing item.
pub fn compute_diff<T, C>(
    old: &[T],
    new: &[T],
    comparator: &C,
    detect_moves: bool,
) -> Result<EditScript<C::Payload>, DiffError>
where
    C: ItemComparator<T>,
{
    let cb = ItemCallback::new(old, new, comparator);
    let diagonals = find_diagonals(&cb)?;

    let mut old_to_new: Vec<Option<usize>> = vec![None; cb.old_len()];
    let mut new_to_old: Vec<Option<usize>> = vec![None; cb.new_len()];
    for diagonal in &diagonals {
        for offset in 0..diagonal.len {
            old_to_new[diagonal.x + offset] = Some(diagonal.y + offset);
            new_to_old[diagonal.y + offset] = Some(diagonal.x + offset);
        }
    }

    let mut moved = vec![false; cb.new_len()];
    if detect_moves {
        pair_moves(&cb, &mut old_to_new, &mut new_to_old, &mut moved)?;
    }

    let mut script = EditScript::new();
    emit_removals(&old_to_new, &mut script);
    emit_moves(&old_to_new, &new_to_old, &moved, &mut script);
    emit_insertions(&new_to_old, &mut script);
    emit_changes(&cb, &new_to_old, &mut script)?;
    Ok(script)
}

/// All matched diagonals, sorted by old position.
fn find_diagonals<T, C>(cb: &ItemCallback<'_, T, C>) -> Result<Vec<Diagonal>, DiffError>
where
    C: ItemComparator<T>,
{
    let old_len = cb.old_len();
    let new_len = cb.new_len();
    let mut diagonals = Vec::new();

    // Common prefix
    let mut prefix = 0;
    while prefix < old_len && prefix < new_len && cb.items_same(prefix, prefix)? {
        prefix += 1;
    }
    if prefix > 0 {
        diagonals.push(Diagonal {
            x: 0,
            y: 0,
            len: prefix,
        });
    }

    // Common suffix
    let mut suffix = 0;
    while suffix < old_len - prefix
        && suffix < new_len - prefix
        && cb.items_same(old_len - 1 - suffix, new_len - 1 - suffix)?
    {
        suffix += 1;
    }

    let middle = Range {
        old_start: prefix,
        old_end: old_len - suffix,
        new_start: prefix,
        new_end: new_len - suffix,
    };

    if middle.old_len() > 0 && middle.new_len() > 0 {
        let max = (middle.old_len() + middle.new_len()).div_ceil(2);
        let mut forward = CenteredArray::new(max);
        let mut backward = CenteredArray::new(max);
        let mut stack = vec![middle];

        while let Some(range) = stack.pop() {
            let Some(snake) = mid_point(cb, range, &mut forward, &mut backward)? else {
                continue;
            };
            if snake.diagonal_len() > 0 {
                diagonals.push(snake.to_diagonal());
            }
            stack.push(Range {
                old_start: range.old_start,
                old_end: snake.start_x,
                new_start: range.new_start,
                new_end: snake.start_y,
            });
            stack.push(Range {
                old_start: snake.end_x,
                old_end: range.old_end,
                new_start: snake.end_y,
                new_end: range.new_end,
            });
        }
    }

    if suffix > 0 {
        diagonals.push(Diagonal {
            x: old_len - suffix,
            y: new_len - suffix,
            len: suffix,
        });
    }

    diagonals.sort_unstable_by_key(|d| d.x);
    Ok(diagonals)
}

#[allow(clippy::cast_possible_wrap)]
const fn signed(value: usize) -> isize {
    value as isize
}

#[allow(clippy::cast_sign_loss)]
const fn unsigned(value: isize) -> usize {
    value as usize
}

/// Find the middle snake of the shortest edit path through `range`.
fn mid_point<T, C>(
    cb: &ItemCallback<'_, T, C>,
    range: Range,
    forward: &mut CenteredArray,
    backward: &mut CenteredArray,
) -> Result<Option<Snake>, DiffError>
where
    C: ItemComparator<T>,
{
    if range.old_len() < 1 || range.new_len() < 1 {
        return Ok(None);
    }
    let max = signed((range.old_len() + range.new_len()).div_ceil(2));
    forward.set(1, signed(range.old_start));
    backward.set(1, signed(range.old_end));

    for d in 0..max {
        if let Some(snake) = forward_step(cb, range, forward, backward, d)? {
            return Ok(Some(snake));
        }
        if let Some(snake) = backward_step(cb, range, forward, backward, d)? {
            return Ok(Some(snake));
        }
    }
    Ok(None)
}

fn forward_step<T, C>(
    cb: &ItemCallback<'_, T, C>,
    range: Range,
    forward: &mut CenteredArray,
    backward: &CenteredArray,
    d: isize,
) -> Result<Option<Snake>, DiffError>
where
    C: ItemComparator<T>,
{
    let delta = signed(range.old_len()) - signed(range.new_len());
    let check_overlap = delta.rem_euclid(2) == 1;
    let old_end = signed(range.old_end);
    let new_end = signed(range.new_end);

    let mut k = -d;
    while k <= d {
        let (start_x, mut x) = if k == -d || (k != d && forward.get(k + 1) > forward.get(k - 1)) {
            // Step down: insertion
            let x = forward.get(k + 1);
            (x, x)
        } else {
            // Step right: removal
            let x = forward.get(k - 1);
            (x, x + 1)
        };
        let mut y = signed(range.new_start) + (x - signed(range.old_start)) - k;
        let start_y = if d == 0 || x != start_x { y } else { y - 1 };

        while x < old_end && y < new_end && cb.items_same(unsigned(x), unsigned(y))? {
            x += 1;
            y += 1;
        }
        forward.set(k, x);

        if check_overlap {
            let backward_k = delta - k;
            if backward_k >= -d + 1 && backward_k <= d - 1 && backward.get(backward_k) <= x {
                return Ok(Some(Snake {
                    start_x: unsigned(start_x),
                    start_y: unsigned(start_y),
                    end_x: unsigned(x),
                    end_y: unsigned(y),
                    reverse: false,
                }));
            }
        }
        k += 2;
    }
    Ok(None)
}

fn backward_step<T, C>(
    cb: &ItemCallback<'_, T, C>,
    range: Range,
    forward: &CenteredArray,
    backward: &mut CenteredArray,
    d: isize,
) -> Result<Option<Snake>, DiffError>
where
    C: ItemComparator<T>,
{
    let delta = signed(range.old_len()) - signed(range.new_len());
    let check_overlap = delta.rem_euclid(2) == 0;
    let old_start = signed(range.old_start);
    let new_start = signed(range.new_start);

    let mut k = -d;
    while k <= d {
        let (start_x, mut x) = if k == -d || (k != d && backward.get(k + 1) < backward.get(k - 1)) {
            // Step up: insertion
            let x = backward.get(k + 1);
            (x, x)
        } else {
            // Step left: removal
            let x = backward.get(k - 1);
            (x, x - 1)
        };
        let mut y = signed(range.new_end) - ((signed(range.old_end) - x) - k);
        let start_y = if d == 0 || x != start_x { y } else { y + 1 };

        while x > old_start && y > new_start && cb.items_same(unsigned(x - 1), unsigned(y - 1))? {
            x -= 1;
            y -= 1;
        }
        backward.set(k, x);

        if check_overlap {
            let forward_k = delta - k;
            if forward_k >= -d && forward_k <= d && forward.get(forward_k) >= x {
                return Ok(Some(Snake {
                    start_x: unsigned(x),
                    start_y: unsigned(y),
                    end_x: unsigned(start_x),
                    end_y: unsigned(start_y),
                    reverse: true,
                }));
            }
        }
        k += 2;
    }
    Ok(None)
}

/// Pair unmatched old items with unmatched new items of the same identity.
fn pair_moves<T, C>(
    cb: &ItemCallback<'_, T, C>,
    old_to_new: &mut [Option<usize>],
    new_to_old: &mut [Option<usize>],
    moved: &mut [bool],
) -> Result<(), DiffError>
where
    C: ItemComparator<T>,
{
    let removed: Vec<usize> = (0..old_to_new.len())
        .filter(|&i| old_to_new[i].is_none())
        .collect();
    if removed.is_empty() {
        return Ok(());
    }

    for j in 0..new_to_old.len() {
        if new_to_old[j].is_some() {
            continue;
        }
        for &i in &removed {
            if old_to_new[i].is_none() && cb.items_same(i, j)? {
                old_to_new[i] = Some(j);
                new_to_old[j] = Some(i);
                moved[j] = true;
                break;
            }
        }
    }
    Ok(())
}

/// Remove unmatched old runs, last run first so earlier positions hold.
fn emit_removals<P>(old_to_new: &[Option<usize>], script: &mut EditScript<P>) {
    let mut end = old_to_new.len();
    while end > 0 {
        if old_to_new[end - 1].is_some() {
            end -= 1;
            continue;
        }
        let mut start = end - 1;
        while start > 0 && old_to_new[start - 1].is_none() {
            start -= 1;
        }
        script.push(EditOp::Remove {
            position: start,
            count: end - start,
        });
        end = start;
    }
}

/// Move each moved item right behind its nearest kept predecessor in the new order.
///
/// Processing moves in ascending new order leaves the surviving items in
/// exactly the new order, so insertions can use final positions.
fn emit_moves<P>(
    old_to_new: &[Option<usize>],
    new_to_old: &[Option<usize>],
    moved: &[bool],
    script: &mut EditScript<P>,
) {
    if !moved.contains(&true) {
        return;
    }
    // Surviving old items, in display order after removals
    let mut live: Vec<usize> = (0..old_to_new.len())
        .filter(|&i| old_to_new[i].is_some())
        .collect();
    let mut predecessor: Option<usize> = None;

    for (j, source) in new_to_old.iter().enumerate() {
        let Some(i) = *source else {
            continue;
        };
        if moved[j] {
            if let Some(from) = live.iter().position(|&x| x == i) {
                live.remove(from);
                let to = predecessor
                    .and_then(|p| live.iter().position(|&x| x == p))
                    .map_or(0, |p| p + 1);
                live.insert(to, i);
                if from != to {
                    script.push(EditOp::Move { from, to });
                }
            }
        }
        predecessor = Some(i);
    }
}

/// Insert unmatched new runs at their final positions.
fn emit_insertions<P>(new_to_old: &[Option<usize>], script: &mut EditScript<P>) {
    let mut j = 0;
    while j < new_to_old.len() {
        if new_to_old[j].is_some() {
            j += 1;
            continue;
        }
        let start = j;
        while j < new_to_old.len() && new_to_old[j].is_none() {
            j += 1;
        }
        script.push(EditOp::Insert {
            position: start,
            count: j - start,
        });
    }
}

/// Report matched items whose content changed, merging payload-less neighbours.
fn emit_changes<T, C>(
    cb: &ItemCallback<'_, T, C>,
    new_to_old: &[Option<usize>],
    script: &mut EditScript<C::Payload>,
) -> Result<(), DiffError>
where
    C: ItemComparator<T>,
{
    let mut pending: Option<EditOp<C::Payload>> = None;

    for (j, source) in new_to_old.iter().enumerate() {
        let Some(i) = *source else {
            continue;
        };
        if cb.contents_same(i, j)? {
            continue;
        }
        let payload = cb.payload(i, j)?;

        if let Some(EditOp::Change {
            position,
            count,
            payload: None,
        }) = pending.as_mut()
        {
            if payload.is_none() && *position + *count == j {
                *count += 1;
                continue;
            }
        }
        if let Some(op) = pending.take() {
            script.push(op);
        }
        pending = Some(EditOp::Change {
            position: j,
            count: 1,
            payload,
        });
    }

    if let Some(op) = pending {
        script.push(op);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{EqComparator, KeyComparator};

    /// Replay `script` on `old` and fill inserted slots from `new`.
    fn replay<T: Clone>(old: &[T], new: &[T], script: &EditScript<()>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = old.iter().cloned().map(Some).collect();
        script.apply_to(&mut slots, |_| None);
        slots
            .into_iter()
            .enumerate()
            .map(|(j, slot)| slot.unwrap_or_else(|| new[j].clone()))
            .collect()
    }

    fn check(old: &str, new: &str, detect_moves: bool) -> EditScript<()> {
        let old: Vec<char> = old.chars().collect();
        let new: Vec<char> = new.chars().collect();
        let script = compute_diff(&old, &new, &EqComparator, detect_moves).unwrap();
        assert_eq!(replay(&old, &new, &script), new, "script: {script:?}");
        script
    }

    #[test]
    fn test_identical_is_empty() {
        assert!(check("abcdef", "abcdef", true).is_empty());
        assert!(check("", "", true).is_empty());
    }

    #[test]
    fn test_remove_b_insert_d() {
        let script = check("abc", "acd", false);

        assert_eq!(
            script.ops(),
            &[
                EditOp::Remove {
                    position: 1,
                    count: 1
                },
                EditOp::Insert {
                    position: 2,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_from_and_to_empty() {
        let script = check("", "xyz", true);
        assert_eq!(
            script.ops(),
            &[EditOp::Insert {
                position: 0,
                count: 3
            }]
        );

        let script = check("xyz", "", true);
        assert_eq!(
            script.ops(),
            &[EditOp::Remove {
                position: 0,
                count: 3
            }]
        );
    }

    #[test]
    fn test_removals_run_from_the_end() {
        let script = check("aXbYYc", "abc", false);

        assert_eq!(
            script.ops(),
            &[
                EditOp::Remove {
                    position: 3,
                    count: 2
                },
                EditOp::Remove {
                    position: 1,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_rotation_is_a_single_move() {
        let script = check("abc", "bca", true);

        assert_eq!(script.ops(), &[EditOp::Move { from: 0, to: 2 }]);
    }

    #[test]
    fn test_moves_disabled_removes_and_inserts() {
        let script = check("abc", "bca", false);

        assert!(script
            .ops()
            .iter()
            .all(|op| !matches!(op, EditOp::Move { .. })));
    }

    #[test]
    fn test_mixed_edits_replay() {
        let cases = [
            ("abcabba", "cbabac"),
            ("kitten", "sitting"),
            ("the quick brown fox", "quick brown the fox jumps"),
            ("aaaa", "aa"),
            ("abcdefgh", "hgfedcba"),
            ("xabcx", "abc"),
            ("a", "b"),
        ];
        for (old, new) in cases {
            check(old, new, true);
            check(old, new, false);
        }
    }

    #[test]
    fn test_content_changes_use_final_positions() {
        let old = vec![(1, "a"), (2, "b"), (3, "c"), (4, "d")];
        let new = vec![(0, "new"), (1, "a"), (2, "B"), (3, "C"), (4, "d")];
        let cmp = KeyComparator::new(|row: &(i32, &str)| row.0);

        let script = compute_diff(&old, &new, &cmp, true).unwrap();

        assert_eq!(
            script.ops(),
            &[
                EditOp::Insert {
                    position: 0,
                    count: 1
                },
                EditOp::Change {
                    position: 2,
                    count: 2,
                    payload: None
                },
            ]
        );
    }

    struct LabelPayload;

    impl ItemComparator<(u8, char)> for LabelPayload {
        type Payload = char;

        fn are_items_same(&self, old: &(u8, char), new: &(u8, char)) -> bool {
            old.0 == new.0
        }

        fn are_contents_same(&self, old: &(u8, char), new: &(u8, char)) -> bool {
            old.1 == new.1
        }

        fn change_payload(&self, _old: &(u8, char), new: &(u8, char)) -> Option<char> {
            Some(new.1)
        }
    }

    #[test]
    fn test_changes_with_payload_are_not_merged() {
        let old = [(1, 'a'), (2, 'b')];
        let new = [(1, 'x'), (2, 'y')];

        let script = compute_diff(&old, &new, &LabelPayload, true).unwrap();

        assert_eq!(
            script.ops(),
            &[
                EditOp::Change {
                    position: 0,
                    count: 1,
                    payload: Some('x')
                },
                EditOp::Change {
                    position: 1,
                    count: 1,
                    payload: Some('y')
                },
            ]
        );
    }

    #[test]
    fn test_self_diff_only_reports_content() {
        let items = [(1, 'a'), (2, 'b')];

        let script = compute_diff(&items, &items, &LabelPayload, true).unwrap();

        assert!(script.is_empty());
    }
}

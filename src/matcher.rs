//! Idiom completion: does the slot hold, by multiplicity, every character of some
//! target idiom, and if so which slot entries make it up.

use std::collections::HashMap;

/// A satisfiable idiom and the slot indices (ascending) that complete it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub idiom_index: usize,
    pub indices: Vec<usize>,
}

pub fn char_counts(chars: impl IntoIterator<Item = char>) -> HashMap<char, usize> {
    let mut counts = HashMap::new();
    for ch in chars {
        *counts.entry(ch).or_insert(0) += 1;
    }
    counts
}

fn satisfiable(available: &HashMap<char, usize>, required: &HashMap<char, usize>) -> bool {
    !required.is_empty()
        && required
            .iter()
            .all(|(ch, need)| available.get(ch).copied().unwrap_or(0) >= *need)
}

/// First target (in list order) whose characters the slot covers.
///
/// Indices are claimed walking the slot front to back, so when the slot holds
/// extra copies of a character the earliest ones are consumed.
pub fn find_completion<T: AsRef<str>>(slot: &[char], targets: &[T]) -> Option<Completion> {
    let available = char_counts(slot.iter().copied());
    targets.iter().enumerate().find_map(|(idiom_index, idiom)| {
        let mut required = char_counts(idiom.as_ref().chars());
        if !satisfiable(&available, &required) {
            return None;
        }
        let mut indices = Vec::new();
        for (i, ch) in slot.iter().enumerate() {
            if let Some(need) = required.get_mut(ch) {
                if *need > 0 {
                    *need -= 1;
                    indices.push(i);
                }
            }
        }
        Some(Completion { idiom_index, indices })
    })
}

pub fn has_completable_idiom<T: AsRef<str>>(slot: &[char], targets: &[T]) -> bool {
    find_completion(slot, targets).is_some()
}

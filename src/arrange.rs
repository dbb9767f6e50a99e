//! Character arrangement: decides which character lands on which board placement.
//!
//! Difficulty picks a placement strategy:
//!
//! | difficulty | strategy                                                        |
//! |-----------:|-----------------------------------------------------------------|
//! | 1          | sequential, pool order onto canonical placement order           |
//! | 2, 3       | a fixed number of idioms concentrated in paired top layers      |
//! | 4          | one idiom anchored in the topmost layer, everything else random |
//! | 5..=9      | gradual shuffle of the pool, then sequential                    |
//! | 10         | grouped shuffle of the pool, then sequential                    |
//!
//! Canonical placement order is layer ascending, positions in layout order.
//! Every placement receives exactly one character. A pool that does not match the
//! placement count is cycled (or truncated) to fit so the board is always full.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::board::{Placement, Position};

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 10;

/// Characters per group in the grouped shuffle (one four-character idiom).
pub const GROUP_SIZE: usize = 4;
/// Random group swaps applied after the grouped shuffle.
const GROUP_PERTURB_SWAPS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Sequential,
    Concentrated { idioms: usize },
    SingleAnchor,
    Gradual,
    Grouped,
}

pub fn clamp_difficulty(difficulty: u8) -> u8 {
    difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY)
}

pub fn strategy_for(difficulty: u8) -> Strategy {
    match clamp_difficulty(difficulty) {
        1 => Strategy::Sequential,
        2 => Strategy::Concentrated { idioms: 16 },
        3 => Strategy::Concentrated { idioms: 7 },
        4 => Strategy::SingleAnchor,
        10 => Strategy::Grouped,
        _ => Strategy::Gradual,
    }
}

/// Shuffle intensity in `0.0..=1.0` for a difficulty.
pub fn intensity(difficulty: u8) -> f64 {
    f64::from(clamp_difficulty(difficulty) - 1) / 9.0
}

/// Assign one character from `pool` to every placement in `positions_by_layer`.
///
/// `idiom_groups` lists each idiom's characters; the concentrated and anchor
/// strategies draw whole idioms from it, the rest ignore it.
pub fn arrange<R: Rng + ?Sized>(
    pool: &[char],
    positions_by_layer: &BTreeMap<u32, Vec<Position>>,
    difficulty: u8,
    idiom_groups: &[Vec<char>],
    rng: &mut R,
) -> BTreeMap<Placement, char> {
    let placements = canonical_placements(positions_by_layer);
    if pool.is_empty() {
        log::warn!("arrange called with an empty pool; {} placements left unassigned", placements.len());
        return BTreeMap::new();
    }
    let mut chars = fit_pool(pool, placements.len());
    let strategy = strategy_for(difficulty);
    log::debug!(
        "arranging {} characters at difficulty {} with {:?}",
        chars.len(),
        difficulty,
        strategy
    );

    match strategy {
        Strategy::Sequential => placements.into_iter().zip(chars).collect(),
        Strategy::Gradual => {
            gradual_shuffle(&mut chars, intensity(difficulty), rng);
            placements.into_iter().zip(chars).collect()
        }
        Strategy::Grouped => {
            grouped_shuffle(&mut chars, GROUP_SIZE, rng);
            placements.into_iter().zip(chars).collect()
        }
        Strategy::Concentrated { idioms } => {
            let pairs: Vec<Vec<u32>> = top_down_layers(positions_by_layer)
                .chunks(2)
                .map(<[u32]>::to_vec)
                .collect();
            place_with_reserved(chars, &placements, positions_by_layer, &pairs, idioms, idiom_groups, rng)
        }
        Strategy::SingleAnchor => {
            let singles: Vec<Vec<u32>> = top_down_layers(positions_by_layer)
                .into_iter()
                .map(|l| vec![l])
                .collect();
            place_with_reserved(chars, &placements, positions_by_layer, &singles, 1, idiom_groups, rng)
        }
    }
}

fn canonical_placements(positions_by_layer: &BTreeMap<u32, Vec<Position>>) -> Vec<Placement> {
    positions_by_layer
        .iter()
        .flat_map(|(&layer, positions)| positions.iter().map(move |&position| Placement { position, layer }))
        .collect()
}

fn top_down_layers(positions_by_layer: &BTreeMap<u32, Vec<Position>>) -> Vec<u32> {
    positions_by_layer.keys().rev().copied().collect()
}

/// Cycle or truncate `pool` to exactly `len` entries.
pub fn fit_pool(pool: &[char], len: usize) -> Vec<char> {
    if pool.len() != len {
        log::warn!("character pool has {} entries for {} placements; cycling to fit", pool.len(), len);
    }
    pool.iter().copied().cycle().take(len).collect()
}

/// Reserve whole idioms inside layer groups (`zones`, topmost first), then scatter
/// every remaining character over the remaining placements.
///
/// An idiom never straddles two zones: if the current zone lacks room the next one
/// down is used. Idioms whose characters are no longer in the pool are skipped.
fn place_with_reserved<R: Rng + ?Sized>(
    mut chars: Vec<char>,
    placements: &[Placement],
    positions_by_layer: &BTreeMap<u32, Vec<Position>>,
    zones: &[Vec<u32>],
    wanted: usize,
    idiom_groups: &[Vec<char>],
    rng: &mut R,
) -> BTreeMap<Placement, char> {
    let mut free_by_zone: Vec<Vec<Placement>> = zones
        .iter()
        .map(|layers| {
            let mut free: Vec<Placement> = layers
                .iter()
                .flat_map(|&layer| {
                    positions_by_layer
                        .get(&layer)
                        .into_iter()
                        .flatten()
                        .map(move |&position| Placement { position, layer })
                })
                .collect();
            free.shuffle(rng);
            free
        })
        .collect();

    let mut order: Vec<usize> = (0..idiom_groups.len()).collect();
    order.shuffle(rng);

    let mut assignment = BTreeMap::new();
    let mut zone = 0;
    let mut placed = 0;
    for idx in order {
        if placed == wanted {
            break;
        }
        let group = &idiom_groups[idx];
        if group.is_empty() {
            continue;
        }
        while zone < free_by_zone.len() && free_by_zone[zone].len() < group.len() {
            zone += 1;
        }
        if zone == free_by_zone.len() {
            break;
        }
        if !take_all(&mut chars, group) {
            continue;
        }
        let mut local = group.clone();
        local.shuffle(rng);
        for ch in local {
            if let Some(slot) = free_by_zone[zone].pop() {
                assignment.insert(slot, ch);
            }
        }
        placed += 1;
    }
    log::debug!("reserved {placed} of {wanted} idioms in top layers");

    chars.shuffle(rng);
    let rest = placements.iter().filter(|p| !assignment.contains_key(*p)).copied();
    let scattered: Vec<(Placement, char)> = rest.zip(chars).collect();
    assignment.extend(scattered);
    assignment
}

/// Remove one occurrence of each of `wanted` from `chars`, all or nothing.
fn take_all(chars: &mut Vec<char>, wanted: &[char]) -> bool {
    let mut indices = Vec::with_capacity(wanted.len());
    for ch in wanted {
        let found = chars
            .iter()
            .enumerate()
            .position(|(i, c)| c == ch && !indices.contains(&i));
        match found {
            Some(i) => indices.push(i),
            None => return false,
        }
    }
    indices.sort_unstable_by(|a, b| b.cmp(a));
    for i in indices {
        chars.remove(i);
    }
    true
}

/// Difficulty-driven in-place reorder used by the board reshuffle action.
/// Difficulty 1 leaves the order alone.
pub fn shuffle_by_difficulty<T, R: Rng + ?Sized>(items: &mut Vec<T>, difficulty: u8, rng: &mut R) {
    match clamp_difficulty(difficulty) {
        1 => {}
        10 => grouped_shuffle(items, GROUP_SIZE, rng),
        d => gradual_shuffle(items, intensity(d), rng),
    }
}

/// Bounded local swaps. `intensity` in `0.0..=1.0` scales both the number of
/// passes and how far each swap may reach back; zero never swaps.
pub fn gradual_shuffle<T, R: Rng + ?Sized>(items: &mut [T], intensity: f64, rng: &mut R) {
    let n = items.len();
    if n < 2 {
        return;
    }
    let intensity = intensity.clamp(0.0, 1.0);
    let rounds = (n as f64 * intensity * 2.0).floor() as usize;
    for _ in 0..rounds {
        for i in (1..n).rev() {
            let reach = ((i as f64 * intensity * 0.5).floor() as usize).max(1);
            let lo = i.saturating_sub(reach);
            let j = lo + rng.gen_range(0..=reach);
            items.swap(i, j.min(i));
        }
    }
}

/// Split into `group_size` chunks, scramble about half of them internally, keep the
/// rest intact, then lightly reorder the chunks.
pub fn grouped_shuffle<T, R: Rng + ?Sized>(items: &mut Vec<T>, group_size: usize, rng: &mut R) {
    if items.len() < 2 || group_size == 0 {
        return;
    }
    let mut drain = std::mem::take(items).into_iter();
    let mut groups: Vec<Vec<T>> = Vec::new();
    loop {
        let group: Vec<T> = drain.by_ref().take(group_size).collect();
        if group.is_empty() {
            break;
        }
        groups.push(group);
    }

    let total = groups.len();
    let keep = total / 2;
    let kept = rand::seq::index::sample(rng, total, keep).into_vec();
    for (idx, group) in groups.iter_mut().enumerate() {
        if !kept.contains(&idx) {
            group.shuffle(rng);
        }
    }
    if total > 1 {
        for _ in 0..GROUP_PERTURB_SWAPS {
            let a = rng.gen_range(0..total);
            let b = rng.gen_range(0..total);
            groups.swap(a, b);
        }
    }
    items.extend(groups.into_iter().flatten());
}

//! Preview resolution selection.

/// Smallest side a preview may have, whatever the classifier asks for.
pub const MINIMUM_PREVIEW_SIZE: u32 = 320;

fn area((w, h): (u32, u32)) -> u64 {
    w as u64 * h as u64
}

fn join(sizes: &[(u32, u32)]) -> String {
    sizes
        .iter()
        .map(|(w, h)| format!("{w}x{h}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pick a capture size from the resolutions a camera offers.
///
/// Returns `desired` when it is offered. Otherwise returns the smallest-area
/// choice whose sides are both at least
/// `max(min(desired), MINIMUM_PREVIEW_SIZE)`, falling back to the first
/// choice when none qualifies. `None` only for an empty list.
pub fn choose_optimal_size(choices: &[(u32, u32)], desired: (u32, u32)) -> Option<(u32, u32)> {
    let first = *choices.first()?;
    let min_size = desired.0.min(desired.1).max(MINIMUM_PREVIEW_SIZE);

    let (big_enough, too_small): (Vec<_>, Vec<_>) = choices
        .iter()
        .copied()
        .partition(|&(w, h)| w >= min_size && h >= min_size);

    log::info!(
        "Desired size: {}x{}, min size: {min_size}x{min_size}",
        desired.0,
        desired.1
    );
    log::info!("Valid preview sizes: [{}]", join(&big_enough));
    log::info!("Rejected preview sizes: [{}]", join(&too_small));

    if choices.contains(&desired) {
        log::info!("Exact size match found.");
        return Some(desired);
    }

    match big_enough.iter().copied().min_by_key(|&s| area(s)) {
        Some(chosen) => {
            log::info!("Chosen size: {}x{}", chosen.0, chosen.1);
            Some(chosen)
        }
        None => {
            log::error!("Couldn't find any suitable preview size");
            Some(first)
        }
    }
}

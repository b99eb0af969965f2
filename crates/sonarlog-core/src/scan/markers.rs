use crate::ping::layout::MARKER;

/// Offsets of every `BR` marker in `data`, ascending.
///
/// Matches may overlap and may fall inside payloads; callers validate each
/// candidate on its own.
pub fn marker_offsets(data: &[u8]) -> impl Iterator<Item = usize> + '_ {
    data.windows(MARKER.len())
        .enumerate()
        .filter(|(_, window)| *window == MARKER)
        .map(|(offset, _)| offset)
}

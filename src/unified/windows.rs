//! Per-face windows over a flat attribute buffer.

use std::ops::Range;

/// Iterator over per-face (or per-element) windows of a buffer.
pub struct Windows<'a, T> {
    data: &'a [T],
    ranges: std::vec::IntoIter<Range<usize>>,
}

impl<'a, T> Windows<'a, T> {
    /// `ranges` must lie within `data`.
    pub(crate) fn new(data: &'a [T], ranges: Vec<Range<usize>>) -> Self {
        Self {
            data,
            ranges: ranges.into_iter(),
        }
    }
}

impl<'a, T> Iterator for Windows<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<&'a [T]> {
        let range = self.ranges.next()?;
        self.data.get(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ranges.size_hint()
    }
}

impl<T> ExactSizeIterator for Windows<'_, T> {}

/// Mutable iterator over per-face (or per-element) windows of a buffer.
///
/// Windows are handed out by splitting the buffer front to back, so the
/// ranges must be ordered and must not overlap.
pub struct WindowsMut<'a, T> {
    rest: &'a mut [T],
    offset: usize,
    ranges: std::vec::IntoIter<Range<usize>>,
}

impl<'a, T> WindowsMut<'a, T> {
    /// `ranges` must be ordered, disjoint and lie within `data`.
    pub(crate) fn new(data: &'a mut [T], ranges: Vec<Range<usize>>) -> Self {
        Self {
            rest: data,
            offset: 0,
            ranges: ranges.into_iter(),
        }
    }
}

impl<'a, T> Iterator for WindowsMut<'a, T> {
    type Item = &'a mut [T];

    fn next(&mut self) -> Option<&'a mut [T]> {
        let range = self.ranges.next()?;
        let skip = range.start.checked_sub(self.offset)?;
        let rest = std::mem::take(&mut self.rest);
        if skip + range.len() > rest.len() {
            return None;
        }
        let (_, tail) = rest.split_at_mut(skip);
        let (window, tail) = tail.split_at_mut(range.len());
        self.rest = tail;
        self.offset = range.end;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ranges.size_hint()
    }
}

/// Check that ranges are ordered front to back without overlap.
pub(crate) fn is_ordered(ranges: &[Range<usize>]) -> bool {
    ranges.windows(2).all(|w| w[0].end <= w[1].start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows() {
        let data = [0, 1, 2, 3, 4, 5];
        let w: Vec<&[i32]> = Windows::new(&data, vec![0..2, 2..5, 5..6]).collect();
        assert_eq!(w, vec![&[0, 1][..], &[2, 3, 4][..], &[5][..]]);
    }

    #[test]
    fn test_windows_mut_with_gaps() {
        let mut data = [0; 8];
        for (i, w) in WindowsMut::new(&mut data, vec![1..3, 3..4, 6..8]).enumerate() {
            w.fill(i as i32 + 1);
        }
        assert_eq!(data, [0, 1, 1, 2, 0, 0, 3, 3]);
    }

    #[test]
    fn test_ordering() {
        assert!(is_ordered(&[0..2, 2..4, 5..6]));
        assert!(!is_ordered(&[2..4, 0..2]));
        assert!(!is_ordered(&[0..3, 2..4]));
    }
}

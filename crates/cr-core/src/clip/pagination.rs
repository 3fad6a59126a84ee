//! Pure pagination index.
//!
//! Maps (current page, total pages) to the token run a pager renders:
//! first page, an optional leading ellipsis, the sibling run around the
//! current page, an optional trailing ellipsis, and the last page.

/// One renderable pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Compute the token sequence for a pager.
///
/// `current` must already be clamped into `[1, total]` by the caller; this
/// function does not clamp. `total <= 1` yields no tokens at all (a single
/// page needs no pagination controls).
pub fn page_tokens(current: usize, total: usize) -> Vec<PageToken> {
    if total <= 1 {
        return Vec::new();
    }
    debug_assert!((1..=total).contains(&current), "caller must clamp current");

    let mut tokens = Vec::new();
    tokens.push(PageToken::Page {
        number: 1,
        current: current == 1,
    });

    let left_sibling = (current.saturating_sub(1)).max(2);
    let right_sibling = (current + 1).min(total - 1);

    if left_sibling > 2 {
        tokens.push(PageToken::Ellipsis);
    }
    for number in left_sibling..=right_sibling {
        tokens.push(PageToken::Page {
            number,
            current: number == current,
        });
    }
    if right_sibling < total - 1 {
        tokens.push(PageToken::Ellipsis);
    }

    tokens.push(PageToken::Page {
        number: total,
        current: current == total,
    });
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(tokens: &[PageToken]) -> Vec<(usize, bool)> {
        tokens
            .iter()
            .filter_map(|t| match t {
                PageToken::Page { number, current } => Some((*number, *current)),
                PageToken::Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn no_tokens_for_single_page() {
        assert!(page_tokens(1, 0).is_empty());
        assert!(page_tokens(1, 1).is_empty());
    }

    #[test]
    fn first_and_last_emitted_exactly_once() {
        for total in 2..=12 {
            for current in 1..=total {
                let tokens = page_tokens(current, total);
                let pages = pages(&tokens);
                assert_eq!(pages.iter().filter(|(n, _)| *n == 1).count(), 1);
                assert_eq!(pages.iter().filter(|(n, _)| *n == total).count(), 1);
                assert_eq!(pages.iter().filter(|(_, c)| *c).count(), 1);
                assert!(pages.iter().any(|(n, c)| *n == current && *c));
            }
        }
    }

    #[test]
    fn middle_of_long_run_has_both_ellipses() {
        let tokens = page_tokens(6, 12);
        assert_eq!(
            tokens,
            vec![
                PageToken::Page { number: 1, current: false },
                PageToken::Ellipsis,
                PageToken::Page { number: 5, current: false },
                PageToken::Page { number: 6, current: true },
                PageToken::Page { number: 7, current: false },
                PageToken::Ellipsis,
                PageToken::Page { number: 12, current: false },
            ]
        );
    }

    #[test]
    fn edges_have_no_redundant_ellipsis() {
        let tokens = page_tokens(1, 4);
        assert_eq!(
            tokens,
            vec![
                PageToken::Page { number: 1, current: true },
                PageToken::Page { number: 2, current: false },
                PageToken::Ellipsis,
                PageToken::Page { number: 4, current: false },
            ]
        );

        let tokens = page_tokens(4, 4);
        assert_eq!(
            tokens,
            vec![
                PageToken::Page { number: 1, current: false },
                PageToken::Ellipsis,
                PageToken::Page { number: 3, current: false },
                PageToken::Page { number: 4, current: true },
            ]
        );
    }

    #[test]
    fn no_duplicate_page_numbers() {
        for total in 2..=20 {
            for current in 1..=total {
                let pages = pages(&page_tokens(current, total));
                let mut numbers: Vec<usize> = pages.iter().map(|(n, _)| *n).collect();
                numbers.sort_unstable();
                numbers.dedup();
                assert_eq!(numbers.len(), pages.len(), "dup at {current}/{total}");
            }
        }
    }
}

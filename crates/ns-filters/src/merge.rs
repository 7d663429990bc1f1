use ns_core::Blocklist;

use crate::baseline::BUILTIN_BLOCKLIST;

/// Counters reported by [`merge_with_baseline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub baseline: usize,
    pub fetched: usize,
    pub merged: usize,
    pub duplicates: usize,
}

/// Union fetched domains with the built-in list. Baseline entries come first.
pub fn merge_with_baseline<I>(fetched: I) -> (Blocklist, MergeStats)
where
    I: IntoIterator<Item = String>,
{
    let mut list = Blocklist::new();
    let mut stats = MergeStats::default();

    for domain in BUILTIN_BLOCKLIST {
        stats.baseline += 1;
        if !list.insert(domain.to_string()) {
            stats.duplicates += 1;
        }
    }

    for domain in fetched {
        stats.fetched += 1;
        if !list.insert(domain) {
            stats.duplicates += 1;
        }
    }

    stats.merged = list.len();
    (list, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_dedupes_against_baseline() {
        let fetched = vec![
            "doubleclick.net".to_string(),
            "ads.example.com".to_string(),
            "ads.example.com".to_string(),
        ];
        let (list, stats) = merge_with_baseline(fetched);

        assert_eq!(stats.baseline, BUILTIN_BLOCKLIST.len());
        assert_eq!(stats.fetched, 3);
        assert_eq!(stats.duplicates, 2);
        assert_eq!(stats.merged, BUILTIN_BLOCKLIST.len() + 1);
        assert_eq!(list.iter().next(), Some("doubleclick.net"));
        assert!(list.contains("ads.example.com"));
    }

    #[test]
    fn test_merge_of_nothing_is_baseline() {
        let (list, stats) = merge_with_baseline(Vec::new());
        assert_eq!(list, crate::baseline::baseline());
        assert_eq!(stats.duplicates, 0);
    }
}

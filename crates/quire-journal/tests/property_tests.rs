//! Property-based tests for the branch journal.
//!
//! These compare the disk-backed journal against window arithmetic across
//! randomly generated append histories, range queries, and pointer moves.

use proptest::prelude::*;

use quire_journal::BranchJournal;
use quire_types::{Revision, RevisionId};

fn id_for(ordinal: u64) -> RevisionId {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&ordinal.to_be_bytes());
    RevisionId::from_hash(bytes)
}

proptest! {
    /// Any range query returns exactly the overlap with the retained
    /// window, beginning where it claims to begin.
    #[test]
    fn range_matches_window_arithmetic(
        start in 1u64..100,
        count in 1u64..30,
        query_start in 1u64..150,
        query_stop in 1u64..150,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let journal = BranchJournal::open(dir.path()).unwrap();
        for ordinal in start..start + count {
            journal.append(Revision::new(ordinal), &id_for(ordinal)).unwrap();
        }

        let lo = query_start.max(start);
        let hi = query_stop.min(start + count - 1);
        let result = journal
            .range(Revision::new(query_start), Revision::new(query_stop))
            .unwrap();

        if lo > hi {
            prop_assert_eq!(result, None);
        } else {
            let (actual_start, ids) = result.unwrap();
            prop_assert_eq!(actual_start, Revision::new(lo));
            prop_assert_eq!(ids.len() as u64, hi - lo + 1);
            for (offset, got) in ids.iter().enumerate() {
                prop_assert_eq!(*got, id_for(lo + offset as u64));
            }
        }
    }

    /// `latest + 1` is the only ordinal that extends the journal; every
    /// other append fails and leaves the head untouched.
    #[test]
    fn continuity_is_the_only_way_forward(
        start in 1u64..50,
        count in 1u64..10,
        bogus in 1u64..200,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let journal = BranchJournal::open(dir.path()).unwrap();
        for ordinal in start..start + count {
            journal.append(Revision::new(ordinal), &id_for(ordinal)).unwrap();
        }

        let latest = start + count - 1;
        let result = journal.append(Revision::new(bogus), &id_for(bogus));
        if bogus == latest + 1 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
            let (head_revision, _) = journal.head().unwrap().unwrap();
            prop_assert_eq!(head_revision, Revision::new(latest));
        }
    }

    /// Advancing the earliest pointer shrinks the window by exactly the
    /// distance moved and never loses the head.
    #[test]
    fn advance_shrinks_window_monotonically(
        count in 1u64..20,
        steps in 0u64..25,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let journal = BranchJournal::open(dir.path()).unwrap();
        for ordinal in 1..=count {
            journal.append(Revision::new(ordinal), &id_for(ordinal)).unwrap();
        }

        // Clamp to the fully-drained position (latest + 1).
        let target = 1 + steps.min(count);
        journal.advance_earliest(Revision::new(target)).unwrap();

        prop_assert_eq!(journal.len().unwrap(), count + 1 - target);
        let (head_revision, _) = journal.head().unwrap().unwrap();
        prop_assert_eq!(head_revision, Revision::new(count));
    }
}

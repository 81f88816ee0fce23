//! Randomized patterned identifiers with collision retry.

use rand::Rng;

use clinistock_storage::{Document, DocumentStore, StorageError};

use crate::error::AllocationError;

/// Shape of a patterned id: `<left digits><separator><right digits>`,
/// e.g. `22-2232` with the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternedIdOptions {
    pub left_digits: u32,
    pub right_digits: u32,
    pub separator: char,
    /// Collision retry budget.
    pub attempts: u32,
}

impl Default for PatternedIdOptions {
    fn default() -> Self {
        Self {
            left_digits: 2,
            right_digits: 4,
            separator: '-',
            attempts: 5,
        }
    }
}

impl PatternedIdOptions {
    /// Draw one candidate id from `rng`. Digit groups are zero-padded, so
    /// `03-0042` is a valid draw.
    pub fn candidate(&self, rng: &mut impl Rng) -> String {
        let left = rng.gen_range(0..10u64.pow(self.left_digits));
        let right = rng.gen_range(0..10u64.pow(self.right_digits));
        format!(
            "{left:0lw$}{sep}{right:0rw$}",
            lw = self.left_digits as usize,
            sep = self.separator,
            rw = self.right_digits as usize,
        )
    }
}

/// Allocate a patterned id in `collection` and write the record under it.
///
/// Each attempt draws a fresh candidate and claims it with an atomic
/// check-and-insert, so two concurrent callers can never both win the same
/// id. A taken candidate costs one attempt; when the budget runs out the
/// call fails with [`AllocationError::Exhausted`]. Any other storage error
/// aborts immediately with [`AllocationError::Failed`].
pub fn allocate_patterned<S, R, F>(
    store: &S,
    rng: &mut R,
    collection: &str,
    opts: &PatternedIdOptions,
    payload: F,
) -> Result<String, AllocationError>
where
    S: DocumentStore + ?Sized,
    R: Rng,
    F: Fn(&str) -> Document,
{
    for attempt in 1..=opts.attempts {
        let candidate = opts.candidate(rng);
        let result = store.transact(&mut |tx| {
            tx.insert(collection, &candidate, payload(&candidate))
        });
        match result {
            Ok(()) => return Ok(candidate),
            Err(StorageError::AlreadyExists { .. }) => {
                tracing::debug!(candidate = %candidate, attempt, "patterned id collision, retrying");
            }
            Err(e) => return Err(AllocationError::Failed(e)),
        }
    }
    Err(AllocationError::Exhausted {
        attempts: opts.attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinistock_storage::{BatchWrite, InMemoryStore};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn preview_candidates(seed: u64, opts: &PatternedIdOptions, n: usize) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| opts.candidate(&mut rng)).collect()
    }

    fn occupy(store: &InMemoryStore, collection: &str, ids: &[String]) {
        store
            .apply_batch(
                ids.iter()
                    .map(|id| BatchWrite::Put {
                        collection: collection.to_string(),
                        id: id.clone(),
                        doc: json!({ "placeholder": true }),
                    })
                    .collect(),
            )
            .unwrap();
    }

    #[test]
    fn candidates_match_the_pattern() {
        let opts = PatternedIdOptions::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let id = opts.candidate(&mut rng);
            assert_eq!(id.len(), 7);
            let (left, rest) = id.split_at(2);
            assert!(left.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(&rest[..1], "-");
            assert!(rest[1..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn first_free_candidate_wins() {
        let store = InMemoryStore::new();
        let opts = PatternedIdOptions::default();
        let mut rng = StdRng::seed_from_u64(42);

        let id = allocate_patterned(&store, &mut rng, "orders", &opts, |_| json!({})).unwrap();
        assert_eq!(id, preview_candidates(42, &opts, 1)[0]);
        assert!(store.exists("orders", &id).unwrap());
    }

    #[test]
    fn retries_past_taken_candidates() {
        let store = InMemoryStore::new();
        let opts = PatternedIdOptions::default();
        let candidates = preview_candidates(42, &opts, 3);

        // First two draws are already taken; the third must win.
        occupy(&store, "orders", &candidates[..2]);

        let mut rng = StdRng::seed_from_u64(42);
        let id =
            allocate_patterned(&store, &mut rng, "orders", &opts, |_| json!({})).unwrap();
        assert_eq!(id, candidates[2]);
    }

    #[test]
    fn single_collision_resolves_on_the_next_draw() {
        let store = InMemoryStore::new();
        let opts = PatternedIdOptions::default();
        let candidates = preview_candidates(9, &opts, 2);
        occupy(&store, "orders", &candidates[..1]);

        let mut rng = StdRng::seed_from_u64(9);
        let id =
            allocate_patterned(&store, &mut rng, "orders", &opts, |_| json!({})).unwrap();
        assert_eq!(id, candidates[1]);
    }

    #[test]
    fn exhausts_after_the_attempts_budget() {
        let store = InMemoryStore::new();
        let opts = PatternedIdOptions::default();
        let candidates = preview_candidates(42, &opts, opts.attempts as usize);
        occupy(&store, "orders", &candidates);

        let mut rng = StdRng::seed_from_u64(42);
        let err =
            allocate_patterned(&store, &mut rng, "orders", &opts, |_| json!({})).unwrap_err();
        assert_eq!(err, AllocationError::Exhausted { attempts: 5 });
    }
}

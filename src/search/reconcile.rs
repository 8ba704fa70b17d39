//! Order-preserving join of index hits back onto store records.

use std::collections::HashMap;

use crate::models::Question;
use crate::repository::{QuestionStore, StoreResult};

/// Re-emit `records` in the order of `ids`.
///
/// Ids without a record are dropped. A repeated id is emitted once, at
/// its first position.
pub fn reconcile(ids: &[i32], records: Vec<Question>) -> Vec<Question> {
    let mut by_id: HashMap<i32, Question> = records.into_iter().map(|q| (q.id, q)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Fetch eligible records for `ids` and return them in `ids` order.
pub async fn fetch_in_order<S>(store: &S, ids: &[i32]) -> StoreResult<Vec<Question>>
where
    S: QuestionStore + ?Sized,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let records = store.fetch_eligible_by_ids(ids).await?;
    Ok(reconcile(ids, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::repository::testing::{question, MemoryStore};

    fn ids(questions: &[Question]) -> Vec<i32> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn test_relevance_order_is_kept() {
        let records = vec![2, 5, 9]
            .into_iter()
            .map(|id| question(id, Category::BrainRing, None))
            .collect();
        assert_eq!(ids(&reconcile(&[5, 2, 9], records)), vec![5, 2, 9]);
    }

    #[test]
    fn test_dangling_ids_are_dropped() {
        let records = vec![
            question(2, Category::BrainRing, None),
            question(5, Category::BrainRing, None),
        ];
        assert_eq!(ids(&reconcile(&[5, 999, 2], records)), vec![5, 2]);
    }

    #[test]
    fn test_duplicate_ids_emitted_once() {
        let records = vec![question(4, Category::Erudite, None)];
        assert_eq!(ids(&reconcile(&[4, 4], records)), vec![4]);
    }

    #[tokio::test]
    async fn test_fetch_in_order_skips_ineligible() {
        let store = MemoryStore::new();
        let a = store.push(Category::WhatWhereWhen, None, true);
        let hidden = store.push(Category::WhatWhereWhen, None, false);
        let b = store.push(Category::WhatWhereWhen, None, true);
        let c = store.push(Category::WhatWhereWhen, None, true);
        store.remove(c);

        let found = fetch_in_order(&store, &[b, hidden, c, a]).await.unwrap();
        assert_eq!(ids(&found), vec![b, a]);
    }
}

//! Fan-out/fan-in with per-item failure isolation.

use futures::future::join_all;
use std::future::Future;

/// Start `op` for every item at once, wait for all of them, then fold the
/// outcomes in input order. Failed items reach `fold` as `Err`; nothing is
/// short-circuited, so the fold decides what a failure is worth.
pub async fn gather_reduce<I, F, Fut, T, E, A, R>(items: I, op: F, init: A, fold: R) -> A
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(A, Result<T, E>) -> A,
{
    join_all(items.into_iter().map(op))
        .await
        .into_iter()
        .fold(init, fold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn failures_reach_the_fold_without_aborting() {
        let total = gather_reduce(
            [1u32, 2, 3, 4],
            |n| async move {
                if n % 2 == 0 { Err(format!("{n} failed")) } else { Ok(n) }
            },
            0u32,
            |acc, outcome| acc + outcome.unwrap_or(0),
        )
        .await;

        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn outcomes_are_folded_in_input_order() {
        let order = gather_reduce(
            [30u64, 10, 20],
            |ms| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok::<_, ()>(ms)
            },
            Vec::new(),
            |mut acc, outcome| {
                acc.extend(outcome);
                acc
            },
        )
        .await;

        assert_eq!(order, vec![30, 10, 20]);
    }

    #[tokio::test]
    async fn empty_input_returns_init() {
        let out = gather_reduce(
            Vec::<u32>::new(),
            |n| async move { Ok::<_, ()>(n) },
            42u32,
            |acc, _| acc + 1,
        )
        .await;

        assert_eq!(out, 42);
    }
}

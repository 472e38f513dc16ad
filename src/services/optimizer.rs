//! Stop visiting-order optimization.
//!
//! Thin wrapper over the provider's round-trip waypoint optimization. The
//! provider's answer is validated before use: it must be a bijection over
//! the input indices, every stop visited exactly once.

use std::sync::Arc;

use tracing::info;

use super::routing::{DirectionsError, DirectionsProvider};

pub struct StopOrderOptimizer {
    provider: Arc<dyn DirectionsProvider>,
}

impl StopOrderOptimizer {
    pub fn new(provider: Arc<dyn DirectionsProvider>) -> Self {
        Self { provider }
    }

    /// Compute a visiting order for a depot → stops → depot round trip.
    ///
    /// Returns a permutation of indices into `stop_addresses`. Lists of
    /// fewer than two stops keep their order without a provider call.
    pub async fn optimize(
        &self,
        depot: &str,
        stop_addresses: &[String],
    ) -> Result<Vec<usize>, DirectionsError> {
        if stop_addresses.len() < 2 {
            return Ok((0..stop_addresses.len()).collect());
        }

        let order = self
            .provider
            .optimize_waypoints(depot, stop_addresses)
            .await?;
        validate_permutation(&order, stop_addresses.len())?;

        info!(
            "Optimized visiting order for {} stops via {}",
            stop_addresses.len(),
            self.provider.name()
        );
        Ok(order)
    }
}

/// Reorder `items` by the given visiting order.
pub fn apply_order<T: Clone>(items: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&i| items[i].clone()).collect()
}

fn validate_permutation(order: &[usize], n: usize) -> Result<(), DirectionsError> {
    if order.len() != n {
        return Err(DirectionsError::ProviderUnavailable(format!(
            "optimizer returned {} indices for {} stops",
            order.len(),
            n
        )));
    }

    let mut seen = vec![false; n];
    for &idx in order {
        if idx >= n || seen[idx] {
            return Err(DirectionsError::ProviderUnavailable(format!(
                "optimizer returned an invalid permutation: {order:?}"
            )));
        }
        seen[idx] = true;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Stub provider that answers with a canned visiting order.
    struct CannedOrder {
        order: Vec<usize>,
    }

    #[async_trait]
    impl DirectionsProvider for CannedOrder {
        async fn drive_duration(&self, _from: &str, _to: &str) -> Result<u64, DirectionsError> {
            Ok(600)
        }

        async fn optimize_waypoints(
            &self,
            _depot: &str,
            _stops: &[String],
        ) -> Result<Vec<usize>, DirectionsError> {
            Ok(self.order.clone())
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    /// Stub provider that must never be asked to optimize.
    struct RefusesOptimization;

    #[async_trait]
    impl DirectionsProvider for RefusesOptimization {
        async fn drive_duration(&self, _from: &str, _to: &str) -> Result<u64, DirectionsError> {
            Ok(600)
        }

        async fn optimize_waypoints(
            &self,
            _depot: &str,
            _stops: &[String],
        ) -> Result<Vec<usize>, DirectionsError> {
            panic!("short lists must not reach the provider");
        }

        fn name(&self) -> &'static str {
            "refuses"
        }
    }

    fn addresses(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{} Main St, Duncan, SC", i + 1)).collect()
    }

    #[tokio::test]
    async fn valid_permutation_passes_through() {
        let optimizer = StopOrderOptimizer::new(Arc::new(CannedOrder {
            order: vec![2, 0, 1],
        }));

        let order = optimizer.optimize("depot", &addresses(3)).await.unwrap();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[tokio::test]
    async fn permutation_is_a_bijection_over_input_indices() {
        let optimizer = StopOrderOptimizer::new(Arc::new(CannedOrder {
            order: vec![3, 1, 0, 2],
        }));

        let stops = addresses(4);
        let mut order = optimizer.optimize("depot", &stops).await.unwrap();

        assert_eq!(order.len(), stops.len());
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn duplicate_index_is_rejected() {
        let optimizer = StopOrderOptimizer::new(Arc::new(CannedOrder {
            order: vec![0, 0, 1],
        }));

        let err = optimizer.optimize("depot", &addresses(3)).await.unwrap_err();
        assert!(matches!(err, DirectionsError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn dropped_stop_is_rejected() {
        let optimizer = StopOrderOptimizer::new(Arc::new(CannedOrder {
            order: vec![1, 0],
        }));

        let err = optimizer.optimize("depot", &addresses(3)).await.unwrap_err();
        assert!(matches!(err, DirectionsError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected() {
        let optimizer = StopOrderOptimizer::new(Arc::new(CannedOrder {
            order: vec![0, 3],
        }));

        let err = optimizer.optimize("depot", &addresses(2)).await.unwrap_err();
        assert!(matches!(err, DirectionsError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn short_lists_skip_the_provider() {
        let optimizer = StopOrderOptimizer::new(Arc::new(RefusesOptimization));

        assert_eq!(optimizer.optimize("depot", &[]).await.unwrap(), Vec::<usize>::new());
        assert_eq!(
            optimizer.optimize("depot", &addresses(1)).await.unwrap(),
            vec![0]
        );
    }

    #[test]
    fn apply_order_reorders_items() {
        let items = vec!["a", "b", "c"];
        assert_eq!(apply_order(&items, &[2, 0, 1]), vec!["c", "a", "b"]);
    }
}

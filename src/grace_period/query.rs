use crate::model::OrderId;
use crate::store::StoreError;

/// Result of looking up orders past their grace period.
///
/// A store failure never reaches the caller as an error. It is kept here
/// for inspection and otherwise behaves as an empty result.
#[derive(Debug)]
pub enum GracePeriodQuery {
    /// The store answered; ids are in ascending order.
    Found(Vec<OrderId>),
    /// The store failed; treated as "no orders this cycle".
    Degraded(StoreError),
}

impl GracePeriodQuery {
    pub fn is_degraded(&self) -> bool {
        matches!(self, GracePeriodQuery::Degraded(_))
    }

    pub fn into_order_ids(self) -> Vec<OrderId> {
        match self {
            GracePeriodQuery::Found(ids) => ids,
            GracePeriodQuery::Degraded(_) => Vec::new(),
        }
    }
}

//! Waterfall allocation of a withdrawal across strategy positions.

use crate::{
    chain::ChainReader,
    error::WithdrawError,
    registry::StrategyRegistry,
    state::{AllocationChunk, AllocationPlan, PositionRecord, WithdrawalRequest},
};
use log::{debug, info};

/// Splits `amount` across `positions`, largest position first.
///
/// Ties on position value are broken by strategy address so identical state
/// always yields the same plan. Empty positions are never touched.
///
/// # Arguments
/// * `amount` - Requested amount in the vault asset's smallest unit
/// * `is_withdraw_all` - Whether the user is withdrawing their whole balance
/// * `positions` - Live position value of every candidate strategy
///
/// # Errors
/// * `InsufficientLiquidity` if the positions together hold less than `amount`
pub fn allocate(
    amount: u64,
    is_withdraw_all: bool,
    positions: &[PositionRecord],
) -> Result<AllocationPlan, WithdrawError> {
    let mut sorted: Vec<&PositionRecord> = positions.iter().collect();
    sorted.sort_by(|a, b| {
        b.position_value
            .cmp(&a.position_value)
            .then_with(|| a.strategy.cmp(&b.strategy))
    });

    let (chunks, remaining) = sorted.into_iter().fold(
        (Vec::new(), amount),
        |(mut chunks, remaining), position| {
            let take = remaining.min(position.position_value);
            if take == 0 {
                return (chunks, remaining);
            }
            let drains_position = take == position.position_value;
            chunks.push(AllocationChunk {
                strategy: position.strategy,
                amount: take,
                position_value: position.position_value,
                is_final_chunk: remaining == take,
                drains_position,
                is_withdraw_all: is_withdraw_all && drains_position,
            });
            (chunks, remaining - take)
        },
    );

    if remaining > 0 {
        return Err(WithdrawError::InsufficientLiquidity {
            requested: amount,
            available: amount - remaining,
            shortfall: remaining,
        });
    }

    Ok(AllocationPlan {
        requested: amount,
        chunks,
    })
}

/// Builds allocation plans from live position values.
pub struct WithdrawalAllocator<'a> {
    registry: &'a StrategyRegistry,
}

impl<'a> WithdrawalAllocator<'a> {
    pub fn new(registry: &'a StrategyRegistry) -> Self {
        Self { registry }
    }

    /// Fetches every strategy's position for `request.vault` and allocates
    /// `request.amount` across them.
    pub async fn plan(
        &self,
        reader: &dyn ChainReader,
        request: &WithdrawalRequest,
    ) -> Result<AllocationPlan, WithdrawError> {
        if request.amount == 0 {
            debug!("Zero withdrawal requested for vault {}", request.vault);
            return Ok(AllocationPlan::default());
        }

        let strategies = self.registry.list_strategies(&request.vault)?;
        let positions = self
            .registry
            .fetch_position_values(reader, &request.vault, &strategies)
            .await?;
        let plan = allocate(request.amount, request.is_withdraw_all, &positions)?;

        info!(
            "Allocated {} from vault {} across {} strategies",
            request.amount,
            request.vault,
            plan.chunks.len()
        );
        for chunk in &plan.chunks {
            debug!(
                "  {} <- {} of {} (final: {}, drains: {}, withdraw all: {})",
                chunk.strategy,
                chunk.amount,
                chunk.position_value,
                chunk.is_final_chunk,
                chunk.drains_position,
                chunk.is_withdraw_all
            );
        }
        Ok(plan)
    }
}

//! Conversions between deposit-asset units and vault-share (LP) units.
//!
//! Every division truncates, so both directions round in the vault's favour:
//! a deposit never mints more shares than it paid for and a redemption never
//! pays out more assets than the shares are worth.

use crate::error::ShareMathError;
use rust_decimal::Decimal;

/// Vault share tokens always carry 9 decimals.
pub const SHARE_DECIMALS: u8 = 9;

/// Shares minted for `deposit_amount` of the deposit asset.
///
/// # Arguments
/// * `deposit_amount` - Deposit in the asset's smallest unit
/// * `total_asset_value` - Idle plus deployed value attributed to the vault
/// * `share_supply` - Share supply including unminted fee shares
/// * `asset_decimals` - Decimals of the deposit asset mint
/// * `share_decimals` - Decimals of the share mint
///
/// # Errors
/// * `InvalidState` if exactly one of `total_asset_value` and `share_supply` is zero
/// * `ArithmeticOverflow` if the result does not fit in a `u64`
pub fn shares_for_deposit(
    deposit_amount: u64,
    total_asset_value: u64,
    share_supply: u64,
    asset_decimals: u8,
    share_decimals: u8,
) -> Result<u64, ShareMathError> {
    if total_asset_value == 0 && share_supply == 0 {
        // Empty pool: 1:1 initial mint at share precision
        return rescale_amount(deposit_amount, asset_decimals, share_decimals);
    }
    if total_asset_value == 0 {
        return Err(ShareMathError::InvalidState(format!(
            "{share_supply} shares outstanding against zero assets"
        )));
    }
    if share_supply == 0 {
        return Err(ShareMathError::InvalidState(format!(
            "{total_asset_value} assets held with no shares outstanding"
        )));
    }

    mul_div_floor(deposit_amount, share_supply, total_asset_value)
}

/// Assets paid out for redeeming `share_amount` shares.
///
/// # Errors
/// * `InvalidState` if the vault has no shares or no assets, or if
///   `share_amount` exceeds the share supply
/// * `ArithmeticOverflow` if the result does not fit in a `u64`
pub fn assets_for_withdraw(
    share_amount: u64,
    total_asset_value: u64,
    share_supply: u64,
) -> Result<u64, ShareMathError> {
    if share_supply == 0 {
        return Err(ShareMathError::InvalidState(
            "share supply is zero".to_string(),
        ));
    }
    if total_asset_value == 0 {
        return Err(ShareMathError::InvalidState(format!(
            "{share_supply} shares outstanding against zero assets"
        )));
    }
    if share_amount > share_supply {
        return Err(ShareMathError::InvalidState(format!(
            "redeeming {share_amount} shares exceeds supply of {share_supply}"
        )));
    }

    mul_div_floor(share_amount, total_asset_value, share_supply)
}

/// Moves `amount` from `from_decimals` precision to `to_decimals` precision,
/// truncating when scaling down.
pub fn rescale_amount(amount: u64, from_decimals: u8, to_decimals: u8) -> Result<u64, ShareMathError> {
    if from_decimals == to_decimals {
        return Ok(amount);
    }

    let amount = amount as u128;
    let scaled = if to_decimals > from_decimals {
        let multiplier = 10u128
            .checked_pow((to_decimals - from_decimals) as u32)
            .ok_or(ShareMathError::ArithmeticOverflow)?;
        amount
            .checked_mul(multiplier)
            .ok_or(ShareMathError::ArithmeticOverflow)?
    } else {
        let divisor = 10u128
            .checked_pow((from_decimals - to_decimals) as u32)
            .ok_or(ShareMathError::ArithmeticOverflow)?;
        amount / divisor
    };

    u64::try_from(scaled).map_err(|_| ShareMathError::ArithmeticOverflow)
}

/// Price of one whole share expressed in whole deposit-asset units.
///
/// An empty vault prices shares at exactly 1.
pub fn share_price(
    total_asset_value: u64,
    share_supply: u64,
    asset_decimals: u8,
    share_decimals: u8,
) -> Result<Decimal, ShareMathError> {
    if total_asset_value == 0 && share_supply == 0 {
        return Ok(Decimal::ONE);
    }
    if share_supply == 0 || total_asset_value == 0 {
        return Err(ShareMathError::InvalidState(format!(
            "cannot price shares: assets={total_asset_value}, supply={share_supply}"
        )));
    }

    let assets = to_decimal(total_asset_value, asset_decimals)?;
    let shares = to_decimal(share_supply, share_decimals)?;
    assets
        .checked_div(shares)
        .ok_or(ShareMathError::ArithmeticOverflow)
}

fn to_decimal(amount: u64, decimals: u8) -> Result<Decimal, ShareMathError> {
    let mut decimal = Decimal::from(amount);
    decimal
        .set_scale(decimals as u32)
        .map_err(|_| ShareMathError::ArithmeticOverflow)?;
    Ok(decimal)
}

fn mul_div_floor(a: u64, b: u64, denominator: u64) -> Result<u64, ShareMathError> {
    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(ShareMathError::ArithmeticOverflow)?;
    let quotient = product
        .checked_div(denominator as u128)
        .ok_or_else(|| ShareMathError::InvalidState("division by zero".to_string()))?;
    u64::try_from(quotient).map_err(|_| ShareMathError::ArithmeticOverflow)
}

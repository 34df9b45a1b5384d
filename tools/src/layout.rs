//! Fixed-offset readers for the account layouts this crate decodes.
//!
//! Every Anchor account starts with an 8-byte discriminator
//! (`sha256("account:<Name>")[..8]`); field offsets below include it.

use solana_sdk::{hash::hash, pubkey::Pubkey};

pub const DISCRIMINATOR_SIZE: usize = 8;

// Vault program: Vault
pub const VAULT_ASSET_MINT_OFFSET: usize = 104;
pub const VAULT_ASSET_TOTAL_VALUE_OFFSET: usize = 168;
pub const VAULT_ACCUMULATED_LP_MANAGER_FEES_OFFSET: usize = 391;
pub const VAULT_ACCUMULATED_LP_ADMIN_FEES_OFFSET: usize = 399;
pub const VAULT_ACCUMULATED_LP_PROTOCOL_FEES_OFFSET: usize = 407;
pub const VAULT_MIN_LEN: usize = 415;

// Vault program: StrategyInitReceipt
pub const RECEIPT_VAULT_OFFSET: usize = 8;
pub const RECEIPT_STRATEGY_OFFSET: usize = 40;
pub const RECEIPT_ADAPTOR_OFFSET: usize = 72;
pub const RECEIPT_POSITION_VALUE_OFFSET: usize = 104;
pub const RECEIPT_LAST_UPDATED_TS_OFFSET: usize = 112;
pub const RECEIPT_MIN_LEN: usize = 120;

/// Anchor account discriminator for the account type `name`.
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("account:{}", name);
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    discriminator
}

/// Anchor instruction discriminator for the method `name`.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let preimage = format!("global:{}", name);
    let mut sighash = [0u8; 8];
    sighash.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..8]);
    sighash
}

pub fn has_discriminator(data: &[u8], name: &str) -> bool {
    data.len() >= DISCRIMINATOR_SIZE && data[..DISCRIMINATOR_SIZE] == account_discriminator(name)
}

pub fn read_pubkey(data: &[u8], offset: usize) -> Option<Pubkey> {
    let bytes: [u8; 32] = data.get(offset..offset + 32)?.try_into().ok()?;
    Some(Pubkey::new_from_array(bytes))
}

pub fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    Some(u64::from_le_bytes(data.get(offset..offset + 8)?.try_into().ok()?))
}

pub fn read_i64(data: &[u8], offset: usize) -> Option<i64> {
    Some(i64::from_le_bytes(data.get(offset..offset + 8)?.try_into().ok()?))
}

pub fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_le_bytes(data.get(offset..offset + 2)?.try_into().ok()?))
}

pub fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_bounds_checked() {
        let data = [1u8; 10];
        assert_eq!(read_u64(&data, 2), Some(u64::from_le_bytes([1; 8])));
        assert_eq!(read_u64(&data, 3), None);
        assert_eq!(read_pubkey(&data, 0), None);
        assert_eq!(read_u8(&data, 10), None);
    }

    #[test]
    fn test_discriminators_differ_by_namespace() {
        assert_ne!(
            account_discriminator("Vault"),
            instruction_discriminator("Vault")
        );
        let mut data = vec![0u8; 64];
        data[..DISCRIMINATOR_SIZE].copy_from_slice(&account_discriminator("Vault"));
        assert!(has_discriminator(&data, "Vault"));
        assert!(!has_discriminator(&data, "StrategyInitReceipt"));
        assert!(!has_discriminator(&data[..4], "Vault"));
    }

    #[test]
    fn test_reads_little_endian() {
        let mut data = vec![0u8; 64];
        let key = Pubkey::new_unique();
        data[8..40].copy_from_slice(key.as_ref());
        data[40..42].copy_from_slice(&34u16.to_le_bytes());
        data[42..50].copy_from_slice(&(-7i64).to_le_bytes());
        assert_eq!(read_pubkey(&data, 8), Some(key));
        assert_eq!(read_u16(&data, 40), Some(34));
        assert_eq!(read_i64(&data, 42), Some(-7));
    }
}

use solana_sdk::{pubkey, pubkey::Pubkey};

pub const VOLTR_VAULT_PROGRAM_ID: Pubkey = pubkey!("vVoLTRjQmtFpiYoegx285Ze4gsLJ8ZxgFKVcuvmG1a8");

pub const PROTOCOL_SEED: &[u8] = b"protocol";
pub const VAULT_LP_MINT_SEED: &[u8] = b"vault_lp_mint";
pub const VAULT_STRATEGY_AUTH_SEED: &[u8] = b"vault_strategy_auth";
pub const STRATEGY_INIT_RECEIPT_SEED: &[u8] = b"strategy_init_receipt";
pub const DIRECT_WITHDRAW_INIT_RECEIPT_SEED: &[u8] = b"direct_withdraw_init_receipt";
pub const REQUEST_WITHDRAW_VAULT_RECEIPT_SEED: &[u8] = b"request_withdraw_vault_receipt";

pub fn get_protocol(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[PROTOCOL_SEED], program_id).0
}

pub fn get_vault_lp_mint(vault: &Pubkey, program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[VAULT_LP_MINT_SEED, vault.as_ref()], program_id).0
}

/// Authority that owns every protocol-side position of `strategy` on behalf of `vault`.
pub fn get_vault_strategy_auth(vault: &Pubkey, strategy: &Pubkey, program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[VAULT_STRATEGY_AUTH_SEED, vault.as_ref(), strategy.as_ref()],
        program_id,
    )
    .0
}

/// Receipt holding the strategy's last reported position value.
pub fn get_strategy_init_receipt(
    vault: &Pubkey,
    strategy: &Pubkey,
    program_id: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[STRATEGY_INIT_RECEIPT_SEED, vault.as_ref(), strategy.as_ref()],
        program_id,
    )
    .0
}

pub fn get_direct_withdraw_init_receipt(
    vault: &Pubkey,
    strategy: &Pubkey,
    program_id: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            DIRECT_WITHDRAW_INIT_RECEIPT_SEED,
            vault.as_ref(),
            strategy.as_ref(),
        ],
        program_id,
    )
    .0
}

pub fn get_request_withdraw_vault_receipt(
    vault: &Pubkey,
    user: &Pubkey,
    program_id: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            REQUEST_WITHDRAW_VAULT_RECEIPT_SEED,
            vault.as_ref(),
            user.as_ref(),
        ],
        program_id,
    )
    .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_auth_is_vault_and_strategy_specific() {
        let vault = Pubkey::new_unique();
        let strategy_a = Pubkey::new_unique();
        let strategy_b = Pubkey::new_unique();

        let auth_a = get_vault_strategy_auth(&vault, &strategy_a, &VOLTR_VAULT_PROGRAM_ID);
        let auth_b = get_vault_strategy_auth(&vault, &strategy_b, &VOLTR_VAULT_PROGRAM_ID);

        assert_ne!(auth_a, auth_b);
        assert_eq!(
            auth_a,
            get_vault_strategy_auth(&vault, &strategy_a, &VOLTR_VAULT_PROGRAM_ID)
        );
    }

    #[test]
    fn test_receipts_do_not_collide() {
        let vault = Pubkey::new_unique();
        let strategy = Pubkey::new_unique();

        let init = get_strategy_init_receipt(&vault, &strategy, &VOLTR_VAULT_PROGRAM_ID);
        let direct = get_direct_withdraw_init_receipt(&vault, &strategy, &VOLTR_VAULT_PROGRAM_ID);
        let request = get_request_withdraw_vault_receipt(&vault, &strategy, &VOLTR_VAULT_PROGRAM_ID);

        assert_ne!(init, direct);
        assert_ne!(init, request);
        assert_ne!(direct, request);
    }
}

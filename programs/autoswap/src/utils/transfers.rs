//! Token transfer helpers
//!
//! Thin wrappers over the SPL token CPIs used by the pool ledger and the
//! order escrows. The engine only ever moves tokens through these helpers.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, MintTo, Token, TokenAccount, Transfer};

/// Transfer tokens out of a user-owned account, user signs.
pub fn transfer_from_user<'info>(
    from: &Account<'info, TokenAccount>,
    to: &Account<'info, TokenAccount>,
    authority: &Signer<'info>,
    token_program: &Program<'info, Token>,
    amount: u64,
) -> Result<()> {
    let cpi_accounts = Transfer {
        from: from.to_account_info(),
        to: to.to_account_info(),
        authority: authority.to_account_info(),
    };
    token::transfer(
        CpiContext::new(token_program.to_account_info(), cpi_accounts),
        amount,
    )
}

/// Transfer tokens between engine-controlled accounts using a PDA signer.
/// Also used with raw `AccountInfo`s when accounts arrive through
/// `remaining_accounts` during a scheduler tick.
pub fn transfer_with_authority<'info>(
    from: AccountInfo<'info>,
    to: AccountInfo<'info>,
    authority: AccountInfo<'info>,
    token_program: &Program<'info, Token>,
    authority_seeds: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    let cpi_accounts = Transfer {
        from,
        to,
        authority,
    };
    token::transfer(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            cpi_accounts,
            authority_seeds,
        ),
        amount,
    )
}

/// Mint LP tokens to a recipient with the pool authority PDA as signer.
pub fn mint_lp<'info>(
    lp_mint: AccountInfo<'info>,
    to: AccountInfo<'info>,
    pool_authority: AccountInfo<'info>,
    token_program: &Program<'info, Token>,
    authority_seeds: &[&[&[u8]]],
    amount: u64,
) -> Result<()> {
    let cpi_accounts = MintTo {
        mint: lp_mint,
        to,
        authority: pool_authority,
    };
    token::mint_to(
        CpiContext::new_with_signer(
            token_program.to_account_info(),
            cpi_accounts,
            authority_seeds,
        ),
        amount,
    )
}

/// Burn LP tokens from a user account, user signs.
pub fn burn_lp<'info>(
    lp_mint: AccountInfo<'info>,
    from: AccountInfo<'info>,
    owner: &Signer<'info>,
    token_program: &Program<'info, Token>,
    amount: u64,
) -> Result<()> {
    let cpi_accounts = Burn {
        mint: lp_mint,
        from,
        authority: owner.to_account_info(),
    };
    token::burn(
        CpiContext::new(token_program.to_account_info(), cpi_accounts),
        amount,
    )
}

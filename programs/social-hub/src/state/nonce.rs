use anchor_lang::prelude::*;

/// Per-principal signature nonce. Strictly sequential: every successful
/// action by the principal, signed or direct, consumes exactly one value.
#[account]
pub struct SigNonce {
    pub principal: Pubkey,
    pub nonce: u64,
    /// PDA bump seed
    pub bump: u8,
}

impl SigNonce {
    pub const SIZE: usize = 8 + 32 + 8 + 1;

    /// Fill in identity fields on first use of an `init_if_needed` account.
    pub fn bind(&mut self, principal: Pubkey, bump: u8) {
        if self.principal == Pubkey::default() {
            self.principal = principal;
            self.bump = bump;
        }
    }

    pub fn consume(&mut self) -> u64 {
        let used = self.nonce;
        self.nonce += 1;
        used
    }
}

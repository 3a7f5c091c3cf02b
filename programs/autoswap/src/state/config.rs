//! Global engine configuration: admin, role membership, the pause switch,
//! the reentrancy lock and the order-id counter.

use anchor_lang::prelude::*;

use crate::constants::MAX_ROLE_MEMBERS;
use crate::error::ErrorCode;
use crate::state::guard::LockState;
use crate::utils::SafeMath;

/// Roles gating the privileged entry points. The admin implicitly holds
/// every role.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// May start and stop the schedulers.
    Operator,
    /// May change pool fees.
    FeeManager,
    /// May flip the global pause switch.
    Pauser,
}

#[account]
#[derive(InitSpace)]
pub struct Config {
    pub admin: Pubkey,
    /// Global pause: mutating pool and order-creation entry points fail
    /// while set; reads stay available.
    pub paused: bool,
    /// Engine-wide reentrancy lock.
    pub lock: LockState,
    /// Monotonic id shared by all order families.
    pub next_order_id: u64,
    #[max_len(MAX_ROLE_MEMBERS)]
    pub operators: Vec<Pubkey>,
    #[max_len(MAX_ROLE_MEMBERS)]
    pub fee_managers: Vec<Pubkey>,
    #[max_len(MAX_ROLE_MEMBERS)]
    pub pausers: Vec<Pubkey>,
    pub bump: u8,
    pub engine_authority_bump: u8,
}

impl Config {
    fn members(&self, role: Role) -> &Vec<Pubkey> {
        match role {
            Role::Operator => &self.operators,
            Role::FeeManager => &self.fee_managers,
            Role::Pauser => &self.pausers,
        }
    }

    fn members_mut(&mut self, role: Role) -> &mut Vec<Pubkey> {
        match role {
            Role::Operator => &mut self.operators,
            Role::FeeManager => &mut self.fee_managers,
            Role::Pauser => &mut self.pausers,
        }
    }

    pub fn has_role(&self, role: Role, key: &Pubkey) -> bool {
        *key == self.admin || self.members(role).contains(key)
    }

    pub fn require_role(&self, role: Role, key: &Pubkey) -> Result<()> {
        require!(self.has_role(role, key), ErrorCode::MissingRole);
        Ok(())
    }

    pub fn grant_role(&mut self, role: Role, member: Pubkey) -> Result<()> {
        let members = self.members_mut(role);
        require!(!members.contains(&member), ErrorCode::RoleAlreadyGranted);
        require!(members.len() < MAX_ROLE_MEMBERS, ErrorCode::RoleListFull);
        members.push(member);
        Ok(())
    }

    pub fn revoke_role(&mut self, role: Role, member: &Pubkey) -> Result<()> {
        let members = self.members_mut(role);
        let position = members
            .iter()
            .position(|m| m == member)
            .ok_or(ErrorCode::RoleNotGranted)?;
        members.swap_remove(position);
        Ok(())
    }

    pub fn allocate_order_id(&mut self) -> Result<u64> {
        let id = self.next_order_id;
        self.next_order_id = self.next_order_id.safe_add(1)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_admin(admin: Pubkey) -> Config {
        Config {
            admin,
            paused: false,
            lock: LockState::Unlocked,
            next_order_id: 0,
            operators: vec![],
            fee_managers: vec![],
            pausers: vec![],
            bump: 0,
            engine_authority_bump: 0,
        }
    }

    #[test]
    fn admin_holds_every_role() {
        let admin = Pubkey::new_unique();
        let config = config_with_admin(admin);
        assert!(config.has_role(Role::Operator, &admin));
        assert!(config.has_role(Role::FeeManager, &admin));
        assert!(config.has_role(Role::Pauser, &admin));
    }

    #[test]
    fn grant_and_revoke() {
        let mut config = config_with_admin(Pubkey::new_unique());
        let member = Pubkey::new_unique();

        assert!(!config.has_role(Role::Operator, &member));
        config.grant_role(Role::Operator, member).unwrap();
        assert!(config.has_role(Role::Operator, &member));
        // role grants do not leak across roles
        assert!(!config.has_role(Role::Pauser, &member));

        assert!(config.grant_role(Role::Operator, member).is_err());
        config.revoke_role(Role::Operator, &member).unwrap();
        assert!(!config.has_role(Role::Operator, &member));
        assert!(config.revoke_role(Role::Operator, &member).is_err());
    }

    #[test]
    fn role_list_capacity() {
        let mut config = config_with_admin(Pubkey::new_unique());
        for _ in 0..MAX_ROLE_MEMBERS {
            config.grant_role(Role::Pauser, Pubkey::new_unique()).unwrap();
        }
        assert!(config
            .grant_role(Role::Pauser, Pubkey::new_unique())
            .is_err());
    }

    #[test]
    fn order_ids_are_monotonic() {
        let mut config = config_with_admin(Pubkey::new_unique());
        assert_eq!(config.allocate_order_id().unwrap(), 0);
        assert_eq!(config.allocate_order_id().unwrap(), 1);
        assert_eq!(config.next_order_id, 2);
    }
}

//! Order store secondary indices.
//!
//! One [`OrderRegistry`] per family tracks every live order's id, owner,
//! pool and status, answering the active-id, by-status and by-pair queries
//! without touching the order accounts themselves. A per-user
//! [`UserOrders`] account is the owner-to-ids back-index. The registry is
//! bounded; terminal entries are pruned lazily when a slot is needed.

use anchor_lang::prelude::*;

use crate::constants::{MAX_ORDERS_PER_USER, MAX_TRACKED_ORDERS};
use crate::error::ErrorCode;

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderFamily {
    Limit,
    Recurring,
    Grid,
}

impl OrderFamily {
    pub const fn seed(&self) -> u8 {
        match self {
            OrderFamily::Limit => 0,
            OrderFamily::Recurring => 1,
            OrderFamily::Grid => 2,
        }
    }
}

/// Shared status vocabulary. Legal values per family:
/// limit: Active | Filled | Cancelled | Expired;
/// recurring: Active | Completed | Paused | Cancelled;
/// grid: Active | Completed | Cancelled.
/// Transitions are enforced by each family's state machine.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    Active,
    Filled,
    Completed,
    Paused,
    Cancelled,
    Expired,
}

impl OrderStatus {
    /// Terminal statuses never transition again and may be pruned.
    pub fn is_terminal(&self) -> bool {
        match self {
            OrderStatus::Filled
            | OrderStatus::Completed
            | OrderStatus::Cancelled
            | OrderStatus::Expired => true,
            OrderStatus::Active | OrderStatus::Paused => false,
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderRef {
    pub id: u64,
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub status: OrderStatus,
}

#[account]
#[derive(InitSpace)]
pub struct OrderRegistry {
    pub family: OrderFamily,
    #[max_len(MAX_TRACKED_ORDERS)]
    pub entries: Vec<OrderRef>,
    pub bump: u8,
}

impl OrderRegistry {
    /// Track a new order, pruning one terminal entry if at capacity.
    pub fn insert(&mut self, id: u64, owner: Pubkey, pool: Pubkey) -> Result<()> {
        if self.entries.len() >= MAX_TRACKED_ORDERS {
            let pruned = self
                .entries
                .iter()
                .position(|e| e.status.is_terminal())
                .ok_or(ErrorCode::RegistryFull)?;
            self.entries.remove(pruned);
        }
        self.entries.push(OrderRef {
            id,
            owner,
            pool,
            status: OrderStatus::Active,
        });
        Ok(())
    }

    pub fn set_status(&mut self, id: u64, status: OrderStatus) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ErrorCode::OrderNotInRegistry)?;
        entry.status = status;
        Ok(())
    }

    /// Update an entry's status if it is still tracked. Terminal entries may
    /// have been pruned to make room, so cancel paths must not fail on a
    /// missing id; the refund matters more than the index.
    pub fn note_status(&mut self, id: u64, status: OrderStatus) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.status = status;
        }
    }

    /// Whether `id` is tracked with a non-terminal status. Entries are only
    /// ever removed once terminal, so an absent id is a settled order.
    pub fn is_live(&self, id: u64) -> bool {
        self.entries
            .iter()
            .any(|e| e.id == id && !e.status.is_terminal())
    }

    pub fn active_ids(&self) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| e.status == OrderStatus::Active)
            .map(|e| e.id)
            .collect()
    }

    pub fn ids_with_status(&self, status: OrderStatus) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.id)
            .collect()
    }

    pub fn ids_for_pool(&self, pool: &Pubkey) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| e.pool == *pool)
            .map(|e| e.id)
            .collect()
    }
}

/// Back-index from a user to the ids of orders they created in one family.
/// Order records are owned by the engine; this account only references
/// them. Keeping the index per family lets a full vec shed settled ids by
/// consulting that family's registry.
#[account]
#[derive(InitSpace)]
pub struct UserOrders {
    pub owner: Pubkey,
    pub family: OrderFamily,
    #[max_len(MAX_ORDERS_PER_USER)]
    pub order_ids: Vec<u64>,
    pub bump: u8,
}

impl UserOrders {
    /// Track a new order id, shedding settled ids when the vec is full. Ids
    /// the registry no longer tracks were pruned as terminal, so dropping
    /// them here loses nothing; the cap only binds on concurrently live
    /// orders.
    pub fn push(&mut self, id: u64, registry: &OrderRegistry) -> Result<()> {
        if self.order_ids.len() >= MAX_ORDERS_PER_USER {
            self.order_ids.retain(|tracked| registry.is_live(*tracked));
        }
        require!(
            self.order_ids.len() < MAX_ORDERS_PER_USER,
            ErrorCode::UserOrdersFull
        );
        self.order_ids.push(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> OrderRegistry {
        OrderRegistry {
            family: OrderFamily::Limit,
            entries: vec![],
            bump: 0,
        }
    }

    #[test]
    fn insert_and_query_by_status_and_pool() {
        let mut reg = registry();
        let pool_a = Pubkey::new_unique();
        let pool_b = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        reg.insert(1, owner, pool_a).unwrap();
        reg.insert(2, owner, pool_b).unwrap();
        reg.insert(3, owner, pool_a).unwrap();
        reg.set_status(2, OrderStatus::Filled).unwrap();

        assert_eq!(reg.active_ids(), vec![1, 3]);
        assert_eq!(reg.ids_with_status(OrderStatus::Filled), vec![2]);
        assert_eq!(reg.ids_for_pool(&pool_a), vec![1, 3]);
    }

    #[test]
    fn unknown_id_errors() {
        let mut reg = registry();
        assert!(reg.set_status(9, OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn pruned_entry_does_not_block_cancel_bookkeeping() {
        let mut reg = registry();
        let owner = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        for id in 0..MAX_TRACKED_ORDERS as u64 {
            reg.insert(id, owner, pool).unwrap();
        }
        // order 0 expires, then an at-capacity insert prunes its entry
        reg.set_status(0, OrderStatus::Expired).unwrap();
        reg.insert(999, owner, pool).unwrap();
        assert!(reg.entries.iter().all(|e| e.id != 0));

        // the owner reclaiming the expired escrow must still succeed
        assert!(reg.set_status(0, OrderStatus::Expired).is_err());
        reg.note_status(0, OrderStatus::Expired);
        // a tracked id is still updated through the tolerant path
        reg.note_status(999, OrderStatus::Cancelled);
        assert_eq!(reg.ids_with_status(OrderStatus::Cancelled), vec![999]);
    }

    fn user_orders() -> UserOrders {
        UserOrders {
            owner: Pubkey::new_unique(),
            family: OrderFamily::Limit,
            order_ids: vec![],
            bump: 0,
        }
    }

    #[test]
    fn full_user_index_sheds_settled_ids() {
        let mut reg = registry();
        let mut user = user_orders();
        let pool = Pubkey::new_unique();
        for id in 0..MAX_ORDERS_PER_USER as u64 {
            reg.insert(id, user.owner, pool).unwrap();
            user.push(id, &reg).unwrap();
        }
        // every id live: the cap binds
        assert!(user.push(9_999, &reg).is_err());

        // settle one order; the next push reclaims its slot
        reg.set_status(3, OrderStatus::Filled).unwrap();
        user.push(9_999, &reg).unwrap();
        assert!(!user.order_ids.contains(&3));
        assert!(user.order_ids.contains(&9_999));
    }

    #[test]
    fn user_index_sheds_ids_the_registry_pruned() {
        let mut reg = registry();
        let mut user = user_orders();
        let pool = Pubkey::new_unique();
        for id in 0..MAX_ORDERS_PER_USER as u64 {
            reg.insert(id, user.owner, pool).unwrap();
            user.push(id, &reg).unwrap();
        }
        // order 7 settles and its registry entry is pruned by later inserts
        reg.set_status(7, OrderStatus::Cancelled).unwrap();
        for id in 100..100 + (MAX_TRACKED_ORDERS - MAX_ORDERS_PER_USER + 1) as u64 {
            reg.insert(id, Pubkey::new_unique(), pool).unwrap();
        }
        assert!(reg.entries.iter().all(|e| e.id != 7));

        // absent from the registry means settled: the slot is reclaimable
        user.push(9_999, &reg).unwrap();
        assert!(!user.order_ids.contains(&7));
    }

    #[test]
    fn capacity_prunes_terminal_entries_first() {
        let mut reg = registry();
        let owner = Pubkey::new_unique();
        let pool = Pubkey::new_unique();
        for id in 0..MAX_TRACKED_ORDERS as u64 {
            reg.insert(id, owner, pool).unwrap();
        }
        // all live: no room
        assert!(reg.insert(999, owner, pool).is_err());

        reg.set_status(5, OrderStatus::Cancelled).unwrap();
        reg.insert(999, owner, pool).unwrap();
        assert!(reg.entries.iter().all(|e| e.id != 5));
        assert!(reg.active_ids().contains(&999));
    }
}

//! Read-only views over stored actions.

use crate::keeper::ActionKeeper;
use action_types::{Action, ActionState, ActionType, Coin, Params, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching items before paging
    pub total: usize,
}

impl<T> Page<T> {
    fn from_vec(all: Vec<T>, page: PageRequest) -> Self {
        let total = all.len();
        let limit = if page.limit == 0 { DEFAULT_PAGE_LIMIT } else { page.limit };
        let items = all.into_iter().skip(page.offset).take(limit).collect();
        Self { items, total }
    }
}

impl ActionKeeper {
    pub fn query_params(&self) -> Result<Params> {
        self.params()
    }

    /// Fee a request declaring `data_size_kbs` must cover
    pub fn get_action_fee(&self, data_size_kbs: u64) -> Result<Coin> {
        let params = self.params()?;
        Ok(Coin::new(params.action_fee(data_size_kbs), params.fee_denom()))
    }

    pub fn list_actions(
        &self,
        state: Option<ActionState>,
        action_type: Option<ActionType>,
        page: PageRequest,
    ) -> Result<Page<Action>> {
        let actions = match state {
            Some(state) => self.store.actions_by_state(state)?,
            None => self.store.all_actions()?,
        };
        let filtered = actions
            .into_iter()
            .filter(|a| action_type.map_or(true, |t| a.action_type == t))
            .collect();
        Ok(Page::from_vec(filtered, page))
    }

    pub fn list_actions_by_creator(
        &self,
        creator: &str,
        page: PageRequest,
    ) -> Result<Page<Action>> {
        Ok(Page::from_vec(self.store.actions_by_creator(creator)?, page))
    }

    pub fn list_actions_by_supernode(
        &self,
        supernode: &str,
        page: PageRequest,
    ) -> Result<Page<Action>> {
        Ok(Page::from_vec(self.store.actions_by_supernode(supernode)?, page))
    }

    pub fn list_actions_by_block_height(
        &self,
        height: u64,
        page: PageRequest,
    ) -> Result<Page<Action>> {
        Ok(Page::from_vec(self.store.actions_by_height(height)?, page))
    }

    pub fn list_expired_actions(&self, page: PageRequest) -> Result<Page<Action>> {
        Ok(Page::from_vec(self.store.actions_by_state(ActionState::Expired)?, page))
    }
}

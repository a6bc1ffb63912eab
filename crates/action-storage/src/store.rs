use crate::backend::{KvBackend, Result, StorageError, WriteBatch};
use crate::key_prefix::*;
use action_types::{Action, ActionState, Params};
use std::sync::Arc;
use tracing::{debug, warn};

/// First id handed out on an empty store
pub const FIRST_ACTION_ID: u64 = 1;

/// Typed action state on top of a [`KvBackend`].
///
/// Every write updates the primary record and its state, creator, supernode
/// and height index entries in one batch.
#[derive(Clone)]
pub struct ActionStore {
    backend: Arc<dyn KvBackend>,
}

impl ActionStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    pub fn get_action(&self, id: &str) -> Result<Option<Action>> {
        match self.backend.get(&action_key(id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn has_action(&self, id: &str) -> Result<bool> {
        Ok(self.backend.get(&action_key(id))?.is_some())
    }

    /// Id the next registration will receive; reading it does not consume it
    pub fn next_action_id(&self) -> Result<u64> {
        match self.backend.get(&next_action_id_key())? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StorageError::SerializationError("corrupt action id counter".to_string())
                })?;
                Ok(u64::from_be_bytes(raw))
            }
            None => Ok(FIRST_ACTION_ID),
        }
    }

    /// Persist a newly registered action and advance the id counter past it
    pub fn insert_action(&self, action: &Action) -> Result<()> {
        if self.has_action(&action.id)? {
            return Err(StorageError::AlreadyExists(action.id.clone()));
        }

        let mut batch = WriteBatch::new();
        self.stage_indices(&mut batch, None, action);
        batch.put(action_key(&action.id), bincode::serialize(action)?);

        if let Ok(numeric) = action.id.parse::<u64>() {
            let next = self.next_action_id()?.max(numeric.saturating_add(1));
            batch.put(next_action_id_key(), next.to_be_bytes().to_vec());
        }

        self.backend.write(batch)?;
        debug!(action_id = %action.id, state = %action.state, "💾 Action stored");
        Ok(())
    }

    /// Overwrite an existing action, moving its index entries with it
    pub fn update_action(&self, action: &Action) -> Result<()> {
        let previous = self
            .get_action(&action.id)?
            .ok_or_else(|| StorageError::NotFound(action.id.clone()))?;

        let mut batch = WriteBatch::new();
        self.stage_indices(&mut batch, Some(&previous), action);
        batch.put(action_key(&action.id), bincode::serialize(action)?);
        self.backend.write(batch)?;

        debug!(
            action_id = %action.id,
            from = %previous.state,
            to = %action.state,
            "💾 Action updated"
        );
        Ok(())
    }

    fn stage_indices(&self, batch: &mut WriteBatch, previous: Option<&Action>, next: &Action) {
        let id = next.id.as_str();

        match previous {
            Some(prev) if prev.state == next.state => {}
            Some(prev) => {
                batch.delete(state_index_key(prev.state, id));
                batch.put(state_index_key(next.state, id), Vec::new());
            }
            None => batch.put(state_index_key(next.state, id), Vec::new()),
        }

        match previous {
            Some(prev) if prev.creator == next.creator => {}
            Some(prev) => {
                batch.delete(creator_index_key(&prev.creator, id));
                batch.put(creator_index_key(&next.creator, id), Vec::new());
            }
            None => batch.put(creator_index_key(&next.creator, id), Vec::new()),
        }

        match previous {
            Some(prev) if prev.block_height == next.block_height => {}
            Some(prev) => {
                batch.delete(height_index_key(prev.block_height, id));
                batch.put(height_index_key(next.block_height, id), Vec::new());
            }
            None => batch.put(height_index_key(next.block_height, id), Vec::new()),
        }

        for supernode in &next.super_nodes {
            let known = previous.map_or(false, |prev| prev.has_attested(supernode));
            if !known {
                batch.put(supernode_index_key(supernode, id), Vec::new());
            }
        }
    }

    pub fn action_ids_by_state(&self, state: ActionState) -> Result<Vec<String>> {
        self.ids_under(&state_prefix(state))
    }

    pub fn actions_by_state(&self, state: ActionState) -> Result<Vec<Action>> {
        self.load_all(self.action_ids_by_state(state)?)
    }

    pub fn actions_by_creator(&self, creator: &str) -> Result<Vec<Action>> {
        self.load_all(self.ids_under(&creator_prefix(creator))?)
    }

    pub fn actions_by_supernode(&self, supernode: &str) -> Result<Vec<Action>> {
        self.load_all(self.ids_under(&supernode_prefix(supernode))?)
    }

    pub fn actions_by_height(&self, height: u64) -> Result<Vec<Action>> {
        self.load_all(self.ids_under(&height_prefix(height))?)
    }

    /// Every stored action in id order
    pub fn all_actions(&self) -> Result<Vec<Action>> {
        let mut actions = self
            .backend
            .scan_prefix(&*PREFIX_ACTION)?
            .into_iter()
            .map(|(_, bytes)| bincode::deserialize::<Action>(&bytes).map_err(StorageError::from))
            .collect::<Result<Vec<_>>>()?;
        actions.sort_by(|a, b| id_order(&a.id, &b.id));
        Ok(actions)
    }

    fn ids_under(&self, prefix: &[u8]) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self
            .backend
            .scan_prefix(prefix)?
            .into_iter()
            .filter_map(|(key, _)| id_from_index_key(&key, prefix))
            .collect();
        ids.sort_by(|a, b| id_order(a, b));
        Ok(ids)
    }

    fn load_all(&self, ids: Vec<String>) -> Result<Vec<Action>> {
        let mut actions = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_action(&id)? {
                Some(action) => actions.push(action),
                None => warn!(action_id = %id, "⚠️ Index entry without primary record"),
            }
        }
        Ok(actions)
    }

    pub fn get_params(&self) -> Result<Option<Params>> {
        match self.backend.get(&params_key())? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StorageError::SerializationError(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn set_params(&self, params: &Params) -> Result<()> {
        let bytes = serde_json::to_vec(params)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        self.backend.put(params_key(), bytes)
    }
}

/// Numeric ids compare by value; shorter decimal strings sort first
fn id_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use action_types::ActionType;

    fn store() -> ActionStore {
        ActionStore::new(Arc::new(MemoryBackend::new()))
    }

    fn action(id: &str, creator: &str) -> Action {
        let mut action = Action::new(creator, ActionType::Cascade, vec![1, 2], "100ulume", 0);
        action.id = id.to_string();
        action.state = ActionState::Pending;
        action.block_height = 5;
        action
    }

    #[test]
    fn test_counter_advances_on_insert_only() {
        let store = store();
        assert_eq!(store.next_action_id().unwrap(), FIRST_ACTION_ID);
        assert_eq!(store.next_action_id().unwrap(), FIRST_ACTION_ID);

        store.insert_action(&action("1", "alice")).unwrap();
        assert_eq!(store.next_action_id().unwrap(), 2);

        assert!(matches!(
            store.insert_action(&action("1", "alice")),
            Err(StorageError::AlreadyExists(_))
        ));
        assert_eq!(store.next_action_id().unwrap(), 2);
    }

    #[test]
    fn test_state_move_updates_index() {
        let store = store();
        let mut a = action("1", "alice");
        store.insert_action(&a).unwrap();

        a.state = ActionState::Done;
        a.super_nodes.push("sn1".to_string());
        store.update_action(&a).unwrap();

        assert!(store.action_ids_by_state(ActionState::Pending).unwrap().is_empty());
        assert_eq!(store.action_ids_by_state(ActionState::Done).unwrap(), vec!["1"]);
        assert_eq!(store.actions_by_supernode("sn1").unwrap().len(), 1);
        assert_eq!(store.actions_by_creator("alice").unwrap()[0], a);
        assert_eq!(store.actions_by_height(5).unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_action() {
        let err = store().update_action(&action("9", "bob")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_ids_sorted_numerically() {
        let store = store();
        for id in ["10", "2", "1"] {
            store.insert_action(&action(id, "alice")).unwrap();
        }
        assert_eq!(
            store.action_ids_by_state(ActionState::Pending).unwrap(),
            vec!["1", "2", "10"]
        );
        assert_eq!(store.next_action_id().unwrap(), 11);
    }

    #[test]
    fn test_params_roundtrip() {
        let store = store();
        assert!(store.get_params().unwrap().is_none());
        store.set_params(&Params::default()).unwrap();
        assert_eq!(store.get_params().unwrap(), Some(Params::default()));
    }
}

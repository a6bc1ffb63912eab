use crate::handlers::{ActionHandler, CascadeHandler, SenseHandler};
use action_crypto::SignatureVerifier;
use action_types::{ActionError, ActionType, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable map from action type to its handler, built once at startup
#[derive(Clone)]
pub struct ActionRegistry {
    handlers: HashMap<ActionType, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Registry with the Sense and Cascade handlers
    pub fn new(verifier: SignatureVerifier) -> Self {
        let sense: Arc<dyn ActionHandler> = Arc::new(SenseHandler::new(verifier.clone()));
        let cascade: Arc<dyn ActionHandler> = Arc::new(CascadeHandler::new(verifier));
        Self::from_handlers(vec![sense, cascade])
    }

    /// Later handlers for the same type replace earlier ones
    pub fn from_handlers(handlers: Vec<Arc<dyn ActionHandler>>) -> Self {
        let handlers = handlers
            .into_iter()
            .filter(|h| h.action_type() != ActionType::Unspecified)
            .map(|h| (h.action_type(), h))
            .collect();
        Self { handlers }
    }

    pub fn handler(&self, action_type: ActionType) -> Result<&Arc<dyn ActionHandler>> {
        self.handlers
            .get(&action_type)
            .ok_or_else(|| ActionError::UnsupportedActionType(action_type.to_string()))
    }

    pub fn is_registered(&self, action_type: ActionType) -> bool {
        self.handlers.contains_key(&action_type)
    }

    pub fn registered_types(&self) -> Vec<ActionType> {
        let mut types: Vec<_> = self.handlers.keys().copied().collect();
        types.sort();
        types
    }
}

//! Key layout for action state.
//!
//! Every key starts with a fixed 10-byte prefix taken from blake3 of the
//! keyspace name. Composite index keys separate their address component from
//! the action id with a NUL byte, which never occurs in bech32 addresses.

use action_types::ActionState;

/// Fixed prefix length for all keys
pub const PREFIX_LEN: usize = 10;

const SEPARATOR: u8 = 0x00;

lazy_static::lazy_static! {
    /// Primary record: `action:{id}`
    pub static ref PREFIX_ACTION: [u8; PREFIX_LEN] = hash_prefix(b"action");

    /// State index: `state:{state_code}{id}`
    pub static ref PREFIX_STATE: [u8; PREFIX_LEN] = hash_prefix(b"state");

    /// Creator index: `creator:{address}\0{id}`
    pub static ref PREFIX_CREATOR: [u8; PREFIX_LEN] = hash_prefix(b"creator");

    /// Supernode index: `supernode:{address}\0{id}`
    pub static ref PREFIX_SUPERNODE: [u8; PREFIX_LEN] = hash_prefix(b"supernode");

    /// Block height index: `height:{height_be}{id}`
    pub static ref PREFIX_HEIGHT: [u8; PREFIX_LEN] = hash_prefix(b"height");

    /// Next action id counter
    pub static ref PREFIX_NEXT_ACTION_ID: [u8; PREFIX_LEN] = hash_prefix(b"next_action_id");

    /// Module parameters
    pub static ref PREFIX_PARAMS: [u8; PREFIX_LEN] = hash_prefix(b"params");
}

fn hash_prefix(prefix: &[u8]) -> [u8; PREFIX_LEN] {
    let hash = blake3::hash(prefix);
    let mut result = [0u8; PREFIX_LEN];
    result.copy_from_slice(&hash.as_bytes()[..PREFIX_LEN]);
    result
}

fn join(prefix: &[u8; PREFIX_LEN], parts: &[&[u8]]) -> Vec<u8> {
    let len = PREFIX_LEN + parts.iter().map(|p| p.len()).sum::<usize>();
    let mut key = Vec::with_capacity(len);
    key.extend_from_slice(prefix);
    for part in parts {
        key.extend_from_slice(part);
    }
    key
}

pub fn action_key(id: &str) -> Vec<u8> {
    join(&PREFIX_ACTION, &[id.as_bytes()])
}

pub fn state_prefix(state: ActionState) -> Vec<u8> {
    join(&PREFIX_STATE, &[&[state.code()]])
}

pub fn state_index_key(state: ActionState, id: &str) -> Vec<u8> {
    join(&PREFIX_STATE, &[&[state.code()], id.as_bytes()])
}

pub fn creator_prefix(creator: &str) -> Vec<u8> {
    join(&PREFIX_CREATOR, &[creator.as_bytes(), &[SEPARATOR]])
}

pub fn creator_index_key(creator: &str, id: &str) -> Vec<u8> {
    join(&PREFIX_CREATOR, &[creator.as_bytes(), &[SEPARATOR], id.as_bytes()])
}

pub fn supernode_prefix(supernode: &str) -> Vec<u8> {
    join(&PREFIX_SUPERNODE, &[supernode.as_bytes(), &[SEPARATOR]])
}

pub fn supernode_index_key(supernode: &str, id: &str) -> Vec<u8> {
    join(
        &PREFIX_SUPERNODE,
        &[supernode.as_bytes(), &[SEPARATOR], id.as_bytes()],
    )
}

pub fn height_prefix(height: u64) -> Vec<u8> {
    join(&PREFIX_HEIGHT, &[&height.to_be_bytes()])
}

pub fn height_index_key(height: u64, id: &str) -> Vec<u8> {
    join(&PREFIX_HEIGHT, &[&height.to_be_bytes(), id.as_bytes()])
}

pub fn next_action_id_key() -> Vec<u8> {
    PREFIX_NEXT_ACTION_ID.to_vec()
}

pub fn params_key() -> Vec<u8> {
    PREFIX_PARAMS.to_vec()
}

/// Action id carried at the tail of an index key built from `prefix`
pub fn id_from_index_key(key: &[u8], prefix: &[u8]) -> Option<String> {
    key.strip_prefix(prefix)
        .and_then(|tail| String::from_utf8(tail.to_vec()).ok())
        .filter(|id| !id.is_empty())
}

/// Decode a prefix hash back to its keyspace name
pub fn prefix_name(prefix: &[u8; PREFIX_LEN]) -> Option<&'static str> {
    [
        (&*PREFIX_ACTION, "action"),
        (&*PREFIX_STATE, "state"),
        (&*PREFIX_CREATOR, "creator"),
        (&*PREFIX_SUPERNODE, "supernode"),
        (&*PREFIX_HEIGHT, "height"),
        (&*PREFIX_NEXT_ACTION_ID, "next_action_id"),
        (&*PREFIX_PARAMS, "params"),
    ]
    .into_iter()
    .find(|(p, _)| *p == prefix)
    .map(|(_, name)| name)
}

#![allow(dead_code)]

use action_crypto::{create_kademlia_ids, MemoryAccountKeeper, SignatureVerifier};
use action_escrow::{EscrowLedger, MemoryLedger};
use action_keeper::config::DEFAULT_MODULE_ADDRESS;
use action_keeper::*;
use action_storage::{ActionStore, KvBackend, MemoryBackend};
use action_types::{encode_address, Amount, BlockContext, Coin, Params, DEFAULT_ADDRESS_PREFIX};
use base64::{engine::general_purpose, Engine};
use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey};
use serde_json::json;
use std::sync::Arc;

pub const DENOM: &str = "ulume";
pub const GENESIS_TIME: i64 = 1_700_000_000;
pub const CREATOR_FUNDS: Amount = 1_000_000;

pub struct TestAccount {
    pub address: String,
    pub key: SigningKey,
}

impl TestAccount {
    pub fn new(seed: u8) -> Self {
        let key = SigningKey::from_slice(&[seed; 32]).unwrap();
        let address = encode_address(DEFAULT_ADDRESS_PREFIX, &[seed; 20]).unwrap();
        Self { address, key }
    }

    pub fn public_key(&self) -> Vec<u8> {
        self.key.verifying_key().to_encoded_point(true).as_bytes().to_vec()
    }

    pub fn sign_b64(&self, msg: &[u8]) -> String {
        let sig: Signature = self.key.sign(msg);
        general_purpose::STANDARD.encode(sig.to_bytes())
    }

    /// `<payload>.<signature>` over a fixed payload
    pub fn signatures(&self, payload: &str) -> String {
        format!("{}.{}", payload, self.sign_b64(payload.as_bytes()))
    }
}

pub struct Harness {
    pub keeper: Arc<ActionKeeper>,
    pub msg_server: MsgServer,
    pub ledger: Arc<MemoryLedger>,
    pub ranking: Arc<MemoryRanking>,
    pub evidence: Arc<MemoryEvidenceStore>,
    pub events: Arc<MemoryEventSink>,
    pub accounts: Arc<MemoryAccountKeeper>,
    pub creator: TestAccount,
    pub supernodes: Vec<TestAccount>,
    pub outsider: TestAccount,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(Arc::new(MemoryBackend::new()), None)
    }

    pub fn with_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self::build(backend, None)
    }

    pub fn with_handlers(handlers: Vec<Arc<dyn ActionHandler>>) -> Self {
        Self::build(Arc::new(MemoryBackend::new()), Some(handlers))
    }

    fn build(backend: Arc<dyn KvBackend>, handlers: Option<Vec<Arc<dyn ActionHandler>>>) -> Self {
        let accounts = Arc::new(MemoryAccountKeeper::new());
        let ledger = Arc::new(MemoryLedger::new(DEFAULT_MODULE_ADDRESS));
        let ranking = Arc::new(MemoryRanking::new());
        let evidence = Arc::new(MemoryEvidenceStore::new());
        let events = Arc::new(MemoryEventSink::new());

        let verifier = SignatureVerifier::new(accounts.clone());
        let registry = match handlers {
            Some(handlers) => ActionRegistry::from_handlers(handlers),
            None => ActionRegistry::new(verifier),
        };

        let keeper = Arc::new(ActionKeeper::new(
            KeeperConfig::default(),
            KeeperServices {
                store: ActionStore::new(backend),
                registry,
                ledger: ledger.clone(),
                ranking: ranking.clone(),
                evidence: evidence.clone(),
                events: events.clone(),
            },
        ));
        keeper.init_genesis(&Params::default()).unwrap();

        let creator = TestAccount::new(0x11);
        let supernodes: Vec<TestAccount> = (0x21..0x24).map(TestAccount::new).collect();
        let outsider = TestAccount::new(0x31);

        for account in std::iter::once(&creator)
            .chain(supernodes.iter())
            .chain(std::iter::once(&outsider))
        {
            accounts.set_public_key(account.address.clone(), account.public_key());
        }
        ledger
            .fund(&creator.address, &Coin::new(CREATOR_FUNDS, DENOM))
            .unwrap();
        ranking.set_snapshot(
            0,
            supernodes.iter().map(|sn| sn.address.clone()).collect(),
        );

        Self {
            msg_server: MsgServer::new(keeper.clone()),
            keeper,
            ledger,
            ranking,
            evidence,
            events,
            accounts,
            creator,
            supernodes,
            outsider,
        }
    }

    pub fn sn(&self, i: usize) -> &TestAccount {
        &self.supernodes[i]
    }

    pub fn balance(&self, address: &str) -> Amount {
        self.ledger.balance_of(address, DENOM).unwrap()
    }

    pub fn request_cascade(
        &self,
        ctx: BlockContext,
        price: &str,
        expiration: &str,
    ) -> action_types::Result<String> {
        self.msg_server
            .request_action(
                ctx,
                MsgRequestAction {
                    creator: self.creator.address.clone(),
                    action_type: "CASCADE".to_string(),
                    metadata: cascade_request(&self.creator),
                    price: price.to_string(),
                    expiration_time: expiration.to_string(),
                    file_size_kbs: 0,
                },
            )
            .map(|r| r.action_id)
    }

    pub fn request_sense(
        &self,
        ctx: BlockContext,
        price: &str,
        expiration: &str,
    ) -> action_types::Result<String> {
        self.msg_server
            .request_action(
                ctx,
                MsgRequestAction {
                    creator: self.creator.address.clone(),
                    action_type: "SENSE".to_string(),
                    metadata: sense_request(),
                    price: price.to_string(),
                    expiration_time: expiration.to_string(),
                    file_size_kbs: 0,
                },
            )
            .map(|r| r.action_id)
    }

    pub fn finalize(
        &self,
        ctx: BlockContext,
        action_id: &str,
        supernode: &TestAccount,
        action_type: &str,
        metadata: String,
    ) -> action_types::Result<action_types::ActionState> {
        self.msg_server
            .finalize_action(
                ctx,
                MsgFinalizeAction {
                    creator: supernode.address.clone(),
                    action_id: action_id.to_string(),
                    action_type: action_type.to_string(),
                    metadata,
                },
            )
            .map(|r| r.status)
    }

    /// Honest Cascade attestation for a request made with [`cascade_request`]
    pub fn finalize_cascade(
        &self,
        ctx: BlockContext,
        action_id: &str,
        supernode: &TestAccount,
    ) -> action_types::Result<action_types::ActionState> {
        let params = self.keeper.params().unwrap();
        let signatures = self.creator.signatures(CASCADE_PAYLOAD);
        let metadata = cascade_finalize(&signatures, 0, params.max_raptor_q_symbols);
        self.finalize(ctx, action_id, supernode, "CASCADE", metadata)
    }

    /// Honest Sense attestation signed by `supernode`
    pub fn finalize_sense(
        &self,
        ctx: BlockContext,
        action_id: &str,
        supernode: &TestAccount,
    ) -> action_types::Result<action_types::ActionState> {
        let params = self.keeper.params().unwrap();
        let metadata = sense_finalize(supernode, SENSE_IC, params.max_dd_and_fingerprints);
        self.finalize(ctx, action_id, supernode, "SENSE", metadata)
    }
}

pub fn ctx(height: u64) -> BlockContext {
    BlockContext::new(height, GENESIS_TIME + height as i64 * 6)
}

pub const CASCADE_PAYLOAD: &str = "eyJmaWxlIjoiZGF0YS5iaW4ifQ==";
pub const SENSE_PAYLOAD: &str = "eyJzZW5zZSI6InJlc3VsdCJ9";
pub const SENSE_IC: u64 = 7;

pub fn cascade_request(creator: &TestAccount) -> String {
    json!({
        "data_hash": "b3f1c0ffee",
        "file_name": "data.bin",
        "rq_ids_ic": 0,
        "signatures": creator.signatures(CASCADE_PAYLOAD),
    })
    .to_string()
}

pub fn cascade_finalize(signatures: &str, ic: u64, count: u64) -> String {
    json!({ "rq_ids_ids": create_kademlia_ids(signatures, ic, count).unwrap() }).to_string()
}

pub fn sense_request() -> String {
    json!({
        "data_hash": "a1b2c3",
        "dd_and_fingerprints_ic": SENSE_IC,
        "collection_id": "collection-1",
    })
    .to_string()
}

pub fn sense_finalize(supernode: &TestAccount, ic: u64, count: u64) -> String {
    let signatures = supernode.signatures(SENSE_PAYLOAD);
    json!({
        "dd_and_fingerprints_ids": create_kademlia_ids(&signatures, ic, count).unwrap(),
        "signatures": signatures,
    })
    .to_string()
}

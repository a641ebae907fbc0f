use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::blockchain::core::validation::{validate_chain, ChainViolation};
use crate::crypto;
use crate::mempool::Mempool;
use crate::miner::ProofOfWork;
use crate::transaction::{Transaction, MINING_REWARD, REWARD_SENDER};

/// Proof recorded in the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// `previous_hash` of the genesis block; marks it as not computed.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A sealed block. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Hex SHA-256 of the block's canonical JSON form.
    pub fn hash(&self) -> String {
        crypto::hash_block(self)
    }

    pub fn to_json(&self) -> Value {
        let transactions: Vec<Value> = self.transactions.iter().map(Transaction::to_json).collect();
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "transactions": transactions,
            "proof": self.proof,
            "previous_hash": self.previous_hash,
        })
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 1 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}

/// The ledger: an append-only chain plus the pool of pending transactions.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    mempool: Mempool,
    pow: ProofOfWork,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a ledger holding only the genesis block, using the default
    /// proof-of-work engine.
    pub fn new() -> Self {
        Self::with_proof_of_work(ProofOfWork::default())
    }

    /// Create a ledger whose proofs are searched and checked with `pow`.
    pub fn with_proof_of_work(pow: ProofOfWork) -> Self {
        let mut blockchain = Blockchain {
            blocks: Vec::new(),
            mempool: Mempool::new(),
            pow,
        };
        blockchain.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        blockchain
    }

    /// Queue a transaction for the next block and return that block's index.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> u64 {
        self.mempool
            .add_transaction(Transaction::new(sender, recipient, amount));
        self.next_index()
    }

    /// Seal every pending transaction into a new block and append it.
    ///
    /// When `previous_hash` is `None` the hash of the current last block is
    /// used. Draining the pool and appending the block happen in this single
    /// call, so a transaction lands in exactly one block.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        let previous_hash = match (previous_hash, self.blocks.last()) {
            (Some(hash), _) => hash,
            (None, Some(last)) => last.hash(),
            (None, None) => GENESIS_PREVIOUS_HASH.to_string(),
        };

        // Timestamps never go backwards along the chain, even if the clock does.
        let mut timestamp = current_timestamp();
        if let Some(last) = self.blocks.last() {
            if timestamp < last.timestamp {
                timestamp = last.timestamp;
            }
        }

        let block = Block {
            index: self.blocks.len() as u64 + 1,
            timestamp,
            transactions: self.mempool.drain(),
            proof,
            previous_hash,
        };

        self.blocks.push(block.clone());
        block
    }

    /// Record the mining reward for `miner` and seal the block for `proof`.
    pub fn reward_and_seal(&mut self, proof: u64, miner: &str, previous_hash: String) -> Block {
        self.new_transaction(REWARD_SENDER, miner, MINING_REWARD);
        self.new_block(proof, Some(previous_hash))
    }

    /// Run the whole mining flow synchronously: search the proof for the last
    /// block, pay `miner`, and append the new block.
    pub fn mine(&mut self, miner: &str) -> Block {
        let last_block = self.last_block();
        let last_proof = last_block.proof;
        let previous_hash = last_block.hash();
        let proof = self.pow.proof_of_work(last_proof);
        self.reward_and_seal(proof, miner, previous_hash)
    }

    pub fn last_block(&self) -> &Block {
        // The genesis block is appended on construction and blocks are never
        // removed, so the chain is never empty.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn next_index(&self) -> u64 {
        self.last_block().index + 1
    }

    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        self.mempool.get_all_transactions()
    }

    pub fn proof_of_work_engine(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Check an arbitrary candidate chain with this ledger's puzzle rules.
    /// The ledger's own blocks play no part.
    pub fn valid_chain(&self, candidate: &[Block]) -> bool {
        validate_chain(candidate, &self.pow).is_ok()
    }

    /// Validate the ledger's own chain.
    pub fn is_valid(&self) -> Result<(), ChainViolation> {
        validate_chain(&self.blocks, &self.pow)
    }
}

fn current_timestamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

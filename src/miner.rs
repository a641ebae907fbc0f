//! Proof-of-work puzzle
//!
//! A proof `p'` is valid for the previous proof `p` when the digest of the
//! decimal text `"{p}{p'}"` starts with [`DIFFICULTY`] zero characters.
//! Finding one is an exhaustive search from zero upward.

use crate::crypto::sha256_hex;

/// Number of leading `'0'` hex characters a valid proof digest must have.
pub const DIFFICULTY: usize = 4;

/// Upper bound accepted for a configured difficulty (a SHA-256 hex digest has
/// 64 characters).
pub const MAX_DIFFICULTY: usize = 64;

/// Digest function used by the puzzle; must return a hex string.
pub type DigestFn = fn(&[u8]) -> String;

/// Proof-of-work engine with pluggable difficulty and digest.
#[derive(Debug, Clone, Copy)]
pub struct ProofOfWork {
    difficulty: usize,
    digest: DigestFn,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        ProofOfWork {
            difficulty: DIFFICULTY,
            digest: sha256_hex,
        }
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        ProofOfWork {
            difficulty,
            ..Default::default()
        }
    }

    /// Replace the digest function, keeping the difficulty.
    pub fn with_digest(mut self, digest: DigestFn) -> Self {
        self.digest = digest;
        self
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn valid_proof(&self, last_proof: u64, proof: u64) -> bool {
        let guess = format!("{}{}", last_proof, proof);
        let guess_hash = (self.digest)(guess.as_bytes());
        guess_hash.len() >= self.difficulty
            && guess_hash.bytes().take(self.difficulty).all(|b| b == b'0')
    }

    /// First proof, counting up from zero, that satisfies `valid_proof`.
    ///
    /// Blocks the caller for the whole search.
    pub fn proof_of_work(&self, last_proof: u64) -> u64 {
        let mut proof = 0u64;
        while !self.valid_proof(last_proof, proof) {
            proof += 1;
        }
        tracing::debug!(last_proof, proof, difficulty = self.difficulty, "proof found");
        proof
    }
}

/// `valid_proof` at the default difficulty with SHA-256.
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    ProofOfWork::default().valid_proof(last_proof, proof)
}

/// `proof_of_work` at the default difficulty with SHA-256.
pub fn proof_of_work(last_proof: u64) -> u64 {
    ProofOfWork::default().proof_of_work(last_proof)
}

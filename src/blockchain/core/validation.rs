use std::fmt;

use serde::Serialize;

use crate::blockchain::core::chain::Block;
use crate::miner::ProofOfWork;

/// Which chain invariant a block broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    EmptyChain,
    PreviousHashMismatch { expected: String, found: String },
    IndexDiscontinuity { previous: u64, found: u64 },
    InvalidProof { last_proof: u64, proof: u64 },
}

/// First invariant violation found while walking a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainViolation {
    /// Zero-based position of the offending block in the candidate.
    pub position: usize,
    /// Index recorded in the offending block.
    pub index: u64,
    #[serde(flatten)]
    pub kind: ViolationKind,
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            ViolationKind::EmptyChain => write!(f, "Chain contains no blocks"),
            ViolationKind::PreviousHashMismatch { expected, found } => write!(
                f,
                "Block {} (position {}) has previous_hash {}, expected {}",
                self.index, self.position, found, expected
            ),
            ViolationKind::IndexDiscontinuity { previous, found } => write!(
                f,
                "Block at position {} has index {} following index {}",
                self.position, found, previous
            ),
            ViolationKind::InvalidProof { last_proof, proof } => write!(
                f,
                "Block {} (position {}) has proof {} which does not solve last proof {}",
                self.index, self.position, proof, last_proof
            ),
        }
    }
}

impl std::error::Error for ChainViolation {}

/// Walk `chain` pairwise from the second block and report the first broken
/// invariant: hash linkage, index continuity, or proof validity.
///
/// A chain holding only its first block is valid. An empty chain is not.
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> Result<(), ChainViolation> {
    if chain.is_empty() {
        return Err(ChainViolation {
            position: 0,
            index: 0,
            kind: ViolationKind::EmptyChain,
        });
    }

    for (position, pair) in chain.windows(2).enumerate() {
        let (last_block, block) = (&pair[0], &pair[1]);
        let position = position + 1;

        let expected_hash = last_block.hash();
        if block.previous_hash != expected_hash {
            return Err(ChainViolation {
                position,
                index: block.index,
                kind: ViolationKind::PreviousHashMismatch {
                    expected: expected_hash,
                    found: block.previous_hash.clone(),
                },
            });
        }

        if last_block.index.checked_add(1) != Some(block.index) {
            return Err(ChainViolation {
                position,
                index: block.index,
                kind: ViolationKind::IndexDiscontinuity {
                    previous: last_block.index,
                    found: block.index,
                },
            });
        }

        if !pow.valid_proof(last_block.proof, block.proof) {
            return Err(ChainViolation {
                position,
                index: block.index,
                kind: ViolationKind::InvalidProof {
                    last_proof: last_block.proof,
                    proof: block.proof,
                },
            });
        }
    }

    Ok(())
}

/// Boolean form of [`validate_chain`].
pub fn valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    validate_chain(chain, pow).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Blockchain;

    fn mined_chain(blocks: usize) -> (Vec<Block>, ProofOfWork) {
        let pow = ProofOfWork::new(2);
        let mut chain = Blockchain::with_proof_of_work(pow);
        for i in 0..blocks {
            chain.new_transaction("alice", "bob", i as u64 + 1);
            chain.mine("miner");
        }
        (chain.chain().to_vec(), pow)
    }

    #[test]
    fn test_mined_chain_is_valid() {
        let (chain, pow) = mined_chain(4);
        assert_eq!(chain.len(), 5);
        assert!(valid_chain(&chain, &pow));
        assert!(valid_chain(&chain[..1], &pow));
    }

    #[test]
    fn test_empty_chain_is_invalid() {
        let err = validate_chain(&[], &ProofOfWork::default()).unwrap_err();
        assert_eq!(err.kind, ViolationKind::EmptyChain);
    }

    #[test]
    fn test_tampered_previous_hash() {
        let (mut chain, pow) = mined_chain(3);
        chain[2].previous_hash = "0".repeat(64);
        let err = validate_chain(&chain, &pow).unwrap_err();
        assert_eq!(err.position, 2);
        assert!(matches!(err.kind, ViolationKind::PreviousHashMismatch { .. }));
    }

    #[test]
    fn test_tampered_index() {
        // The last block has no successor, so only the index check can catch it.
        let (mut chain, pow) = mined_chain(3);
        chain[3].index = 9;
        let err = validate_chain(&chain, &pow).unwrap_err();
        assert_eq!(
            err.kind,
            ViolationKind::IndexDiscontinuity {
                previous: 3,
                found: 9
            }
        );
        assert_eq!(err.index, 9);
    }

    #[test]
    fn test_tampered_proof() {
        let (mut chain, pow) = mined_chain(3);
        let last_proof = chain[2].proof;
        let bad = (0..)
            .find(|p| !pow.valid_proof(last_proof, *p))
            .unwrap();
        chain[3].proof = bad;
        let err = validate_chain(&chain, &pow).unwrap_err();
        assert_eq!(err.position, 3);
        assert_eq!(
            err.kind,
            ViolationKind::InvalidProof {
                last_proof,
                proof: bad
            }
        );
    }

    #[test]
    fn test_any_single_field_alteration_is_detected() {
        let (chain, pow) = mined_chain(3);
        for position in 1..chain.len() {
            let mut altered = chain.clone();
            altered[position].index += 1;
            assert!(!valid_chain(&altered, &pow), "index at {}", position);

            let mut altered = chain.clone();
            altered[position].previous_hash.push('0');
            assert!(!valid_chain(&altered, &pow), "previous_hash at {}", position);

            let mut altered = chain.clone();
            let last_proof = altered[position - 1].proof;
            altered[position].proof = (altered[position].proof + 1..)
                .find(|p| !pow.valid_proof(last_proof, *p))
                .unwrap();
            assert!(!valid_chain(&altered, &pow), "proof at {}", position);
        }
    }

    #[test]
    fn test_violation_serializes_with_kind_tag() {
        let violation = ChainViolation {
            position: 1,
            index: 2,
            kind: ViolationKind::InvalidProof {
                last_proof: 100,
                proof: 5,
            },
        };
        let value = serde_json::to_value(&violation).unwrap();
        assert_eq!(value["kind"], "invalid_proof");
        assert_eq!(value["position"], 1);
        assert_eq!(value["last_proof"], 100);
        assert!(violation.to_string().contains("does not solve"));
    }
}

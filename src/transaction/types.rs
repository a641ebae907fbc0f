use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Sender used for the reward transaction recorded when a block is mined.
pub const REWARD_SENDER: &str = "0";

/// Amount credited to the miner for every sealed block.
pub const MINING_REWARD: u64 = 1;

/// A value transfer waiting in the pending pool or sealed inside a block.
///
/// Transactions carry no signature and no balance check is performed; they are
/// accepted as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The reward paid to `miner` for sealing a block.
    pub fn reward(miner: impl Into<String>) -> Self {
        Transaction::new(REWARD_SENDER, miner, MINING_REWARD)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }

    /// JSON form used for hashing. Key order is fixed later by canonicalization.
    pub fn to_json(&self) -> Value {
        json!({
            "sender": self.sender,
            "recipient": self.recipient,
            "amount": self.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_transaction() {
        let tx = Transaction::reward("node-a");
        assert_eq!(tx.sender, "0");
        assert_eq!(tx.recipient, "node-a");
        assert_eq!(tx.amount, 1);
        assert!(tx.is_reward());
        assert!(!Transaction::new("alice", "bob", 5).is_reward());
    }

    #[test]
    fn test_json_field_names() {
        let tx = Transaction::new("alice", "bob", 42);
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value, tx.to_json());
        assert_eq!(value["sender"], "alice");
        assert_eq!(value["recipient"], "bob");
        assert_eq!(value["amount"], 42);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let result: Result<Transaction, _> =
            serde_json::from_str(r#"{"sender": "alice", "amount": 3}"#);
        assert!(result.is_err());
    }
}

use crate::blockchain::Blockchain;
use crate::config::Config;
use crate::error::ChainError;
use crate::miner::ProofOfWork;
use crate::network::NodeRegistry;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeState {
    Booting,
    Ready,
    Stopped,
}

/// Process-level owner of the ledger, the peer registry and the node identity.
pub struct Node {
    pub config: Config,
    pub node_id: String,
    pub blockchain: Arc<RwLock<Blockchain>>,
    pub registry: Arc<parking_lot::RwLock<NodeRegistry>>,
    pub state: Arc<RwLock<NodeState>>,
}

impl Node {
    /// Build a node from an already validated configuration. Logging is left
    /// to the caller so tests can construct nodes freely.
    pub fn from_config(config: Config) -> Self {
        let node_id = config.node_id();
        let pow = ProofOfWork::new(config.miner.difficulty);
        let blockchain = Arc::new(RwLock::new(Blockchain::with_proof_of_work(pow)));

        info!(
            node_id = %node_id,
            difficulty = config.miner.difficulty,
            "created ledger with genesis block"
        );

        Self {
            config,
            node_id,
            blockchain,
            registry: Arc::new(parking_lot::RwLock::new(NodeRegistry::new())),
            state: Arc::new(RwLock::new(NodeState::Booting)),
        }
    }

    /// Address the API server binds to.
    pub fn api_addr(&self) -> Result<SocketAddr, ChainError> {
        let ip: IpAddr = self.config.network.host.parse().map_err(|e| {
            ChainError::Config(format!(
                "network.host '{}' is not an IP address: {}",
                self.config.network.host, e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.config.network.api_port))
    }

    /// Serve the API until the server stops.
    pub async fn start(self: Arc<Self>) -> Result<(), ChainError> {
        let addr = self.api_addr()?;

        {
            let mut s = self.state.write().await;
            *s = NodeState::Ready;
        }
        info!(node_id = %self.node_id, %addr, "node ready");

        let result = Node::start_api(self.clone(), addr).await;

        {
            let mut s = self.state.write().await;
            *s = NodeState::Stopped;
        }
        result
    }

    #[cfg(feature = "api")]
    async fn start_api(node: Arc<Self>, addr: SocketAddr) -> Result<(), ChainError> {
        // Share the authoritative ledger, registry and state with the router.
        let api_node = crate::api::Node::new_shared(
            node.blockchain.clone(),
            node.registry.clone(),
            node.node_id.clone(),
            Some(node.state.clone()),
        );

        crate::api::run_api_server(Arc::new(api_node), addr).await
    }

    #[cfg(not(feature = "api"))]
    async fn start_api(_node: Arc<Self>, _addr: SocketAddr) -> Result<(), ChainError> {
        Err(ChainError::Config("API feature not enabled in this build".to_string()))
    }
}

/// Install the global fmt subscriber at `level`. Safe to call more than once.
pub fn init_tracing(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

//! A region living inside the in-memory host.

use admin_gateway::host::{Region, RegionDescriptor, RegionId};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A running region.
///
/// The simulated region has no occupants, so operator messages and restarts
/// are recorded rather than delivered.
pub struct SimRegion {
    descriptor: RegionDescriptor,
    /// Bumped every time a restart completes
    generation: Arc<AtomicU64>,
    restarts: RwLock<Vec<Duration>>,
    messages: RwLock<Vec<String>>,
    snapshots: RwLock<Vec<PathBuf>>,
}

impl SimRegion {
    pub fn new(descriptor: RegionDescriptor) -> Self {
        Self {
            descriptor,
            generation: Arc::new(AtomicU64::new(0)),
            restarts: RwLock::new(Vec::new()),
            messages: RwLock::new(Vec::new()),
            snapshots: RwLock::new(Vec::new()),
        }
    }

    pub fn descriptor(&self) -> &RegionDescriptor {
        &self.descriptor
    }

    /// Number of restarts that have run to completion.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub async fn restart_requests(&self) -> Vec<Duration> {
        self.restarts.read().await.clone()
    }

    pub async fn messages(&self) -> Vec<String> {
        self.messages.read().await.clone()
    }

    pub async fn snapshots(&self) -> Vec<PathBuf> {
        self.snapshots.read().await.clone()
    }

    pub(crate) async fn record_snapshot(&self, path: PathBuf) {
        self.snapshots.write().await.push(path);
    }
}

#[async_trait]
impl Region for SimRegion {
    fn id(&self) -> RegionId {
        self.descriptor.region_id
    }

    fn name(&self) -> String {
        self.descriptor.name.clone()
    }

    async fn restart(&self, grace: Duration) {
        self.restarts.write().await.push(grace);
        self.messages
            .write()
            .await
            .push(format!("Region is restarting in {} second(s).", grace.as_secs()));

        let generation = self.generation.clone();
        let name = self.descriptor.name.clone();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let restarted = generation.fetch_add(1, Ordering::AcqRel) + 1;
            info!("🔄 Region '{}' restarted (generation {})", name, restarted);
        });
    }

    async fn broadcast(&self, message: &str) {
        debug!("📢 [{}] {}", self.descriptor.name, message);
        self.messages.write().await.push(message.to_string());
    }
}

//! # Sim Host - In-Memory Simulation Host
//!
//! A self-contained host that implements every collaborator the admin gateway
//! talks to. Regions, accounts and loaded snapshots live in concurrent maps;
//! nothing is persisted.
//!
//! * Region ids are not checked for uniqueness: creating a region with an id
//!   that is already in use replaces the earlier region.
//! * Two regions may not share a listen endpoint.
//! * An account name that already exists is silently refused with the nil id.
//! * A snapshot load fails when the file cannot be found on disk.

use admin_gateway::host::{
    AccountId, HostControl, HostError, HostServices, Region, RegionDescriptor, RegionDirectory, RegionId,
    RegionRef, SceneLoader, UserAccountDescriptor, UserProvisioner, Vector3,
};
use admin_gateway::ShutdownState;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub mod region;

pub use region::SimRegion;

pub struct SimHost {
    regions: DashMap<RegionId, Arc<SimRegion>>,
    /// Listen endpoint to the region holding it
    endpoints: DashMap<SocketAddr, RegionId>,
    /// Accounts keyed by "first last"
    accounts: DashMap<String, AccountId>,
    shutdown_state: ShutdownState,
}

impl SimHost {
    pub fn new(shutdown_state: ShutdownState) -> Arc<Self> {
        Arc::new(Self {
            regions: DashMap::new(),
            endpoints: DashMap::new(),
            accounts: DashMap::new(),
            shutdown_state,
        })
    }

    /// Creates and starts the given regions. Stops at the first failure.
    pub async fn seed(&self, seeds: Vec<RegionDescriptor>) -> Result<usize, HostError> {
        let count = seeds.len();
        for descriptor in seeds {
            self.create(descriptor, true).await?;
        }
        Ok(count)
    }

    /// All collaborator roles backed by this host.
    pub fn services(self: &Arc<Self>) -> HostServices {
        HostServices::from_host(self.clone())
    }

    pub fn region(&self, id: RegionId) -> Option<Arc<SimRegion>> {
        self.regions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn account(&self, first_name: &str, last_name: &str) -> Option<AccountId> {
        self.accounts
            .get(&account_key(first_name, last_name))
            .map(|entry| *entry.value())
    }

    pub fn shutdown_state(&self) -> &ShutdownState {
        &self.shutdown_state
    }

    fn find_by_name(&self, name: &str) -> Option<Arc<SimRegion>> {
        self.regions
            .iter()
            .find(|entry| entry.value().descriptor().name == name)
            .map(|entry| entry.value().clone())
    }
}

fn account_key(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}")
}

#[async_trait]
impl RegionDirectory for SimHost {
    async fn lookup_by_id(&self, id: RegionId) -> Option<RegionRef> {
        self.region(id).map(|region| region as RegionRef)
    }

    async fn lookup_by_name(&self, name: &str) -> Option<RegionRef> {
        self.find_by_name(name).map(|region| region as RegionRef)
    }

    async fn create(&self, descriptor: RegionDescriptor, start_immediately: bool) -> Result<RegionRef, HostError> {
        let region_id = descriptor.region_id;
        let endpoint = descriptor.internal_endpoint;
        match self.endpoints.entry(endpoint) {
            Entry::Occupied(holder) if *holder.get() != region_id => {
                let other = self
                    .region(*holder.get())
                    .map(|region| region.name())
                    .unwrap_or_else(|| holder.get().to_string());
                return Err(HostError::RegionCreation(format!(
                    "listen endpoint {endpoint} is already used by region {other}"
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(region_id);
            }
        }

        let name = descriptor.name.clone();
        let location = descriptor.location;
        let region = Arc::new(SimRegion::new(descriptor));

        if let Some(previous) = self.regions.insert(region_id, region.clone()) {
            warn!("♻️ Region id {} was already in use; the previous region was replaced", region_id);
            let released = previous.descriptor().internal_endpoint;
            if released != endpoint {
                self.endpoints.remove_if(&released, |_, holder| *holder == region_id);
            }
        }

        if start_immediately {
            info!("🌍 Region '{}' started at ({}, {}) with id {}", name, location.x, location.y, region_id);
        } else {
            info!("🌍 Region '{}' registered with id {}", name, region_id);
        }
        Ok(region)
    }

    async fn regions(&self) -> Vec<RegionRef> {
        self.regions
            .iter()
            .map(|entry| entry.value().clone() as RegionRef)
            .collect()
    }
}

#[async_trait]
impl UserProvisioner for SimHost {
    async fn create_user(&self, account: UserAccountDescriptor) -> Result<AccountId, HostError> {
        let key = account_key(&account.first_name, &account.last_name);
        match self.accounts.entry(key) {
            Entry::Occupied(existing) => {
                warn!("👤 Account '{}' already exists", existing.key());
                Ok(AccountId::nil())
            }
            Entry::Vacant(slot) => {
                let id = AccountId::new();
                info!(
                    "👤 Account '{}' created at ({}, {})",
                    slot.key(),
                    account.start_location.x,
                    account.start_location.y
                );
                slot.insert(id);
                Ok(id)
            }
        }
    }
}

#[async_trait]
impl SceneLoader for SimHost {
    async fn select_scene(&self, name: &str) -> Option<RegionRef> {
        self.find_by_name(name).map(|region| region as RegionRef)
    }

    async fn load_snapshot(&self, target: &RegionRef, filename: &str, offset: Vector3) -> Result<(), HostError> {
        let region = self
            .region(target.id())
            .ok_or_else(|| HostError::RegionNotFound(target.id().to_string()))?;

        let path = PathBuf::from(filename);
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| HostError::Snapshot(format!("{filename}: {e}")))?;
        if !metadata.is_file() {
            return Err(HostError::Snapshot(format!("{filename}: not a file")));
        }

        info!(
            "📦 Loaded snapshot '{}' ({} bytes) into region '{}' at offset {:?}",
            filename,
            metadata.len(),
            region.name(),
            offset
        );
        region.record_snapshot(path).await;
        Ok(())
    }
}

#[async_trait]
impl HostControl for SimHost {
    async fn shutdown(&self) {
        info!("🛑 Host shutdown requested with {} active region(s)", self.regions.len());
        self.shutdown_state.initiate_shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_gateway::host::GridLocation;
    use std::io::Write;
    use std::time::Duration;

    fn descriptor(name: &str, port: u16) -> RegionDescriptor {
        RegionDescriptor {
            region_id: RegionId::new(),
            name: name.to_string(),
            location: GridLocation { x: 1000, y: 1000 },
            internal_endpoint: ([127, 0, 0, 1], port).into(),
            external_host_name: "localhost".to_string(),
            master_first_name: "Ada".to_string(),
            master_last_name: "Lovelace".to_string(),
            datastore: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let host = SimHost::new(ShutdownState::new());
        let region = host.create(descriptor("Harbor", 9001), true).await.unwrap();

        assert_eq!(host.lookup_by_id(region.id()).await.unwrap().name(), "Harbor");
        assert_eq!(host.lookup_by_name("Harbor").await.unwrap().id(), region.id());
        assert!(host.lookup_by_name("Ridge").await.is_none());
        assert_eq!(host.regions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_endpoint_is_rejected() {
        let host = SimHost::new(ShutdownState::new());
        host.create(descriptor("Harbor", 9001), true).await.unwrap();

        let result = host.create(descriptor("Ridge", 9001), true).await;
        assert!(matches!(result, Err(HostError::RegionCreation(message)) if message.contains("Harbor")));
        assert_eq!(host.region_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_claim_endpoint_once() {
        let host = SimHost::new(ShutdownState::new());

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let host = host.clone();
                tokio::spawn(async move { host.create(descriptor(&format!("Region {i}"), 9001), true).await })
            })
            .collect();

        let mut created = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(host.region_count(), 1);
    }

    #[tokio::test]
    async fn test_replaced_region_releases_old_endpoint() {
        let host = SimHost::new(ShutdownState::new());
        let first = descriptor("Harbor", 9001);
        let mut moved = descriptor("Harbor", 9002);
        moved.region_id = first.region_id;

        host.create(first, true).await.unwrap();
        host.create(moved, true).await.unwrap();

        assert!(host.create(descriptor("Ridge", 9001), true).await.is_ok());
        assert!(host.create(descriptor("Cove", 9002), true).await.is_err());
        assert_eq!(host.region_count(), 2);
    }

    #[tokio::test]
    async fn test_reused_id_replaces_region() {
        let host = SimHost::new(ShutdownState::new());
        let first = descriptor("Harbor", 9001);
        let mut second = descriptor("Harbor Reborn", 9001);
        second.region_id = first.region_id;

        host.create(first.clone(), true).await.unwrap();
        host.create(second, true).await.unwrap();

        assert_eq!(host.region_count(), 1);
        assert_eq!(host.lookup_by_id(first.region_id).await.unwrap().name(), "Harbor Reborn");
    }

    #[tokio::test]
    async fn test_existing_account_gets_nil_id() {
        let host = SimHost::new(ShutdownState::new());
        let account = UserAccountDescriptor {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "engine".to_string(),
            start_location: GridLocation { x: 1000, y: 1000 },
        };

        let created = host.create_user(account.clone()).await.unwrap();
        assert!(!created.is_nil());
        assert_eq!(host.account("Ada", "Lovelace"), Some(created));

        assert!(host.create_user(account).await.unwrap().is_nil());
    }

    #[tokio::test]
    async fn test_snapshot_requires_existing_file() {
        let host = SimHost::new(ShutdownState::new());
        host.create(descriptor("Harbor", 9001), true).await.unwrap();
        let target = host.select_scene("Harbor").await.unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<scene/>").unwrap();
        let path = file.path().to_string_lossy().to_string();

        host.load_snapshot(&target, &path, Vector3::ORIGIN).await.unwrap();
        let region = host.region(target.id()).unwrap();
        assert_eq!(region.snapshots().await, vec![PathBuf::from(&path)]);

        let missing = host.load_snapshot(&target, "/nonexistent/harbor.xml", Vector3::ORIGIN).await;
        assert!(matches!(missing, Err(HostError::Snapshot(_))));
        assert_eq!(region.snapshots().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_completes_after_grace() {
        let host = SimHost::new(ShutdownState::new());
        let region = host.create(descriptor("Harbor", 9001), true).await.unwrap();
        let sim = host.region(region.id()).unwrap();

        region.restart(Duration::from_secs(30)).await;
        assert_eq!(sim.restart_requests().await, vec![Duration::from_secs(30)]);
        assert_eq!(sim.generation(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(sim.generation(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_initiates_shared_state() {
        let state = ShutdownState::new();
        let host = SimHost::new(state.clone());
        host.seed(vec![descriptor("Harbor", 9001), descriptor("Ridge", 9002)])
            .await
            .unwrap();

        HostControl::shutdown(host.as_ref()).await;
        assert!(state.is_shutdown_initiated());
    }
}

//! Mock host collaborators with call counters for unit tests.

use crate::commands::{CommandContext, CommandSettings};
use crate::host::{
    AccountId, HostControl, HostError, HostServices, Region, RegionDescriptor, RegionDirectory, RegionId, RegionRef,
    SceneLoader, UserAccountDescriptor, UserProvisioner, Vector3,
};
use crate::scheduler::{DeferredActionScheduler, ShutdownPolicy};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockRegion {
    pub id: RegionId,
    pub name: String,
    pub restarts: Mutex<Vec<Duration>>,
    pub broadcasts: Mutex<Vec<String>>,
}

impl MockRegion {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: RegionId::new(),
            name: name.to_string(),
            restarts: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
        })
    }

    pub fn restart_count(&self) -> usize {
        self.restarts.lock().unwrap().len()
    }

    pub fn broadcast_messages(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Region for MockRegion {
    fn id(&self) -> RegionId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    async fn restart(&self, grace: Duration) {
        self.restarts.lock().unwrap().push(grace);
    }

    async fn broadcast(&self, message: &str) {
        self.broadcasts.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct MockHost {
    pub regions: Mutex<Vec<Arc<MockRegion>>>,
    pub created: Mutex<Vec<RegionDescriptor>>,
    pub create_error: Mutex<Option<String>>,
    pub user_result: Mutex<Option<AccountId>>,
    pub provisioned: Mutex<Vec<UserAccountDescriptor>>,
    pub fail_snapshot: AtomicBool,
    pub loaded: Mutex<Vec<(RegionId, String)>>,
    pub lookup_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub user_calls: AtomicUsize,
    pub select_calls: AtomicUsize,
    pub load_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_region(&self, name: &str) -> Arc<MockRegion> {
        let region = MockRegion::new(name);
        self.regions.lock().unwrap().push(region.clone());
        region
    }

    pub fn context(self: &Arc<Self>) -> CommandContext {
        self.context_with_policy(ShutdownPolicy::Stack)
    }

    pub fn context_with_policy(self: &Arc<Self>, policy: ShutdownPolicy) -> CommandContext {
        let services = HostServices::from_host(self.clone());
        CommandContext {
            scheduler: DeferredActionScheduler::new(&services, policy),
            services,
            settings: CommandSettings::default(),
        }
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdown_calls.load(Ordering::SeqCst)
    }

    /// Sum of every collaborator call made so far.
    pub fn total_calls(&self) -> usize {
        [
            &self.lookup_calls,
            &self.create_calls,
            &self.list_calls,
            &self.user_calls,
            &self.select_calls,
            &self.load_calls,
            &self.shutdown_calls,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum::<usize>()
            + self
                .regions
                .lock()
                .unwrap()
                .iter()
                .map(|region| region.restart_count() + region.broadcast_messages().len())
                .sum::<usize>()
    }

    fn find(&self, predicate: impl Fn(&MockRegion) -> bool) -> Option<RegionRef> {
        self.regions
            .lock()
            .unwrap()
            .iter()
            .find(|region| predicate(region))
            .map(|region| region.clone() as RegionRef)
    }
}

#[async_trait]
impl RegionDirectory for MockHost {
    async fn lookup_by_id(&self, id: RegionId) -> Option<RegionRef> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.find(|region| region.id == id)
    }

    async fn lookup_by_name(&self, name: &str) -> Option<RegionRef> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.find(|region| region.name == name)
    }

    async fn create(&self, descriptor: RegionDescriptor, _start_immediately: bool) -> Result<RegionRef, HostError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.create_error.lock().unwrap().clone() {
            return Err(HostError::RegionCreation(message));
        }
        let region = Arc::new(MockRegion {
            id: descriptor.region_id,
            name: descriptor.name.clone(),
            restarts: Mutex::new(Vec::new()),
            broadcasts: Mutex::new(Vec::new()),
        });
        self.created.lock().unwrap().push(descriptor);
        Ok(region)
    }

    async fn regions(&self) -> Vec<RegionRef> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.regions
            .lock()
            .unwrap()
            .iter()
            .map(|region| region.clone() as RegionRef)
            .collect()
    }
}

#[async_trait]
impl UserProvisioner for MockHost {
    async fn create_user(&self, account: UserAccountDescriptor) -> Result<AccountId, HostError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.provisioned.lock().unwrap().push(account);
        let preset = *self.user_result.lock().unwrap();
        Ok(preset.unwrap_or_else(AccountId::new))
    }
}

#[async_trait]
impl SceneLoader for MockHost {
    async fn select_scene(&self, name: &str) -> Option<RegionRef> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.find(|region| region.name == name)
    }

    async fn load_snapshot(&self, target: &RegionRef, filename: &str, _offset: Vector3) -> Result<(), HostError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_snapshot.load(Ordering::SeqCst) {
            return Err(HostError::Snapshot(format!("{filename}: unreadable")));
        }
        self.loaded.lock().unwrap().push((target.id(), filename.to_string()));
        Ok(())
    }
}

#[async_trait]
impl HostControl for MockHost {
    async fn shutdown(&self) {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
    }
}

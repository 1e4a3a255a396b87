//! Interfaces to the simulation host the gateway administers.
//!
//! The gateway never owns regions, accounts or scenes. It builds descriptors
//! and hands them to these collaborators, which are expected to provide their
//! own internal synchronization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Unique handle of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub Uuid);

impl RegionId {
    /// Creates a new random region ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl Default for RegionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a provisioned user account. The nil UUID means "not created".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a region on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLocation {
    pub x: u32,
    pub y: u32,
}

/// Offset applied when loading a scene snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ORIGIN: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
}

/// Everything needed to bring up a new region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    pub region_id: RegionId,
    pub name: String,
    pub location: GridLocation,
    pub internal_endpoint: SocketAddr,
    pub external_host_name: String,
    pub master_first_name: String,
    pub master_last_name: String,
    pub datastore: Option<String>,
}

/// Identity and starting location of a user account to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccountDescriptor {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub start_location: GridLocation,
}

/// Errors reported by host collaborators.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("region {0} not found")]
    RegionNotFound(String),

    #[error("region creation failed: {0}")]
    RegionCreation(String),

    #[error("snapshot load failed: {0}")]
    Snapshot(String),

    #[error("user provisioning failed: {0}")]
    Provisioning(String),
}

/// A live region managed by the host.
#[async_trait]
pub trait Region: Send + Sync {
    fn id(&self) -> RegionId;

    fn name(&self) -> String;

    /// Restarts the region after warning its occupants for `grace`.
    async fn restart(&self, grace: Duration);

    /// Delivers an operator message to everyone in the region.
    async fn broadcast(&self, message: &str);
}

pub type RegionRef = Arc<dyn Region>;

#[async_trait]
pub trait RegionDirectory: Send + Sync {
    async fn lookup_by_id(&self, id: RegionId) -> Option<RegionRef>;

    async fn lookup_by_name(&self, name: &str) -> Option<RegionRef>;

    async fn create(&self, descriptor: RegionDescriptor, start_immediately: bool) -> Result<RegionRef, HostError>;

    /// All currently active regions.
    async fn regions(&self) -> Vec<RegionRef>;
}

#[async_trait]
pub trait UserProvisioner: Send + Sync {
    /// Returns the new account's id, or the nil id if the account was refused.
    async fn create_user(&self, account: UserAccountDescriptor) -> Result<AccountId, HostError>;
}

/// Resolves scenes as explicit load targets and loads snapshots into them.
#[async_trait]
pub trait SceneLoader: Send + Sync {
    async fn select_scene(&self, name: &str) -> Option<RegionRef>;

    async fn load_snapshot(&self, target: &RegionRef, filename: &str, offset: Vector3) -> Result<(), HostError>;
}

/// Process-level control of the host.
#[async_trait]
pub trait HostControl: Send + Sync {
    async fn shutdown(&self);
}

/// Bundle of collaborators handed to the command handlers.
#[derive(Clone)]
pub struct HostServices {
    pub regions: Arc<dyn RegionDirectory>,
    pub users: Arc<dyn UserProvisioner>,
    pub scenes: Arc<dyn SceneLoader>,
    pub control: Arc<dyn HostControl>,
}

impl HostServices {
    /// Uses one object for every collaborator role.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: RegionDirectory + UserProvisioner + SceneLoader + HostControl + 'static,
    {
        Self {
            regions: host.clone(),
            users: host.clone(),
            scenes: host.clone(),
            control: host,
        }
    }
}

/// Sends `message` to every active region, returning how many were reached.
pub async fn broadcast_to_all(directory: &dyn RegionDirectory, message: &str) -> usize {
    let regions = directory.regions().await;
    for region in &regions {
        region.broadcast(message).await;
    }
    regions.len()
}

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;

use crate::shared::geo::Coordinate;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Permission to access location was denied")]
    PermissionDenied,
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    Granted,
    #[default]
    Denied,
}

pub trait LocationProvider: Send + Sync + 'static {
    fn request_permission(&self) -> impl Future<Output = Permission> + Send;
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, LocationError>> + Send;
}

pub async fn locate_user<L: LocationProvider>(
    provider: &L,
) -> Result<Coordinate, LocationError> {
    match provider.request_permission().await {
        Permission::Granted => provider.current_position().await,
        Permission::Denied => Err(LocationError::PermissionDenied),
    }
}

#[derive(Debug, Default)]
struct LocationState {
    permission: Permission,
    fix: Option<Coordinate>,
}

/// Location provider fed by the host. The host flips the permission and pushes fixes as
/// the platform reports them.
#[derive(Debug, Clone, Default)]
pub struct SharedLocation {
    state: Arc<Mutex<LocationState>>,
}

impl SharedLocation {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn granted(fix: Coordinate) -> Self {
        let location = Self::new();
        location.grant(fix);
        location
    }

    pub fn grant(&self, fix: Coordinate) {
        let mut state = self.lock();
        state.permission = Permission::Granted;
        state.fix = Some(fix);
    }

    pub fn set_fix(&self, fix: Coordinate) {
        self.lock().fix = Some(fix);
    }

    pub fn revoke(&self) {
        let mut state = self.lock();
        state.permission = Permission::Denied;
        state.fix = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LocationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationProvider for SharedLocation {
    async fn request_permission(&self) -> Permission {
        self.lock().permission
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        self.lock()
            .fix
            .ok_or_else(|| LocationError::Unavailable("no fix reported yet".into()))
    }
}

/// Provider for hosts without location support. Always denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::PermissionDenied)
    }
}

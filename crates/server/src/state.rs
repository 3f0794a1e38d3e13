use crate::simulation::SimulatedBus;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct AppState {
    pub buses: RwLock<HashMap<String, SimulatedBus>>,
}

impl AppState {
    pub fn new(buses: HashMap<String, SimulatedBus>) -> Self {
        Self {
            buses: RwLock::new(buses),
        }
    }
}

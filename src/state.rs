/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gate: SessionGate, identity: IdentityService
 * - Clone 前提で持つ (内部は Arc で cheap)
 */
use std::sync::Arc;

use crate::gate::SessionGate;
use crate::services::identity::IdentityService;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<SessionGate>,
    pub identity: Arc<dyn IdentityService>,
}

impl AppState {
    pub fn new(gate: Arc<SessionGate>, identity: Arc<dyn IdentityService>) -> Self {
        Self { gate, identity }
    }
}

use std::sync::Arc;

use crate::service::TwistService;

#[derive(Clone)]
pub struct HandlerState {
    pub service: Arc<TwistService>,
}

impl HandlerState {
    pub fn new(service: Arc<TwistService>) -> Self {
        Self { service }
    }
}

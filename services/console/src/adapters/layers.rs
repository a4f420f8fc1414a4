//! services/console/src/adapters/layers.rs
//!
//! Response middleware for the HTTP adapter. Layers run synchronously, in order,
//! after every response and before its body is read. The first layer that
//! returns an error short-circuits the call.

use fieldtest_core::domain::Bearer;
use fieldtest_core::ports::PortError;
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

/// What a layer gets to see about the call that produced a response.
pub struct CallInfo<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub bearer: Option<&'a Bearer>,
}

pub trait ResponseLayer: Send + Sync {
    fn on_response(&self, call: &CallInfo<'_>, status: StatusCode) -> Option<PortError>;
}

/// Something that can drop every session holding a given token.
pub trait SessionInvalidator: Send + Sync {
    fn invalidate(&self, bearer: &Bearer);
}

//=========================================================================================
// Layers
//=========================================================================================

/// Logs every remote call with its status.
pub struct LoggingLayer;

impl ResponseLayer for LoggingLayer {
    fn on_response(&self, call: &CallInfo<'_>, status: StatusCode) -> Option<PortError> {
        if status.is_success() {
            debug!("{} {} -> {}", call.method, call.path, status);
        } else {
            warn!("{} {} -> {}", call.method, call.path, status);
        }
        None
    }
}

/// A 401 from any endpoint invalidates the whole session that made the call.
pub struct UnauthorizedLayer {
    sessions: Arc<dyn SessionInvalidator>,
}

impl UnauthorizedLayer {
    pub fn new(sessions: Arc<dyn SessionInvalidator>) -> Self {
        Self { sessions }
    }
}

impl ResponseLayer for UnauthorizedLayer {
    fn on_response(&self, call: &CallInfo<'_>, status: StatusCode) -> Option<PortError> {
        if status != StatusCode::UNAUTHORIZED {
            return None;
        }
        if let Some(bearer) = call.bearer {
            warn!(
                "Remote API rejected the session token on {} {}; invalidating session",
                call.method, call.path
            );
            self.sessions.invalidate(bearer);
        }
        Some(PortError::Unauthorized)
    }
}

/// Runs `layers` in order and returns the first error any of them raises.
pub fn run_layers(
    layers: &[Arc<dyn ResponseLayer>],
    call: &CallInfo<'_>,
    status: StatusCode,
) -> Option<PortError> {
    layers
        .iter()
        .find_map(|layer| layer.on_response(call, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        dropped: Mutex<Vec<String>>,
    }

    impl SessionInvalidator for Recorder {
        fn invalidate(&self, bearer: &Bearer) {
            self.dropped.lock().unwrap().push(bearer.as_str().to_string());
        }
    }

    #[test]
    fn unauthorized_invalidates_the_calling_token() {
        let recorder = Arc::new(Recorder::default());
        let layers: Vec<Arc<dyn ResponseLayer>> = vec![
            Arc::new(LoggingLayer),
            Arc::new(UnauthorizedLayer::new(recorder.clone())),
        ];
        let bearer = Bearer::new("tok-1");
        let call = CallInfo {
            method: &Method::GET,
            path: "API/Company/GetAll",
            bearer: Some(&bearer),
        };
        assert_eq!(
            run_layers(&layers, &call, StatusCode::UNAUTHORIZED),
            Some(PortError::Unauthorized)
        );
        assert_eq!(*recorder.dropped.lock().unwrap(), vec!["tok-1".to_string()]);
    }

    #[test]
    fn other_statuses_pass_through() {
        let recorder = Arc::new(Recorder::default());
        let layers: Vec<Arc<dyn ResponseLayer>> =
            vec![Arc::new(UnauthorizedLayer::new(recorder.clone()))];
        let call = CallInfo {
            method: &Method::POST,
            path: "API/Client/Create",
            bearer: None,
        };
        assert_eq!(run_layers(&layers, &call, StatusCode::OK), None);
        assert_eq!(run_layers(&layers, &call, StatusCode::INTERNAL_SERVER_ERROR), None);
        assert!(recorder.dropped.lock().unwrap().is_empty());
    }
}

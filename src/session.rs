//! Session lifecycle and authorization
//!
//! The tracking session reports authorization changes and data-provider
//! state transitions. A denial or a provider fault raises a single error
//! flag; nothing is torn down and the listeners keep running.

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;

/// Permission a session asks the user for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationType {
    HandTracking,
    WorldSensing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    NotDetermined,
    Allowed,
    Denied,
}

/// The two providers the experience runs on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataProvider {
    HandTracking,
    SceneReconstruction,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataProviderState {
    #[default]
    Initialized,
    Running,
    Paused,
    Stopped,
}

/// One event from the session stream
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    AuthorizationChanged {
        authorization: AuthorizationType,
        status: AuthorizationStatus,
    },
    DataProviderStateChanged {
        providers: Vec<DataProvider>,
        state: DataProviderState,
        #[serde(default)]
        error: Option<String>,
    },
    /// An event kind this build does not understand
    Unknown(String),
}

/// Which providers the device offers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderSupport {
    pub hand_tracking: bool,
    pub scene_reconstruction: bool,
}

impl ProviderSupport {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            hand_tracking: config.hand_tracking_supported,
            scene_reconstruction: config.scene_reconstruction_supported,
        }
    }

    /// Both providers are needed before the experience can start
    pub fn all_supported(&self) -> bool {
        self.hand_tracking && self.scene_reconstruction
    }
}

/// Last reported state of each provider
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProviderStates {
    pub hand_tracking: DataProviderState,
    pub scene_reconstruction: DataProviderState,
}

impl ProviderStates {
    pub fn set(&mut self, provider: DataProvider, state: DataProviderState) {
        match provider {
            DataProvider::HandTracking => self.hand_tracking = state,
            DataProvider::SceneReconstruction => self.scene_reconstruction = state,
        }
    }

    /// Both providers are freshly initialized and may be started
    pub fn is_ready_to_run(&self) -> bool {
        self.hand_tracking == DataProviderState::Initialized
            && self.scene_reconstruction == DataProviderState::Initialized
    }
}

/// Presentation state of the immersive space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImmersiveSpaceState {
    #[default]
    Closed,
    InTransition,
    Open,
}

/// Folds session events into provider states and the error flag
#[derive(Clone, Debug, Default)]
pub struct SessionMonitor {
    providers: ProviderStates,
    error_state: bool,
}

impl SessionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn providers(&self) -> &ProviderStates {
        &self.providers
    }

    pub fn error_state(&self) -> bool {
        self.error_state
    }

    pub fn handle(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::AuthorizationChanged { authorization, status } => {
                log::info!("Authorization for {:?} changed to {:?}", authorization, status);
                if *status == AuthorizationStatus::Denied {
                    log::warn!("{:?} authorization denied", authorization);
                    self.error_state = true;
                }
            }
            SessionEvent::DataProviderStateChanged { providers, state, error } => {
                log::info!("Data providers {:?} changed to {:?}", providers, state);
                for provider in providers {
                    self.providers.set(*provider, *state);
                }
                if let Some(error) = error {
                    log::error!("Data provider reached an error state: {}", error);
                    self.error_state = true;
                }
            }
            SessionEvent::Unknown(kind) => {
                log::warn!("Ignoring unrecognized session event {:?}", kind);
            }
        }
    }
}

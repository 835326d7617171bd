//! Cold-start routing.
//!
//! On launch the app must land on exactly one of three screens:
//! - `onboarding` when setup has not completed (or the check failed)
//! - `authentication` when setup is done but the session is locked
//! - `vault` when the session is already unlocked

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::collaborators::SetupStatus;
use crate::error::{GateError, GateResult};
use crate::navigation::{Destination, NavigationIntent, NavigationSerializer, TransitionMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootRoute {
    Onboarding,
    Authentication,
    Vault,
}

impl BootRoute {
    pub fn destination(self) -> Destination {
        match self {
            Self::Onboarding => Destination::onboarding(),
            Self::Authentication => Destination::authentication(),
            Self::Vault => Destination::vault(),
        }
    }
}

impl std::fmt::Display for BootRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Onboarding => write!(f, "onboarding"),
            Self::Authentication => write!(f, "authentication"),
            Self::Vault => write!(f, "vault"),
        }
    }
}

/// Pick the startup route. A failed setup check routes to onboarding, the
/// safe state for a first-run product.
pub fn choose_route(setup_complete: &GateResult<bool>, is_authenticated: bool) -> BootRoute {
    match setup_complete {
        Err(_) | Ok(false) => BootRoute::Onboarding,
        Ok(true) if !is_authenticated => BootRoute::Authentication,
        Ok(true) => BootRoute::Vault,
    }
}

pub struct BootstrapResolver {
    setup: Arc<dyn SetupStatus>,
    navigation: NavigationSerializer,
    resolved: Mutex<Option<BootRoute>>,
}

impl BootstrapResolver {
    pub fn new(setup: Arc<dyn SetupStatus>, navigation: NavigationSerializer) -> Self {
        Self {
            setup,
            navigation,
            resolved: Mutex::new(None),
        }
    }

    /// Route the cold start. Enqueues exactly one destination the first time;
    /// later calls return the same route without navigating again.
    pub async fn resolve(&self, is_authenticated: bool) -> BootRoute {
        let mut resolved = self.resolved.lock().await;
        if let Some(route) = *resolved {
            debug!("Bootstrap already resolved to {}", route);
            return route;
        }

        let route = self.evaluate(is_authenticated).await;
        info!("Bootstrap routing to {}", route);
        self.navigation
            .enqueue_intent(NavigationIntent::new(
                route.destination(),
                TransitionMode::Replace,
            ))
            .await;

        *resolved = Some(route);
        route
    }

    /// The route chosen by `resolve`, if it has run.
    pub async fn resolved(&self) -> Option<BootRoute> {
        *self.resolved.lock().await
    }

    /// Resolve from the current session flag, then keep following it.
    ///
    /// Each change re-runs the routing decision. When the answer differs
    /// from where the navigation queue is already headed, stale intents are
    /// cleared and the new destination is queued. The task ends when the
    /// session sender is dropped.
    pub fn follow(self: Arc<Self>, mut session: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial = *session.borrow_and_update();
            self.resolve(initial).await;

            while session.changed().await.is_ok() {
                let is_authenticated = *session.borrow_and_update();
                let next = self.evaluate(is_authenticated).await;
                let target = next.destination();

                if self.navigation.latest_destination().await.as_ref() == Some(&target) {
                    debug!("Session changed, already headed to {}", next);
                    continue;
                }

                info!("Session changed, rerouting to {}", next);
                self.navigation.clear().await;
                self.navigation
                    .enqueue_intent(NavigationIntent::new(target, TransitionMode::Replace))
                    .await;
            }

            debug!("Session flag closed, bootstrap follower stopped");
        })
    }

    async fn evaluate(&self, is_authenticated: bool) -> BootRoute {
        let setup_complete = match AssertUnwindSafe(self.setup.is_setup_complete())
            .catch_unwind()
            .await
        {
            Ok(result) => result.map_err(GateError::from),
            Err(payload) => Err(GateError::from_panic(payload)),
        };

        if let Err(ref e) = setup_complete {
            warn!("Setup check failed, falling back to onboarding: {}", e);
        }
        choose_route(&setup_complete, is_authenticated)
    }
}

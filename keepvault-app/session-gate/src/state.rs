use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::auth::PinAuthController;
use crate::bootstrap::{BootRoute, BootstrapResolver};
use crate::collaborators::{Authenticator, FeedbackCues, SetupStatus, ViewRouter};
use crate::error::GateResult;
use crate::navigation::NavigationSerializer;
use crate::storage::GateSettings;

/// Process-wide owner of the session gate.
///
/// Built once at app start and kept for the life of the process. Screens
/// receive it (or the pieces they need) by injection; nothing here is
/// reachable through a global.
pub struct SessionGate {
    settings: GateSettings,
    navigation: NavigationSerializer,
    resolver: Arc<BootstrapResolver>,
    authenticator: Arc<dyn Authenticator>,
    feedback: Arc<dyn FeedbackCues>,
}

impl SessionGate {
    /// Must be called inside a tokio runtime; the navigation worker starts here.
    pub fn new(
        settings: GateSettings,
        router: Arc<dyn ViewRouter>,
        setup: Arc<dyn SetupStatus>,
        authenticator: Arc<dyn Authenticator>,
        feedback: Arc<dyn FeedbackCues>,
    ) -> GateResult<Self> {
        settings.validate()?;

        let navigation = NavigationSerializer::spawn(router, &settings);
        let resolver = Arc::new(BootstrapResolver::new(setup, navigation.clone()));
        info!("Session gate ready (PIN length {})", settings.pin_length);

        Ok(Self {
            settings,
            navigation,
            resolver,
            authenticator,
            feedback,
        })
    }

    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    pub fn navigation(&self) -> &NavigationSerializer {
        &self.navigation
    }

    /// One-shot cold-start routing from a snapshot of the session flag.
    pub async fn bootstrap(&self, is_authenticated: bool) -> BootRoute {
        self.resolver.resolve(is_authenticated).await
    }

    /// Cold-start routing that keeps tracking the session flag afterwards.
    pub fn follow_session(&self, session: watch::Receiver<bool>) -> JoinHandle<()> {
        self.resolver.clone().follow(session)
    }

    /// Fresh controller for a newly mounted PIN screen.
    pub fn pin_controller(&self) -> PinAuthController {
        PinAuthController::new(
            self.authenticator.clone(),
            self.feedback.clone(),
            self.navigation.clone(),
            &self.settings,
        )
    }
}

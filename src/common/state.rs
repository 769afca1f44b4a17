// Application state shared across all modules

use std::sync::Arc;
use tracing::info;

use super::{ApiClient, ApiError, LocalStorage, Navigator, PortalConfig};
use crate::auth::{AuthService, SessionStore};
use crate::notifications::{
    ChannelConfig, DesktopNotifier, NotificationBackend, NotificationChannel, NotificationService,
    NotificationStore,
};
use crate::organisations::OrganisationService;
use crate::requests::RequestService;
use crate::uploads::UploadService;
use crate::wallet::{WalletBackend, WalletFlow, WalletService};

/// Everything a screen needs, passed explicitly instead of living in globals
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PortalConfig>,
    pub session: SessionStore,
    pub api: ApiClient,
    pub navigator: Arc<dyn Navigator>,
    pub auth_service: Arc<AuthService>,
    pub organisation_service: Arc<OrganisationService>,
    pub request_service: Arc<RequestService>,
    pub upload_service: Arc<UploadService>,
    pub notification_service: Arc<NotificationService>,
    pub notifications: NotificationStore,
    pub channel: Arc<NotificationChannel>,
    pub wallet: Arc<WalletFlow>,
}

impl AppState {
    /// Restores the persisted session from the data directory and wires up services
    pub async fn load(
        config: PortalConfig,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn DesktopNotifier>,
    ) -> Result<Self, ApiError> {
        let storage = LocalStorage::new(config.data_dir.clone());
        let session = SessionStore::load(storage, &config.session_storage_key).await;
        Self::with_session(config, session, navigator, notifier)
    }

    pub fn with_session(
        config: PortalConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn DesktopNotifier>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config, session.clone(), navigator.clone())?;

        let notification_service = Arc::new(NotificationService::new(api.clone()));
        let notifications = NotificationStore::new();
        let channel = Arc::new(NotificationChannel::new(
            ChannelConfig::from_portal(&config),
            session.clone(),
            notifications.clone(),
            notification_service.clone() as Arc<dyn NotificationBackend>,
            notifier,
        ));

        let wallet_service: Arc<dyn WalletBackend> = Arc::new(WalletService::new(api.clone()));
        let wallet = Arc::new(WalletFlow::new(wallet_service, navigator.clone()));

        Ok(Self {
            auth_service: Arc::new(AuthService::new(api.clone())),
            organisation_service: Arc::new(OrganisationService::new(api.clone())),
            request_service: Arc::new(RequestService::new(api.clone())),
            upload_service: Arc::new(UploadService::new(api.clone())),
            notification_service,
            notifications,
            channel,
            wallet,
            config: Arc::new(config),
            session,
            api,
            navigator,
        })
    }

    /// Opens the push channel for the signed-in user; false when nobody is signed in
    pub async fn start_realtime(&self) -> bool {
        let session = self.session.snapshot().await;
        match session.user {
            Some(user) if session.token.is_some() => {
                self.channel.open(&user.id).await;
                true
            }
            _ => false,
        }
    }

    /// Bulk notification fetch into the shared store
    pub async fn load_notifications(&self) -> Result<(), ApiError> {
        self.notification_service.refresh(&self.notifications).await
    }

    /// Tears down everything tied to the signed-in user
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        self.channel.close().await;
        self.notifications.reset().await;
        self.wallet.reset().await;
        self.auth_service.sign_out().await?;
        info!("Session state cleared");
        Ok(())
    }
}

pub mod common;
pub mod cost_centers;
pub mod customers;
pub mod dashboard;
pub mod forms;
pub mod health;
pub mod users;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        attachments::AttachmentStore, cost_centers::CostCenterService,
        customers::CustomerService, dashboard::DashboardService, forms::FormService,
        users::UserService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub customers: Arc<CustomerService>,
    pub cost_centers: Arc<CostCenterService>,
    pub users: Arc<UserService>,
    pub forms: Arc<FormService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Wires every service against one pool, taking upload and workflow
    /// settings from `config`.
    pub fn new(
        db_pool: Arc<DbPool>,
        config: &AppConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        let attachments = Arc::new(AttachmentStore::new(
            config.upload_dir.clone(),
            config.uploads_url_prefix.clone(),
        ));
        let mut forms = FormService::new(db_pool.clone(), attachments)
            .with_status_transitions(config.enforce_status_transitions);
        if let Some(sender) = event_sender {
            forms = forms.with_event_sender(sender);
        }
        Self::with_form_service(db_pool, forms)
    }

    /// Same as [`AppServices::new`] with a caller-built form service.
    pub fn with_form_service(db_pool: Arc<DbPool>, forms: FormService) -> Self {
        Self {
            customers: Arc::new(CustomerService::new(db_pool.clone())),
            cost_centers: Arc::new(CostCenterService::new(db_pool.clone())),
            users: Arc::new(UserService::new(db_pool.clone())),
            forms: Arc::new(forms),
            dashboard: Arc::new(DashboardService::new(db_pool)),
        }
    }
}

pub mod api_client;
pub mod auth_service;
pub mod session;
pub mod vacation_service;

pub use api_client::{ApiClient, ApiRequest, Dispatched, RequestKind};
pub use auth_service::AuthService;
pub use session::{Session, SessionEvent, SessionSnapshot, SessionStore};
pub use vacation_service::VacationService;

pub mod auth_service;
pub mod editor_service;
pub mod rate_limiter;
pub mod template_service;

pub use auth_service::{AdminPassword, AuthService, IssuedToken, AUTH_COOKIE_NAME};
pub use editor_service::{BindingView, EditorService, EditorSnapshot};
pub use rate_limiter::AuthRateLimiter;
pub use template_service::{RenderedTemplate, TemplateService};

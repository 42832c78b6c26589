pub mod config_service;
pub mod paths;
pub mod reqwest_transport;
pub mod secret_service;

pub use crate::config_service::ConfigService;
pub use crate::paths::PostPilotPaths;
pub use crate::reqwest_transport::ReqwestTransport;
pub use crate::secret_service::SecretServiceImpl;

use std::sync::Arc;

use lexis_service::LexisService;
use lexis_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LexisService>,
}
impl AppState {
	pub fn new(config: lexis_config::Config) -> color_eyre::Result<Self> {
		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = LexisService::new(config, qdrant)?;

		Ok(Self::from_service(service))
	}

	/// Wraps an already assembled service, e.g. one built over in-memory backends.
	pub fn from_service(service: LexisService) -> Self {
		Self { service: Arc::new(service) }
	}
}

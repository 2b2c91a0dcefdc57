pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Domain(#[from] pod_domain::Error),

	#[error(transparent)]
	Storage(#[from] pod_storage::Error),
}

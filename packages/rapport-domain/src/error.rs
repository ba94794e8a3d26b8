pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
	#[error("Unknown match basis {label:?}.")]
	UnknownBasis { label: String },
}

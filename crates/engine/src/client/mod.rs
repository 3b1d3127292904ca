//! The uniform CRM client and the request machinery underneath it.

mod credentials;
mod crm;
mod error;
mod executor;

pub use credentials::{ACCESS_TOKEN, API_TOKEN, Credentials};
pub use crm::CrmClient;
pub use error::{ApiError, ClientError};
pub use executor::{
    ClientOptions, DEFAULT_BACKOFF_UNIT, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT, QueryParams,
    RequestExecutor, RequestParams, RetryPolicy, build_url, normalize_list,
    substitute_path_params,
};

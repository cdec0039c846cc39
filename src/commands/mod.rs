//! One module per subcommand. Each command resolves its inputs, talks to
//! the API through [`crate::api::LynkClient`], and renders the result.

pub mod download;
pub mod prods;
pub mod status;
pub mod upload;
pub mod vers;

use crate::api::LynkClient;
use crate::config::Config;
use crate::retry::RetryPolicy;
use crate::shared::error::LynkError;

fn client(config: &Config) -> Result<LynkClient, LynkError> {
    LynkClient::new(
        config.api_url.clone(),
        config.token.clone(),
        RetryPolicy::default(),
    )
}

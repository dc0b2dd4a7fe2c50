use std::fmt;

/// Custom error type for gateway operations
/// Implements Clone so scripted transports can replay it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Bearer token is not configured
    MissingApiKey(String)
  , /// Inbound request failed validation
    InvalidRequest(String)
  , /// Connection-level HTTP failure
    HttpError(String)
  , /// Upstream call exceeded its timeout
    Timeout
  , /// Upstream rejected every candidate model
    UpstreamRejected
    {   status: u16
      , message: String
    }
  , /// Attempt budget ran out without a success
    Exhausted
    {   last_status: Option<u16>
      , message: String
    }
  , /// Chat API returned an error response
    ApiError(String)
  , /// Failed to read or parse an upstream response
    ParseError(String)
  , /// No choices in chat response
    NoChoicesInResponse
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// HTTP status the gateway answers with for this error
    pub fn status_code(&self) -> u16
    {   match self
        {   Error::MissingApiKey(_) => 500
          , Error::InvalidRequest(_) => 400
          , Error::UpstreamRejected { status, .. } => *status
          , Error::Exhausted { .. } => 503
          , Error::HttpError(_)
          | Error::Timeout
          | Error::ApiError(_)
          | Error::NoChoicesInResponse => 503
          , Error::ParseError(_)
          | Error::InvalidConfiguration(_)
          | Error::Other(_) => 500
        }
    }

    /// True for failures that another attempt may cure
    pub fn is_network(&self) -> bool
    {   matches!(self, Error::HttpError(_) | Error::Timeout)
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(name) => {
              write!(f, "Server Error: Missing {}", name)
            }
          , Error::InvalidRequest(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::UpstreamRejected { status, message } => {
              write!(f,
                "Upstream rejected request ({}): {}",
                status, message
              )
            }
          , Error::Exhausted { last_status: Some(status), message } => {
              write!(f,
                "Model unavailable after retries (last status {}): {}",
                status, message
              )
            }
          , Error::Exhausted { last_status: None, message } => {
              write!(f, "{}", message)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

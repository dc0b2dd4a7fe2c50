//! Retry policy and fallback chain for image model requests

use std::time::Duration;
use log::debug;

use crate::config::RetryConfig;

/// Cap applied to upstream-reported cold start estimates
pub const MAX_COLD_START_DELAY: Duration = Duration::from_secs(10);

/// Fixed-delay retry policy; no backoff, no jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy
{   pub max_attempts: usize
  , pub cold_start_delay: Duration
  , pub max_cold_start_delay: Duration
  , pub honor_estimated_time: bool
  , pub network_delay: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_attempts: usize
    , cold_start_delay_ms: u64
    , network_delay_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_attempts: max_attempts.max(1)
          , cold_start_delay: Duration::from_millis(cold_start_delay_ms)
          , max_cold_start_delay: MAX_COLD_START_DELAY
          , honor_estimated_time: true
          , network_delay: Duration::from_millis(network_delay_ms)
        }
    }

    /// Delay before retrying a model that reported it is loading
    pub fn cold_start_delay(
      &self
    , estimated_time: Option<f64>
    ) -> Duration
    {   let delay = match estimated_time
        {   Some(secs) if self.honor_estimated_time
              && secs.is_finite()
              && secs >= 0.0 => Duration::from_secs_f64(secs)
          , _ => self.cold_start_delay
        };
        let capped = delay.min(self.max_cold_start_delay);
        debug!(
          "Cold start delay {:?} (estimate {:?})",
          capped, estimated_time
        );
        capped
    }

    /// Delay after a network failure or other transient status
    pub fn network_delay(&self) -> Duration
    {   self.network_delay
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy
{   fn from(config: &RetryConfig) -> Self
    {   RetryPolicy
        {   max_attempts: config.max_attempts.max(1)
          , cold_start_delay: Duration::from_millis(
              config.cold_start_delay_ms
            )
          , max_cold_start_delay: Duration::from_millis(
              config.max_cold_start_delay_ms
            )
          , honor_estimated_time: config.honor_estimated_time
          , network_delay: Duration::from_millis(config.network_delay_ms)
        }
    }
}

/// Which statuses move a request down the chain
#[derive(Debug, Clone)]
pub struct FallbackRules
{   /// Leaving the requested model
    pub hard_failure: Vec<u16>
  , /// Leaving any fallback model
    pub escalate: Vec<u16>
}

impl FallbackRules
{   pub fn is_hard_failure(&self, status: u16) -> bool
    {   self.hard_failure.contains(&status)
    }
}

impl Default for FallbackRules
{   fn default() -> Self
    {   FallbackRules::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for FallbackRules
{   fn from(config: &RetryConfig) -> Self
    {   FallbackRules
        {   hard_failure: config.hard_failure_statuses.clone()
          , escalate: config.escalate_statuses.clone()
        }
    }
}

/// Ordered candidate model identifiers for one request
#[derive(Debug, Clone)]
pub struct FallbackChain
{   pub candidates: Vec<String>
  , pub current_index: usize
}

impl FallbackChain
{   /// Create a new fallback chain
    pub fn new(candidates: Vec<String>) -> Self
    {   debug!(
          "Creating fallback chain with {} candidates",
          candidates.len()
        );
        FallbackChain
        {   candidates
          , current_index: 0
        }
    }

    /// Get the current candidate
    pub fn current(&self) -> Option<&str>
    {   self.candidates.get(self.current_index).map(String::as_str)
    }

    /// Move to the next candidate
    pub fn advance(&mut self) -> Option<&str>
    {   self.current_index += 1;
        self.current()
    }

    /// Check if we have more candidates to try
    pub fn has_next(&self) -> bool
    {   self.current_index + 1 < self.candidates.len()
    }

    /// Whether `status` on the current candidate should move to the next one
    pub fn should_fall_back(
      &self
    , rules: &FallbackRules
    , status: u16
    ) -> bool
    {   if !self.has_next()
        {   return false;
        }
        if self.current_index == 0
        {   rules.hard_failure.contains(&status)
        } else
        {   rules.escalate.contains(&status)
        }
    }
}

//! Static table of image model keys

use log::debug;

pub const DEFAULT_MODEL_KEY: &str = "flux";
pub const LAST_RESORT_MODEL_ID: &str
  = "stabilityai/stable-diffusion-xl-base-1.0";

const BUILTIN_MODELS: &[(&str, &str)] = &[
  ("flux", "black-forest-labs/FLUX.1-schnell"),
  ("sd3.5", "stabilityai/stable-diffusion-3.5-large"),
  ("sdxl", "stabilityai/stable-diffusion-xl-base-1.0"),
  ("v1-5", "stable-diffusion-v1-5/stable-diffusion-v1-5"),
];

/// A single key -> identifier entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry
{   pub key: String
  , pub model_id: String
}

/// Immutable mapping from model keys to hosted model identifiers.
///
/// Lookups never fail: anything unknown resolves to the default entry.
#[derive(Debug, Clone)]
pub struct ModelCatalog
{   entries: Vec<CatalogEntry>
  , default_index: usize
  , last_resort: String
}

impl ModelCatalog
{   /// Build a catalog; the default key must be one of `entries`
    pub fn new(
      entries: Vec<(String, String)>
    , default_key: &str
    , last_resort: String
    ) -> Option<Self>
    {   let entries: Vec<CatalogEntry> = entries
          .into_iter()
          .map(|(key, model_id)| CatalogEntry { key, model_id })
          .collect();
        let default_index = entries
          .iter()
          .position(|e| e.key == default_key)?;
        Some(ModelCatalog
        {   entries
          , default_index
          , last_resort
        })
    }

    /// Catalog of the models the station ships with
    pub fn builtin() -> Self
    {   ModelCatalog
        {   entries: BUILTIN_MODELS
              .iter()
              .map(|(key, id)| CatalogEntry
              {   key: key.to_string()
                , model_id: id.to_string()
              })
              .collect()
          , default_index: 0
          , last_resort: LAST_RESORT_MODEL_ID.to_string()
        }
    }

    pub fn default_entry(&self) -> &CatalogEntry
    {   &self.entries[self.default_index]
    }

    pub fn default_key(&self) -> &str
    {   &self.default_entry().key
    }

    pub fn default_model_id(&self) -> &str
    {   &self.default_entry().model_id
    }

    pub fn last_resort_model_id(&self) -> &str
    {   &self.last_resort
    }

    /// Resolve a key, falling back to the default for unknown or absent keys
    pub fn resolve(&self, key: Option<&str>) -> &CatalogEntry
    {   match key.and_then(|k| self.entries.iter().find(|e| e.key == k))
        {   Some(entry) => entry
          , None => {
              debug!(
                "Model key {:?} not in catalog, using default {}",
                key, self.default_key()
              );
              self.default_entry()
            }
        }
    }

    /// Keys in catalog order
    pub fn keys(&self) -> Vec<String>
    {   self.entries.iter().map(|e| e.key.clone()).collect()
    }

    /// Candidate identifiers for a request: requested, default, last resort.
    ///
    /// A request for the default model gets no fallback candidates.
    pub fn candidates_for(&self, key: Option<&str>) -> Vec<String>
    {   let requested = self.resolve(key).model_id.clone();
        let default = self.default_model_id();
        if requested == default
        {   return vec![requested];
        }
        let mut chain = vec![requested, default.to_string()];
        if !chain.iter().any(|id| id == &self.last_resort)
        {   chain.push(self.last_resort.clone());
        }
        chain
    }
}

impl Default for ModelCatalog
{   fn default() -> Self
    {   ModelCatalog::builtin()
    }
}

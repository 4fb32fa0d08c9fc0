use serde::Deserialize;

/// What a provider asks the token endpoint for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderOptions {
    /// Scopes requested for access tokens.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Audience requested for ID tokens.
    #[serde(default)]
    pub target_audience: Option<String>,
    /// Coalesce concurrent refreshes of the same slot into one exchange.
    #[serde(default)]
    pub single_flight: bool,
}

impl ProviderOptions {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scopes: scopes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_target_audience<S: Into<String>>(mut self, target_audience: S) -> Self {
        self.target_audience = Some(target_audience.into());
        self
    }

    pub fn with_single_flight(mut self, single_flight: bool) -> Self {
        self.single_flight = single_flight;
        self
    }
}

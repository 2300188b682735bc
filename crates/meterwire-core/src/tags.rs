//! Request tag classification.
//!
//! Turns a finished HTTP exchange into the labels its latency is recorded
//! under. Route labels use the matched template (`/hello/:name`), never the
//! concrete URL, so cardinality stays bounded by the number of routes.

/// Route label when no route matched.
pub const UNKNOWN: &str = "unknown";
/// Route label for `/`.
pub const ROOT: &str = "root";
/// Route label shared by every 3xx response.
pub const REDIRECTION: &str = "REDIRECTION";
/// Route label for a 404 from a matched route.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Exception label when nothing was raised.
pub const NO_EXCEPTION: &str = "None";

/// What is known about one exchange once its response is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome<'a> {
    pub matched_path: Option<&'a str>,
    pub status: u16,
    pub exception: Option<&'a str>,
}

impl<'a> RequestOutcome<'a> {
    pub fn new(matched_path: Option<&'a str>, status: u16, exception: Option<&'a str>) -> Self {
        Self {
            matched_path,
            status,
            exception,
        }
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_status(self.status)
    }
}

/// Labels derived from a [`RequestOutcome`].
///
/// Always exactly `route` and `exception`, in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    route: String,
    exception: String,
}

impl LabelSet {
    pub const KEYS: [&'static str; 2] = ["route", "exception"];

    pub fn new(route: impl Into<String>, exception: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            exception: exception.into(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn exception(&self) -> &str {
        &self.exception
    }

    /// `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        Self::KEYS
            .into_iter()
            .zip([self.route.as_str(), self.exception.as_str()])
    }
}

/// Derive the label set for one exchange.
///
/// Route label, first match wins:
/// 1. nothing matched: `unknown`
/// 2. 3xx: `REDIRECTION`
/// 3. 404: `NOT_FOUND`
/// 4. `/` or blank template: `root`
/// 5. the template itself
pub fn classify(matched_path: Option<&str>, status: u16, exception: Option<&str>) -> LabelSet {
    let route = match matched_path {
        None => UNKNOWN,
        Some(_) if (300..400).contains(&status) => REDIRECTION,
        Some(_) if status == 404 => NOT_FOUND,
        Some(p) if p == "/" || p.trim().is_empty() => ROOT,
        Some(p) => p,
    };

    let exception = exception
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(NO_EXCEPTION);

    LabelSet::new(route, exception)
}

/// Coarse status class recorded next to the label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    Unknown,
}

impl Outcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            100..=199 => Outcome::Informational,
            200..=299 => Outcome::Success,
            300..=399 => Outcome::Redirection,
            400..=499 => Outcome::ClientError,
            500..=599 => Outcome::ServerError,
            _ => Outcome::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Informational => "INFORMATIONAL",
            Outcome::Success => "SUCCESS",
            Outcome::Redirection => "REDIRECTION",
            Outcome::ClientError => "CLIENT_ERROR",
            Outcome::ServerError => "SERVER_ERROR",
            Outcome::Unknown => "UNKNOWN",
        }
    }
}

/// Strategy that labels an exchange for the request timer.
pub trait TagsProvider: Send + Sync {
    fn tags(&self, outcome: &RequestOutcome<'_>) -> LabelSet;
}

/// Default provider: [`classify`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTagsProvider;

impl TagsProvider for RouteTagsProvider {
    fn tags(&self, outcome: &RequestOutcome<'_>) -> LabelSet {
        classify(outcome.matched_path, outcome.status, outcome.exception)
    }
}

impl<F> TagsProvider for F
where
    F: Fn(&RequestOutcome<'_>) -> LabelSet + Send + Sync,
{
    fn tags(&self, outcome: &RequestOutcome<'_>) -> LabelSet {
        self(outcome)
    }
}

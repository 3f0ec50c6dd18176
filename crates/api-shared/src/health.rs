use crate::wire::HealthRes;
use crate::API_VERSION;

/// Simple health service shared by the server and anything that reports on it
///
/// This service provides a standardised way to check the health status of the API.
/// It can be used both as a static utility and as an instantiated service.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Creates a new instance of HealthService.
    pub fn new() -> Self {
        Self
    }

    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` of `{"status": "ok", "api": "v2"}`.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "ok".into(),
            api: API_VERSION.into(),
        }
    }

    /// Whether a response received over the wire reports a healthy service.
    pub fn is_healthy(res: &HealthRes) -> bool {
        res.status == "ok"
    }
}

impl Default for HealthService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_health_reports_ok_v2() {
        let res = HealthService::check_health();
        assert_eq!(res.status, "ok");
        assert_eq!(res.api, "v2");
        assert!(HealthService::is_healthy(&res));
    }
}

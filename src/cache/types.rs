pub const TWIST_STATUS_HEADER: &str = "x-twist-status";
pub const TWIST_STATUS_HEALTHY: &str = "healthy";
pub const TWIST_STATUS_ERROR: &str = "error";

/// Where a successful response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwistStatus {
    Fresh,
    Cached,
}

impl TwistStatus {
    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            TwistStatus::Fresh => "fresh",
            TwistStatus::Cached => "cached",
        }
    }

    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, TwistStatus::Cached)
    }
}

impl std::fmt::Display for TwistStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}

use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters shared by paginated list endpoints.
///
/// Pages are zero-based to match the SeaORM paginator.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PaginationParams {
    /// Zero-based page index
    #[serde(default)]
    pub page: u64,
    /// Entries per page, capped at 100
    #[serde(default = "default_entries")]
    pub entries: u64,
}

fn default_entries() -> u64 {
    20
}

impl PaginationParams {
    pub fn per_page(&self) -> u64 {
        self.entries.clamp(1, 100)
    }
}

/// Number of pages needed to hold `total` items.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page > 0 {
        (total as f64 / per_page as f64).ceil() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_partial_pages_up() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }
}

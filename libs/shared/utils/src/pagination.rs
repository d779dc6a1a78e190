use serde::Deserialize;

const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Raw pagination/sort query parameters as they arrive on list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageOptions {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub skip: usize,
}

/// Normalize page/limit and derive the skip offset.
pub fn calculate(options: &PageOptions) -> PageWindow {
    let page = options.page.unwrap_or(1).max(1);
    let limit = options.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    PageWindow {
        page,
        limit,
        skip: ((page - 1) * limit) as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_ten() {
        let window = calculate(&PageOptions::default());
        assert_eq!(window, PageWindow { page: 1, limit: 10, skip: 0 });
    }

    #[test]
    fn skip_is_derived_from_page_and_limit() {
        let window = calculate(&PageOptions {
            page: Some(3),
            limit: Some(20),
            ..Default::default()
        });
        assert_eq!(window.skip, 40);
    }

    #[test]
    fn nonsense_values_are_clamped() {
        let window = calculate(&PageOptions {
            page: Some(0),
            limit: Some(-5),
            ..Default::default()
        });
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, 1);
    }
}

/// Pagination query parameters
#[derive(Debug, Clone, Copy)]
pub struct PaginationParams {
    pub page: u32,
    pub limit: u32,
}

impl PaginationParams {
    /// Clamp raw query values: page starts at 1, limit within 1..=100.
    pub fn normalized(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(20).clamp(1, 100),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = ((total as f64) / (limit as f64)).ceil() as u32;
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }

    /// Slice one page out of an already ordered sequence.
    pub fn from_ordered<I>(items: I, params: PaginationParams) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let all: Vec<T> = items.into_iter().collect();
        let total = all.len() as u64;
        let skip = ((params.page - 1) * params.limit) as usize;
        let page: Vec<T> = all
            .into_iter()
            .skip(skip)
            .take(params.limit as usize)
            .collect();
        Self::new(page, total, params.page, params.limit)
    }
}

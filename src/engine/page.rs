use crate::record::HookRecord;

/// One page slice plus the bookkeeping the caller renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Records on this page, in filtered order.
    pub records: Vec<HookRecord>,
    /// 1-based page number after clamping.
    pub page: usize,
    /// `ceil(total_records / page_size)`, at least 1.
    pub total_pages: usize,
    /// Size of the filtered set.
    pub total_records: usize,
}

/// Slices the filtered, time-ordered view into fixed-size pages.
///
/// Stateless: resetting to page 1 when predicates change is the caller's
/// job. `page` is clamped into `[1, total_pages]`.
pub fn paginate(records: &[HookRecord], page_size: usize, page: usize) -> Page {
    let page_size = page_size.max(1);
    let total_records = records.len();
    let total_pages = total_records.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_records);
    let records = if start < total_records {
        records[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        records,
        page,
        total_pages,
        total_records,
    }
}

use super::pagination::{PageRequest, PageResponse};
use rstest::rstest;

#[test]
fn test_default_page_request() {
    let req = PageRequest::default();
    assert_eq!(req.page, 1);
    assert_eq!(req.per_page, 20);
}

#[rstest]
#[case(1, 20, 0)]
#[case(2, 20, 20)]
#[case(5, 10, 40)]
#[case(0, 20, 0)] // page 0 clamps to the first page
fn test_offset(#[case] page: u32, #[case] per_page: u32, #[case] expected: u64) {
    let req = PageRequest { page, per_page };
    assert_eq!(req.offset(), expected);
}

#[test]
fn test_page_response_totals() {
    let resp = PageResponse::new(vec![1, 2, 3], 1, 3, 7);
    assert_eq!(resp.meta.total_pages, 3);
    assert_eq!(resp.meta.total, 7);
    assert_eq!(resp.data.len(), 3);
}

#[test]
fn test_page_response_empty() {
    let resp: PageResponse<i32> = PageResponse::new(vec![], 1, 20, 0);
    assert_eq!(resp.meta.total_pages, 1);
}

#[test]
fn test_page_response_exact_multiple() {
    let resp: PageResponse<i32> = PageResponse::new(vec![], 2, 10, 20);
    assert_eq!(resp.meta.total_pages, 2);
}

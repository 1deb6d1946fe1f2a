use tracing::info;

use std::{iter::FusedIterator, mem, vec};

use crate::{
    api::{next_cursor, CommerceApi, Order},
    error::{Error, Result},
    filter::OrderFilter,
};

enum Next {
    FirstPage,
    Page(String),
    Done,
}

/// Every order matching a filter, fetched one page at a time.
///
/// No request is made until the first call to `next`. Each following page
/// is requested only once the current one has been drained, using the
/// cursor the previous response returned. A failed request is yielded as a
/// single `Err`, after which the iterator is exhausted.
pub struct OrderPages<'a, A: CommerceApi + ?Sized> {
    api: &'a A,
    filter: &'a OrderFilter,
    current: vec::IntoIter<Order>,
    next: Next,
    pages: usize,
}

impl<'a, A: CommerceApi + ?Sized> OrderPages<'a, A> {
    #[must_use]
    pub fn new(api: &'a A, filter: &'a OrderFilter) -> Self {
        Self {
            api,
            filter,
            current: Vec::new().into_iter(),
            next: Next::FirstPage,
            pages: 0,
        }
    }

    /// Returns the number of pages fetched so far.
    #[must_use]
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }
}

impl<A: CommerceApi + ?Sized> Iterator for OrderPages<'_, A> {
    type Item = Result<Order>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(order) = self.current.next() {
                return Some(Ok(order));
            }
            let cursor = match mem::replace(&mut self.next, Next::Done) {
                Next::Done => return None,
                Next::FirstPage => None,
                Next::Page(cursor) => Some(cursor),
            };
            let page = match self.api.search_orders(self.filter, cursor.as_deref()) {
                Ok(page) => page,
                Err(errors) => return Some(Err(Error::remote("SearchOrders", errors))),
            };
            self.pages += 1;
            info!(
                page = self.pages,
                orders = page.orders.len(),
                more = page.cursor.is_some(),
                "retrieved orders"
            );
            if let Some(cursor) = next_cursor(page.cursor) {
                self.next = Next::Page(cursor);
            }
            self.current = page.orders.into_iter();
        }
    }
}

impl<A: CommerceApi + ?Sized> FusedIterator for OrderPages<'_, A> {}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        api::OrdersPage,
        error::{ApiError, ApiErrors},
        testing::{order, sample_filter, FakeApi},
    };

    fn page(ids: &[&str], cursor: Option<&str>) -> OrdersPage {
        OrdersPage {
            orders: ids.iter().map(|id| order(id, Vec::new())).collect(),
            cursor: cursor.map(String::from),
        }
    }

    fn ids(results: Vec<Result<Order>>) -> Vec<String> {
        results.into_iter().map(|o| o.unwrap().id).collect()
    }

    #[test]
    fn iterator_concatenates_pages_in_order() {
        let api = FakeApi::default().with_pages(vec![
            Ok(page(&["1", "2"], Some("c1"))),
            Ok(page(&["3"], Some("c2"))),
            Ok(page(&["4", "5"], None)),
        ]);
        let filter = sample_filter();
        let mut pages = OrderPages::new(&api, &filter);
        let orders: Vec<_> = pages.by_ref().collect();
        assert_eq!(ids(orders), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(pages.pages_fetched(), 3);
        assert_eq!(
            api.search_cursors(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
        assert!(pages.next().is_none());
    }

    #[test]
    fn iterator_is_lazy() {
        let api = FakeApi::default().with_pages(vec![Ok(page(&["1"], Some("c1")))]);
        let filter = sample_filter();
        let mut pages = OrderPages::new(&api, &filter);
        assert!(api.search_cursors().is_empty());
        assert_eq!(pages.next().unwrap().unwrap().id, "1");
        assert_eq!(api.search_cursors().len(), 1);
    }

    #[test]
    fn iterator_yields_nothing_for_empty_result() {
        let api = FakeApi::default().with_pages(vec![Ok(OrdersPage::default())]);
        let filter = sample_filter();
        assert_eq!(OrderPages::new(&api, &filter).count(), 0);
        assert_eq!(api.search_cursors().len(), 1);
    }

    #[test]
    fn iterator_skips_empty_intermediate_page() {
        let api = FakeApi::default().with_pages(vec![
            Ok(page(&[], Some("c1"))),
            Ok(page(&["1"], Some(""))),
        ]);
        let filter = sample_filter();
        let orders: Vec<_> = OrderPages::new(&api, &filter).collect();
        assert_eq!(ids(orders), vec!["1"]);
    }

    #[test]
    fn iterator_stops_after_failed_page() {
        let failure = ApiErrors(vec![ApiError::new("API_ERROR", "INTERNAL_SERVER_ERROR", "")]);
        let api = FakeApi::default().with_pages(vec![
            Ok(page(&["1"], Some("c1"))),
            Err(failure.clone()),
            Ok(page(&["never"], None)),
        ]);
        let filter = sample_filter();
        let mut pages = OrderPages::new(&api, &filter);
        assert_eq!(pages.next().unwrap().unwrap().id, "1");
        match pages.next() {
            Some(Err(Error::Remote { operation, errors })) => {
                assert_eq!(operation, "SearchOrders");
                assert_eq!(errors, failure);
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        assert!(pages.next().is_none());
        assert_eq!(api.search_cursors().len(), 2);
    }

    #[test]
    fn iterator_passes_filter_unchanged_to_every_page() {
        let api = FakeApi::default().with_pages(vec![
            Ok(page(&["1"], Some("c1"))),
            Ok(page(&["2"], None)),
        ]);
        let filter = sample_filter();
        let _: Vec<_> = OrderPages::new(&api, &filter).collect();
        assert!(api.search_filters().iter().all(|f| *f == filter));
    }
}

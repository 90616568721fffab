//! Query results.

use std::marker::PhantomData;

use managed_json_core::{Record, detach_all};

use crate::object::{Managed, ManagedObject};
use crate::session::Session;

/// Ordered result of a session query.
///
/// Holds the ids that matched when the query ran and can be iterated any
/// number of times; each pass yields fresh [`Managed`] handles in the same
/// order.
pub struct Results<'s, R> {
    session: &'s Session,
    ids: Vec<i64>,
    _record: PhantomData<fn() -> R>,
}

impl<'s, R: Record> Results<'s, R> {
    pub(crate) fn new(session: &'s Session, ids: Vec<i64>) -> Self {
        Self {
            session,
            ids,
            _record: PhantomData,
        }
    }

    /// Number of matched objects.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Handle to the object at `index`.
    pub fn get(&self, index: usize) -> Option<Managed<'s, R>> {
        self.ids.get(index).map(|&id| self.handle(id))
    }

    /// Iterates over handles in query order.
    pub fn iter(&self) -> Iter<'_, 's, R> {
        Iter {
            session: self.session,
            ids: self.ids.iter(),
            _record: PhantomData,
        }
    }

    /// Detached copies of every matched object, in order.
    ///
    /// The first object that fails to copy aborts the call.
    pub fn detach(&self) -> managed_json_core::Result<Vec<R>> {
        detach_all(self)
    }

    fn handle(&self, id: i64) -> Managed<'s, R> {
        Managed::new(ManagedObject::new(self.session, R::TYPE_NAME, id))
    }
}

/// Iterator over [`Results`].
pub struct Iter<'a, 's, R> {
    session: &'s Session,
    ids: std::slice::Iter<'a, i64>,
    _record: PhantomData<fn() -> R>,
}

impl<'s, R: Record> Iterator for Iter<'_, 's, R> {
    type Item = Managed<'s, R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids
            .next()
            .map(|&id| Managed::new(ManagedObject::new(self.session, R::TYPE_NAME, id)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<R: Record> ExactSizeIterator for Iter<'_, '_, R> {}

impl<'a, 's, R: Record> IntoIterator for &'a Results<'s, R> {
    type Item = Managed<'s, R>;
    type IntoIter = Iter<'a, 's, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

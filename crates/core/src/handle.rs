//! Shared board handles.
//!
//! Groups remember which board they sit on so they can be put back there
//! later. Boards are shared between groups and the host through
//! `Rc<RefCell<_>>`; everything runs on one thread inside the host tick.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

pub struct BoardHandle<B>(Rc<RefCell<B>>);

impl<B> BoardHandle<B> {
    pub fn new(board: B) -> Self {
        Self(Rc::new(RefCell::new(board)))
    }

    pub fn borrow(&self) -> Ref<'_, B> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, B> {
        self.0.borrow_mut()
    }

    /// Do both handles point at the same board?
    pub fn same_board(&self, other: &BoardHandle<B>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<B> Clone for BoardHandle<B> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<B> From<B> for BoardHandle<B> {
    fn from(board: B) -> Self {
        Self::new(board)
    }
}

impl<B> fmt::Debug for BoardHandle<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoardHandle({:p})", Rc::as_ptr(&self.0))
    }
}

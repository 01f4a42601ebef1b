use std::cell::RefCell;
use std::fmt::Write;
use std::rc::Rc;

/// A `fmt::Write` sink whose clones all append to one buffer. Hand one clone to
/// a tree as its debug writer and read the trace back through another.
#[derive(Clone, Default)]
pub struct SharedStringWriter(Rc<RefCell<String>>);

impl Write for SharedStringWriter {
    fn write_str(&mut self, s: &str) -> Result<(), std::fmt::Error> {
        self.0.borrow_mut().write_str(s)
    }
}

impl SharedStringWriter {
    pub fn new() -> Self {
        SharedStringWriter(Rc::new(RefCell::new(String::new())))
    }

    pub fn borrow(&self) -> std::cell::Ref<'_, String> {
        self.0.borrow()
    }

    /// Drains the buffer.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().lines().map(str::to_owned).collect()
    }
}

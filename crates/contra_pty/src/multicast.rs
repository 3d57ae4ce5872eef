use contra_encoding::ByteSink;

/// Fan one read out to many sinks — the live interpreter, a session
/// recorder, a diagnostic sequence printer — with no dynamic type
/// inspection: every consumer just implements [`ByteSink`].
#[derive(Default)]
pub struct Multicast {
    sinks: Vec<Box<dyn ByteSink>>,
}

impl Multicast {
    #[must_use]
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn ByteSink>) {
        self.sinks.push(sink);
    }
}

impl ByteSink for Multicast {
    fn write(&mut self, bytes: &[u8]) {
        for sink in &mut self.sinks {
            sink.write(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recording(Rc<RefCell<Vec<u8>>>);

    impl ByteSink for Recording {
        fn write(&mut self, bytes: &[u8]) {
            self.0.borrow_mut().extend_from_slice(bytes);
        }
    }

    #[test]
    fn fans_out_to_every_sink() {
        let a = Rc::new(RefCell::new(Vec::new()));
        let b = Rc::new(RefCell::new(Vec::new()));
        let mut mc = Multicast::new();
        mc.add(Box::new(Recording(a.clone())));
        mc.add(Box::new(Recording(b.clone())));
        mc.write(b"hi");
        assert_eq!(*a.borrow(), b"hi");
        assert_eq!(*b.borrow(), b"hi");
    }
}
